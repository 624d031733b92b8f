use std::sync::atomic::{AtomicU64, Ordering};

/// How a tile layer is scrolled, and therefore which deformation it uses.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LayerKind {
    /// Static layer; drawn through the horizontal-scroll path.
    #[default]
    Basic,
    /// One scroll position per scanline.
    HScroll,
    /// One scroll position per column.
    VScroll,
    /// Per-pixel affine deformation.
    Rotozoom,
}

/// A grid of 16×16 tiles with power-of-two dimensions.
///
/// Invariants:
/// - the layout stride is `1 << width_shift` words; rows are `1 << height_shift`
/// - `xsize <= 1 << width_shift` and `ysize <= 1 << height_shift`
/// - a layer with `xsize == 0` or `ysize == 0` draws nothing
///
/// Construction, cloning and every mutation through [`TileLayer::set_tile`] or
/// [`TileLayer::layout_mut`] stamp a fresh [`TileLayer::version`]. Versions are
/// unique across all layers in the process, so a different layer placed in
/// the same slot never matches the version the compositor last uploaded.
///
/// Tile words:
/// - bits 0..10: tile index into the tileset atlas
/// - bit 10: horizontal flip, bit 11: vertical flip
/// - `0xFFFF`: empty cell
#[derive(Debug, Default)]
pub struct TileLayer {
    pub kind: LayerKind,
    width_shift: u8,
    height_shift: u8,
    xsize: u16,
    ysize: u16,
    layout: Vec<u16>,
    version: u64,
}

impl TileLayer {
    pub const EMPTY_TILE: u16 = 0xFFFF;
    pub const INDEX_MASK: u16 = 0x3FF;
    pub const FLIP_X: u16 = 1 << 10;
    pub const FLIP_Y: u16 = 1 << 11;

    /// Creates a layer of `xsize × ysize` tiles, every cell empty.
    pub fn new(kind: LayerKind, xsize: u16, ysize: u16) -> Self {
        let width_shift = shift_for(xsize);
        let height_shift = shift_for(ysize);
        let cells = if xsize == 0 || ysize == 0 {
            0
        } else {
            (1usize << width_shift) * (1usize << height_shift)
        };

        Self {
            kind,
            width_shift,
            height_shift,
            xsize,
            ysize,
            layout: vec![Self::EMPTY_TILE; cells],
            version: next_version(),
        }
    }

    #[inline]
    pub fn xsize(&self) -> u16 {
        self.xsize
    }

    #[inline]
    pub fn ysize(&self) -> u16 {
        self.ysize
    }

    #[inline]
    pub fn width_shift(&self) -> u8 {
        self.width_shift
    }

    #[inline]
    pub fn height_shift(&self) -> u8 {
        self.height_shift
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xsize == 0 || self.ysize == 0
    }

    /// Layout dimensions in tiles (`1 << width_shift`, `1 << height_shift`).
    #[inline]
    pub fn layout_extent(&self) -> (u32, u32) {
        (1u32 << self.width_shift, 1u32 << self.height_shift)
    }

    /// Content stamp; changes on every mutation and differs between layers.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn layout(&self) -> &[u16] {
        &self.layout
    }

    /// Mutable access to the whole layout. Counts as a modification.
    #[inline]
    pub fn layout_mut(&mut self) -> &mut [u16] {
        self.version = next_version();
        &mut self.layout
    }

    /// Returns the tile word at `(x, y)`, or `None` outside the layer.
    pub fn tile(&self, x: u16, y: u16) -> Option<u16> {
        if x >= self.xsize || y >= self.ysize {
            return None;
        }
        self.layout.get(self.cell(x, y)).copied()
    }

    /// Sets the tile word at `(x, y)`. Out-of-range writes are ignored.
    pub fn set_tile(&mut self, x: u16, y: u16, word: u16) {
        if x >= self.xsize || y >= self.ysize {
            return;
        }
        let i = self.cell(x, y);
        self.layout[i] = word;
        self.version = next_version();
    }

    #[inline]
    fn cell(&self, x: u16, y: u16) -> usize {
        ((y as usize) << self.width_shift) + x as usize
    }
}

impl Clone for TileLayer {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            width_shift: self.width_shift,
            height_shift: self.height_shift,
            xsize: self.xsize,
            ysize: self.ysize,
            layout: self.layout.clone(),
            version: next_version(),
        }
    }
}

/// Equal when kind, dimensions and tiles match; versions are ignored.
impl PartialEq for TileLayer {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.xsize == other.xsize
            && self.ysize == other.ysize
            && self.layout == other.layout
    }
}

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

fn shift_for(size: u16) -> u8 {
    if size <= 1 {
        0
    } else {
        (size as u32).next_power_of_two().trailing_zeros() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_round_up_to_powers_of_two() {
        let layer = TileLayer::new(LayerKind::HScroll, 100, 16);
        assert_eq!(layer.width_shift(), 7);
        assert_eq!(layer.height_shift(), 4);
        assert_eq!(layer.layout_extent(), (128, 16));
        assert_eq!(layer.layout().len(), 128 * 16);
    }

    #[test]
    fn zero_sized_layer_is_empty() {
        let layer = TileLayer::new(LayerKind::Basic, 0, 32);
        assert!(layer.is_empty());
        assert!(layer.layout().is_empty());
        assert!(TileLayer::default().is_empty());
    }

    #[test]
    fn new_layer_cells_are_empty_tiles() {
        let layer = TileLayer::new(LayerKind::Basic, 4, 4);
        assert_eq!(layer.tile(3, 3), Some(TileLayer::EMPTY_TILE));
        assert_eq!(layer.tile(4, 0), None);
    }

    #[test]
    fn set_tile_uses_power_of_two_stride_and_bumps_version() {
        let mut layer = TileLayer::new(LayerKind::Basic, 3, 2);
        let v0 = layer.version();
        layer.set_tile(2, 1, 7 | TileLayer::FLIP_X);

        assert_eq!(layer.layout()[4 + 2], 7 | TileLayer::FLIP_X);
        assert_ne!(layer.version(), v0);
    }

    #[test]
    fn out_of_range_write_is_ignored() {
        let mut layer = TileLayer::new(LayerKind::Basic, 2, 2);
        let v0 = layer.version();
        layer.set_tile(5, 0, 1);
        assert_eq!(layer.version(), v0);
    }

    #[test]
    fn layout_mut_counts_as_modification() {
        let mut layer = TileLayer::new(LayerKind::Rotozoom, 2, 2);
        let v0 = layer.version();
        layer.layout_mut()[0] = 1;
        assert_ne!(layer.version(), v0);
    }

    // ── version stamps ────────────────────────────────────────────────────

    #[test]
    fn equally_edited_layers_have_distinct_versions() {
        let mut a = TileLayer::new(LayerKind::HScroll, 4, 4);
        let mut b = TileLayer::new(LayerKind::HScroll, 4, 4);
        a.set_tile(0, 0, 1);
        b.set_tile(0, 0, 2);
        assert_ne!(a.version(), b.version());
    }

    #[test]
    fn clone_gets_fresh_version_but_compares_equal() {
        let mut a = TileLayer::new(LayerKind::Basic, 4, 4);
        a.set_tile(1, 1, 3);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a.version(), b.version());
    }
}
