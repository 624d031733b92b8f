//! Video configuration and format-wide constants.
//!
//! Values here are fixed by the data format (palette banks, tile size, layer
//! count) or chosen once at startup (`VideoSettings`). Nothing in this module
//! touches the GPU.

/// Maximum number of logical screens (split-screen players).
pub const SCREEN_COUNT: usize = 4;

/// Number of tile layers a scene can hold.
pub const LAYER_COUNT: usize = 8;

/// Palette banks selectable per scanline through the line buffer.
pub const PALETTE_BANK_COUNT: usize = 8;

/// Colors per palette bank (RGB565 entries).
pub const PALETTE_BANK_SIZE: usize = 256;

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 16;

/// Tiles stored in the tileset atlas.
pub const TILE_COUNT: u32 = 0x400;

/// Default absolute per-call geometry limit (vertices and indices).
pub const VERTEX_LIMIT: u32 = 0x4000;

/// Vertices reserved at the start of the ring for the full-screen resolve quad.
pub const RESERVED_VERTICES: u32 = 6;

/// Largest ring limit whose vertex offsets still fit 16-bit indices.
pub const MAX_VERTEX_LIMIT: u32 = 0x10000 - RESERVED_VERTICES;

/// Smallest ring limit that holds one indexed quad.
pub const MIN_VERTEX_LIMIT: u32 = 6;

/// Fractional bits carried by scanline positions once the tile size is folded in.
///
/// Positions are 16.16 fixed-point pixels; dividing by `2^(20 + shift)` maps a
/// position onto `[0, 1)` of a layer that is `1 << shift` tiles wide.
pub const SCROLL_FRACTION_BITS: u32 = 20;

/// Startup video configuration.
///
/// Keep this structure plain: it is copied into the compositor at creation and
/// read by both the CPU-side queueing code and the GPU backend.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    /// Working pixel width (the resolution scene code draws at).
    pub pix_width: u32,

    /// Working pixel height.
    pub pix_height: u32,

    /// Active screens, `1..=SCREEN_COUNT`.
    pub screen_count: usize,

    /// Absolute per-call geometry limit and ring capacity (excluding the reserved prefix).
    pub vertex_limit: u32,

    /// Target presentation rate in Hz.
    pub refresh_rate: u32,

    /// Upper bound for aspect-derived screen widths. `0` disables the clamp.
    pub max_pix_width: u32,

    /// Linear filtering when scaling finished screens onto the window.
    pub linear_present: bool,

    /// Brightness ceiling applied when presenting.
    pub dim_max: f32,

    /// Current fraction of `dim_max`, for fades.
    pub dim_percent: f32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            pix_width: 424,
            pix_height: 240,
            screen_count: 1,
            vertex_limit: VERTEX_LIMIT,
            refresh_rate: 60,
            max_pix_width: 0,
            linear_present: false,
            dim_max: 1.0,
            dim_percent: 1.0,
        }
    }
}

impl VideoSettings {
    /// Size of the persistent screen textures and the scratch target.
    ///
    /// Small working resolutions fit a 512×256 texture; anything larger gets 1024×512.
    pub fn texture_size(&self) -> (u32, u32) {
        if self.pix_width <= 512 && self.pix_height <= 256 {
            (512, 256)
        } else {
            (1024, 512)
        }
    }

    /// Derives a screen width from the window aspect ratio.
    ///
    /// The width is rounded up to a multiple of 4, never narrower than
    /// `pix_width` and never wider than `max_pix_width` (when set).
    pub fn screen_width_for_view(&self, view_width: u32, view_height: u32) -> u32 {
        if view_width == 0 || view_height == 0 {
            return self.pix_width;
        }

        let aspect = view_width as f32 / view_height as f32;
        let mut width = ((aspect * self.pix_height as f32) as u32 + 3) & !3;

        if width < self.pix_width {
            width = self.pix_width;
        }
        if self.max_pix_width != 0 && width > self.max_pix_width {
            width = self.max_pix_width;
        }
        width
    }

    /// Attribute texture dimensions: the working resolution rounded up to powers of two.
    #[inline]
    pub fn attribute_extent(&self) -> (u32, u32) {
        (
            self.pix_width.max(1).next_power_of_two(),
            self.pix_height.max(1).next_power_of_two(),
        )
    }

    /// Active screen count clamped to the supported range.
    #[inline]
    pub fn active_screens(&self) -> usize {
        self.screen_count.clamp(1, SCREEN_COUNT)
    }

    /// Brightness multiplier for presented screens, in `[0, 1]`.
    #[inline]
    pub fn screen_dim(&self) -> f32 {
        screen_dim(self.dim_max, self.dim_percent)
    }

    /// Ring limit clamped so every vertex stays addressable by a `u16` index.
    #[inline]
    pub fn ring_vertex_limit(&self) -> u32 {
        self.vertex_limit.clamp(MIN_VERTEX_LIMIT, MAX_VERTEX_LIMIT)
    }
}

/// `max * percent`, clamped to `[0, 1]`. NaN dims to black.
#[inline]
pub fn screen_dim(max: f32, percent: f32) -> f32 {
    let dim = max * percent;
    if dim.is_nan() { 0.0 } else { dim.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_resolution_uses_small_textures() {
        assert_eq!(VideoSettings::default().texture_size(), (512, 256));
    }

    #[test]
    fn large_resolution_uses_big_textures() {
        let s = VideoSettings { pix_width: 640, pix_height: 360, ..Default::default() };
        assert_eq!(s.texture_size(), (1024, 512));
    }

    #[test]
    fn screen_width_rounds_up_to_multiple_of_four() {
        let s = VideoSettings::default();
        // 16:9 at 240 lines = 426.67 → 426 → rounded to 428.
        assert_eq!(s.screen_width_for_view(1920, 1080), 428);
    }

    #[test]
    fn screen_width_never_below_pix_width() {
        let s = VideoSettings::default();
        assert_eq!(s.screen_width_for_view(640, 480), 424);
    }

    #[test]
    fn screen_width_respects_max() {
        let s = VideoSettings { max_pix_width: 400, pix_width: 320, ..Default::default() };
        assert_eq!(s.screen_width_for_view(3840, 1080), 400);
    }

    #[test]
    fn attribute_extent_is_power_of_two() {
        assert_eq!(VideoSettings::default().attribute_extent(), (512, 256));
    }

    #[test]
    fn active_screens_clamped() {
        let s = VideoSettings { screen_count: 9, ..Default::default() };
        assert_eq!(s.active_screens(), SCREEN_COUNT);
        let s = VideoSettings { screen_count: 0, ..Default::default() };
        assert_eq!(s.active_screens(), 1);
    }

    #[test]
    fn ring_limit_keeps_indices_in_u16_range() {
        let s = VideoSettings { vertex_limit: 0x20000, ..Default::default() };
        assert_eq!(s.ring_vertex_limit(), MAX_VERTEX_LIMIT);
        assert_eq!(s.ring_vertex_limit() + RESERVED_VERTICES - 1, u16::MAX as u32);

        let s = VideoSettings { vertex_limit: 0, ..Default::default() };
        assert_eq!(s.ring_vertex_limit(), MIN_VERTEX_LIMIT);
        assert_eq!(VideoSettings::default().ring_vertex_limit(), VERTEX_LIMIT);
    }

    #[test]
    fn screen_dim_scales_and_clamps() {
        assert_eq!(VideoSettings::default().screen_dim(), 1.0);
        let s = VideoSettings { dim_max: 0.8, dim_percent: 0.5, ..Default::default() };
        assert!((s.screen_dim() - 0.4).abs() < 1e-6);
        assert_eq!(screen_dim(2.0, 1.0), 1.0);
        assert_eq!(screen_dim(-1.0, 1.0), 0.0);
        assert_eq!(screen_dim(f32::NAN, 1.0), 0.0);
    }
}
