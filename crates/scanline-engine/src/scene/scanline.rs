use crate::coords::FixedVec2;

/// Scroll state of one scanline (or one column, for vertical-scroll layers).
///
/// `position` is the layer-space pixel sampled at the first pixel of the line,
/// in 16.16 fixed point. `deform` is the per-pixel step along the line and is
/// only read by rotozoom layers.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ScanlineInfo {
    pub position: FixedVec2,
    pub deform: FixedVec2,
}

impl ScanlineInfo {
    #[inline]
    pub const fn new(position: FixedVec2, deform: FixedVec2) -> Self {
        Self { position, deform }
    }

    /// Scanlines for an undeformed layer scrolled to `origin`.
    ///
    /// Line `i` samples row `origin.y + i`; every line starts at `origin.x`.
    pub fn scrolled_lines(origin: FixedVec2, count: usize) -> Vec<ScanlineInfo> {
        (0..count)
            .map(|i| ScanlineInfo {
                position: FixedVec2::new(origin.x, origin.y.wrapping_add((i as i32) << 16)),
                deform: FixedVec2::default(),
            })
            .collect()
    }

    /// Columns for an undeformed vertical-scroll layer scrolled to `origin`.
    ///
    /// Column `i` samples `origin.x + i`; every column starts at row `origin.y`.
    pub fn scrolled_columns(origin: FixedVec2, count: usize) -> Vec<ScanlineInfo> {
        (0..count)
            .map(|i| ScanlineInfo {
                position: FixedVec2::new(origin.x.wrapping_add((i as i32) << 16), origin.y),
                deform: FixedVec2::default(),
            })
            .collect()
    }
}
