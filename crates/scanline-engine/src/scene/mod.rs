//! Scene-side inputs read by the compositor.
//!
//! Everything here is produced by game/scene code once per frame and treated
//! as read-only by `render`: tile layers, per-scanline scroll state, logical
//! screens and 3D meshes.

mod layer;
mod scanline;
mod scene3d;
mod screen;

pub use layer::{LayerKind, TileLayer};
pub use scanline::ScanlineInfo;
pub use scene3d::{DrawMode3D, Face3D, Scene3D, Vertex3D};
pub use screen::Screen;

use crate::paint::PaletteBanks;

/// Borrowed view of one frame's scene data.
///
/// Draw entry points read layers, scanlines, palettes and the line buffer
/// through this view; none of it is retained past the call.
#[derive(Debug, Copy, Clone)]
pub struct SceneInputs<'a> {
    pub layers: &'a [TileLayer],

    /// Per-scanline (or per-column, for vertical scroll) scroll state.
    pub scanlines: &'a [ScanlineInfo],

    pub palette: &'a PaletteBanks,

    /// Palette bank index per scanline.
    pub line_buffer: &'a [u8],
}
