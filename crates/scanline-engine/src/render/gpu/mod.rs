//! wgpu backend for the compositor and screen presentation.
//!
//! Target formats:
//! - screens, scratch and the screen copy: `Rgba8Unorm` at the settings' texture size
//! - tileset atlas and surfaces: `R8Uint` palette indices
//! - palette banks, tint table and tile layouts: `R16Uint`
//! - attribute images: `Rgba32Float`

mod backend;
mod common;
mod pipelines;
mod present;
mod targets;

pub use backend::WgpuBackend;
pub use present::{ScreenPresenter, screen_layout};
