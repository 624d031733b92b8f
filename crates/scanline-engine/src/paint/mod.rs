//! Color and palette model shared by scene code and the compositor.
//!
//! Scope:
//! - packed color formats (RGB888 words, RGB565 palette entries)
//! - palette banks and the tint lookup table
//!
//! Colors reach the GPU either as vertex colors (RGB888 + alpha) or as RGB565
//! palette entries decoded in shaders.

pub mod color;
pub mod palette;

pub use color::Color;
pub use palette::{PaletteBanks, TintTable};
