//! Pixel-space coordinate types.
//!
//! Canonical CPU space:
//! - integer pixels of the working resolution
//! - origin top-left, +X right, +Y down
//! - sub-pixel positions are 16.16 fixed point
//!
//! Vertex shaders convert pixels to NDC using the `pixel_size` uniform.

mod clip;
mod fixed;

pub use clip::{ClipBounds, Scissor};
pub use fixed::{from_fixed, Fixed, FixedVec2};
