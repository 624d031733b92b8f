//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single output window, wires it to the
//! GPU layer and paces frames to the configured refresh rate.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
