//! Scanline engine crate.
//!
//! A deferred tile/sprite compositor for retro-style 2D output: tile layers
//! with per-scanline deformation, palette-indexed sprites and surfaces, ink
//! blend modes resolved through a scratch target, and a painter's-algorithm
//! 3D overlay. Drawing is queued per screen through
//! [`render::CompositorContext`] and flushed to a [`render::CompositeBackend`]
//! (the wgpu one lives in [`render::gpu`]).
//!
//! The platform layers (`window`, `device`, `core`) open a window, pace frames
//! and present the finished screens.

pub mod config;
pub mod error;

pub mod coords;
pub mod paint;
pub mod render;
pub mod scene;

pub mod core;
pub mod device;
pub mod logging;
pub mod time;
pub mod window;

pub use config::VideoSettings;
pub use error::RenderError;
