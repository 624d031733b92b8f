//! Core engine-facing contracts.
//!
//! The interface between the runtime (platform loop) and the game or demo
//! driving the compositor: an [`App`] receives window events and one
//! [`FrameCtx`] per paced frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
