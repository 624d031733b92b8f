//! Time subsystem.
//!
//! One `FrameClock` per render loop: `frame_due()` gates presentation to the
//! configured refresh rate, `tick()` produces the `FrameTime` for the frame.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
