//! Time subsystem.
//!
//! One `FrameClock` per window; sample it once per presented frame to obtain
//! a `FrameTime`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
