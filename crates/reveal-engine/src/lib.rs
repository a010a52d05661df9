//! Reveal engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the sketch: window loop,
//! device/surface, frame timing, input, viewport state, and render helpers.

pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
