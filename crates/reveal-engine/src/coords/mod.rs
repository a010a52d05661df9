//! Viewport geometry shared by the runtime and renderers.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! The output surface always matches the window's physical size; the scene
//! image is rendered at the logical size times the clamped pixel ratio.

mod viewport;

pub use viewport::{effective_pixel_ratio, Viewport, MAX_PIXEL_RATIO};
