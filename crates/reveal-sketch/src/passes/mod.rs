//! GPU passes: the offscreen mask pass, the multisampled composite into the
//! scene image, and the present pass that scales the scene image to the surface.
//!
//! All three follow the same shape: construct cheaply on the CPU, create pipelines
//! and buffers lazily on the first `render`, rebuild bind groups when a
//! referenced texture is recreated.

mod common;
mod composite;
mod mask;
mod present;

pub use composite::{CompositePass, RevealShader, RevealUniforms};
pub use mask::MaskPass;
pub use present::PresentPass;
