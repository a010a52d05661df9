//! GPU rendering helpers shared by passes.
//!
//! Passes own their pipelines and buffers and create them lazily on first use.
//! This module provides the per-frame context plus the two GPU resources every
//! pass needs: sampled textures and resizable offscreen targets.

mod blend;
mod ctx;
mod target;
mod texture;

pub use blend::{additive_blend, alpha_blend};
pub use ctx::{RenderCtx, RenderTarget};
pub use target::{next_extent, OffscreenTarget};
pub use texture::Texture;
