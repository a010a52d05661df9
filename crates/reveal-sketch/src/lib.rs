//! Pointer-driven reveal sketch.
//!
//! A field of pulsing particles follows the pointer across a textured plane.
//! The particles are rendered into an offscreen mask each frame, and the
//! reveal shader uses that mask to cut the primary image away and expose the
//! background plane behind it.

pub mod assets;
pub mod camera;
pub mod config;
pub mod controls;
pub mod driver;
pub mod particles;
pub mod passes;
pub mod pointer;
pub mod scene;

pub use assets::SketchAssets;
pub use config::SketchConfig;
pub use driver::RevealSketch;
