//! Hard-coded sketch constants, grouped the way the engine groups its
//! `RuntimeConfig` / `GpuInit` settings.

use std::f32::consts::TAU;
use std::path::PathBuf;

use glam::{Vec2, Vec3};

use crate::controls::ControlsConfig;
use crate::particles::Sprite;
use crate::passes::RevealShader;
use crate::scene::PlaneSurface;

/// Phase range a particle cycles through: `[-LIFE_LIMIT, LIFE_LIMIT]`.
pub const LIFE_LIMIT: f32 = TAU;

/// Particle pool settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    /// Phase increment applied on every `advance`, independent of frame time.
    pub phase_step: f32,
    /// Spawn annulus `[min, max)` radius around the spawn centre.
    pub spawn_radius: (f32, f32),
    /// Fixed RNG seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 50,
            phase_step: 0.1,
            spawn_radius: (0.04, 0.14),
            seed: None,
        }
    }
}

/// Locations of the three raster inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetPaths {
    pub primary: PathBuf,
    pub overlay: PathBuf,
    pub sprite: PathBuf,
}

impl AssetPaths {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            primary: dir.join("bg1.png"),
            overlay: dir.join("bg2.png"),
            sprite: dir.join("blob.png"),
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"))
    }
}

#[derive(Debug, Clone)]
pub struct SketchConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub window_size: (f64, f64),
    pub particles: ParticleConfig,
    pub controls: ControlsConfig,
    pub sprite: Sprite,
    /// Shader-driven plane the pointer is picked against.
    pub reveal_plane: PlaneSurface,
    /// Opaque plane just behind the reveal plane.
    pub background_plane: PlaneSurface,
    pub assets: AssetPaths,
    /// Fragment stage of the reveal plane.
    pub reveal_shader: RevealShader,
    pub clear_color: wgpu::Color,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            title: "reveal".to_string(),
            window_size: (1280.0, 720.0),
            particles: ParticleConfig::default(),
            controls: ControlsConfig::default(),
            sprite: Sprite {
                size: 0.2,
                depth: 0.1,
            },
            reveal_plane: PlaneSurface::new(Vec3::ZERO, Vec2::ONE),
            background_plane: PlaneSurface::new(Vec3::new(0.0, 0.0, -0.001), Vec2::ONE),
            assets: AssetPaths::default(),
            reveal_shader: RevealShader::default(),
            clear_color: wgpu::Color::TRANSPARENT,
        }
    }
}
