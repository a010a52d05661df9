//! Raster inputs: two background images and the particle sprite.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageReader, RgbaImage};

use crate::config::AssetPaths;

/// Decoded RGBA8 images, uploaded to the GPU by the passes on first use.
pub struct SketchAssets {
    /// Image the reveal plane cuts away.
    pub primary: RgbaImage,
    /// Image on the background plane, also used for the reveal rim tint.
    pub overlay: RgbaImage,
    /// Additive billboard sprite; its alpha shapes the mask.
    pub sprite: RgbaImage,
}

impl SketchAssets {
    pub fn load(paths: &AssetPaths) -> Result<Self> {
        let assets = Self {
            primary: load_rgba(&paths.primary)?,
            overlay: load_rgba(&paths.overlay)?,
            sprite: load_rgba(&paths.sprite)?,
        };
        log::info!(
            "assets loaded: primary={:?} overlay={:?} sprite={:?}",
            assets.primary.dimensions(),
            assets.overlay.dimensions(),
            assets.sprite.dimensions(),
        );
        Ok(assets)
    }
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image file: {}", path.display()))?;
    decode_rgba(&bytes, &path.display().to_string())
}

/// Decodes PNG/JPEG bytes into RGBA8, sniffing the format from the content.
pub fn decode_rgba(bytes: &[u8], name: &str) -> Result<RgbaImage> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .with_context(|| format!("failed to detect image format: {name}"))?
        .decode()
        .with_context(|| format!("failed to decode image: {name}"))?;
    Ok(image.into_rgba8())
}
