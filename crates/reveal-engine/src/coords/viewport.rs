use winit::dpi::PhysicalSize;

/// Upper bound for the device pixel ratio used to size the output surface.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Viewport state in logical pixels plus the effective device pixel ratio.
///
/// Width and height are clamped to at least one logical pixel so aspect and
/// NDC conversions never divide by zero. The pixel ratio is clamped to
/// `(0, MAX_PIXEL_RATIO]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Viewport {
    #[inline]
    pub fn new(width: f32, height: f32) -> Self {
        Self::from_host(width, height, 1.0)
    }

    /// Builds a viewport from host-reported logical size and device pixel ratio.
    pub fn from_host(width: f32, height: f32, host_pixel_ratio: f32) -> Self {
        Self {
            width: clamp_extent(width),
            height: clamp_extent(height),
            pixel_ratio: effective_pixel_ratio(host_pixel_ratio),
        }
    }

    /// Builds a viewport from a physical window size and the window scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let logical = size.to_logical::<f64>(scale);
        Self::from_host(logical.width as f32, logical.height as f32, scale as f32)
    }

    #[inline]
    pub fn aspect(self) -> f32 {
        self.width / self.height
    }

    /// Logical size in whole pixels, never smaller than 1×1.
    pub fn logical_size(self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }

    /// Size of the offscreen scene image: logical size scaled by the clamped
    /// pixel ratio, never smaller than 1×1.
    ///
    /// The output surface itself always matches the window's backing size.
    pub fn render_size(self) -> (u32, u32) {
        (
            ((self.width * self.pixel_ratio).round() as u32).max(1),
            ((self.height * self.pixel_ratio).round() as u32).max(1),
        )
    }
}

/// Clamps a host-reported device pixel ratio to `MAX_PIXEL_RATIO`.
pub fn effective_pixel_ratio(host: f32) -> f32 {
    if host.is_finite() && host > 0.0 {
        host.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

fn clamp_extent(v: f32) -> f32 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}
