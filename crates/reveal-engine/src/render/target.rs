/// A color texture that passes render into.
///
/// Recreated (not resized in place) when the requested size changes. Each
/// recreation bumps `generation`, so consumers holding bind groups that
/// reference the old view know to rebuild them.
///
/// Single-sampled targets are also sampleable; multisampled ones are
/// attachment-only and must be resolved into a single-sampled target.
pub struct OffscreenTarget {
    label: &'static str,
    format: wgpu::TextureFormat,
    sample_count: u32,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: (u32, u32),
    generation: u64,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> Self {
        Self::multisampled(device, label, format, size, 1)
    }

    pub fn multisampled(
        device: &wgpu::Device,
        label: &'static str,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        sample_count: u32,
    ) -> Self {
        let size = clamp_extent(size);
        let (texture, view) = create_color_texture(device, label, format, size, sample_count);
        Self {
            label,
            format,
            sample_count,
            _texture: texture,
            view,
            size,
            generation: 0,
        }
    }

    /// Recreates the texture if `size` differs from the current one.
    ///
    /// Returns `true` when the texture was recreated.
    pub fn ensure_size(&mut self, device: &wgpu::Device, size: (u32, u32)) -> bool {
        let Some(size) = next_extent(self.size, size) else {
            return false;
        };

        let (texture, view) =
            create_color_texture(device, self.label, self.format, size, self.sample_count);
        self._texture = texture;
        self.view = view;
        self.size = size;
        self.generation += 1;

        log::debug!("offscreen target '{}' resized to {}x{}", self.label, size.0, size.1);
        true
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Size a target must be recreated at to serve `requested`, or `None` when
/// the current texture already fits. Requests are clamped to at least 1×1.
pub fn next_extent(current: (u32, u32), requested: (u32, u32)) -> Option<(u32, u32)> {
    let requested = clamp_extent(requested);
    (requested != current).then_some(requested)
}

fn clamp_extent((width, height): (u32, u32)) -> (u32, u32) {
    (width.max(1), height.max(1))
}

/// Multisampled textures cannot be bound for sampling; they are only resolved.
fn target_usage(sample_count: u32) -> wgpu::TextureUsages {
    if sample_count > 1 {
        wgpu::TextureUsages::RENDER_ATTACHMENT
    } else {
        wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
    }
}

fn create_color_texture(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    (width, height): (u32, u32),
    sample_count: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let usage = target_usage(sample_count);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_size_keeps_texture() {
        assert_eq!(next_extent((800, 600), (800, 600)), None);
    }

    #[test]
    fn resize_sequence_tracks_requested_size() {
        let mut current = (800, 600);
        let mut recreated = 0;
        for (requested, expected) in [
            ((1920, 1080), (1920, 1080)),
            ((0, 0), (1, 1)),
            ((800, 600), (800, 600)),
            ((800, 600), (800, 600)),
        ] {
            if let Some(next) = next_extent(current, requested) {
                current = next;
                recreated += 1;
            }
            assert_eq!(current, expected);
        }
        assert_eq!(recreated, 3);
    }

    #[test]
    fn zero_request_on_one_pixel_target_is_a_no_op() {
        assert_eq!(next_extent((1, 1), (0, 0)), None);
    }

    // ── usage ─────────────────────────────────────────────────────────────

    #[test]
    fn single_sampled_targets_are_sampleable() {
        assert!(target_usage(1).contains(wgpu::TextureUsages::TEXTURE_BINDING));
    }

    #[test]
    fn multisampled_targets_are_attachment_only() {
        assert_eq!(target_usage(4), wgpu::TextureUsages::RENDER_ATTACHMENT);
    }
}
