use reveal_engine::coords::Viewport;
use reveal_engine::render::{OffscreenTarget, RenderCtx, RenderTarget};

use super::common::{linear_clamp_sampler, quad_pipeline, sampler_entry, texture_entry};
use super::composite::COMPOSITE_SAMPLES;

/// Owns the scene image and copies it onto the surface.
///
/// The scene image is sized by the clamped pixel ratio, so on displays with a
/// scale factor above 2 it is smaller than the surface and is stretched with
/// linear filtering. The composite draws into a multisampled twin of the scene
/// image and resolves into it.
pub struct PresentPass {
    target_format: Option<wgpu::TextureFormat>,
    scene: Option<OffscreenTarget>,
    msaa: Option<OffscreenTarget>,

    sampler: Option<wgpu::Sampler>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    /// Scene generation the bind group was built against.
    bind_generation: u64,
}

impl Default for PresentPass {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentPass {
    pub fn new() -> Self {
        Self {
            target_format: None,
            scene: None,
            msaa: None,
            sampler: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            bind_generation: u64::MAX,
        }
    }

    /// Creates or resizes the scene image and its multisampled twin.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>) {
        let size = scene_extent(ctx.viewport);

        if self.target_format != Some(ctx.surface_format) {
            self.scene = None;
            self.msaa = None;
            self.pipeline = None;
            self.bind_group = None;
            self.target_format = Some(ctx.surface_format);
        }

        match self.scene.as_mut() {
            Some(scene) => {
                scene.ensure_size(ctx.device, size);
            }
            None => {
                self.scene = Some(OffscreenTarget::new(
                    ctx.device,
                    "reveal scene",
                    ctx.surface_format,
                    size,
                ));
            }
        }
        match self.msaa.as_mut() {
            Some(msaa) => {
                msaa.ensure_size(ctx.device, size);
            }
            None => {
                self.msaa = Some(OffscreenTarget::multisampled(
                    ctx.device,
                    "reveal scene msaa",
                    ctx.surface_format,
                    size,
                    COMPOSITE_SAMPLES,
                ));
            }
        }
    }

    /// Multisampled color view and the scene view it resolves into.
    pub fn scene_views(&self) -> Option<(&wgpu::TextureView, &wgpu::TextureView)> {
        let msaa = self.msaa.as_ref()?;
        let scene = self.scene.as_ref()?;
        Some((msaa.view(), scene.view()))
    }

    /// Draws the scene image over the whole of `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.ensure_pipeline(ctx);
        self.ensure_bind_group(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("reveal present pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reveal blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/blit.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reveal blit bgl"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reveal blit pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        self.pipeline = Some(quad_pipeline(
            ctx.device,
            "reveal blit pipeline",
            &shader,
            &layout,
            &[],
            ctx.surface_format,
            wgpu::BlendState::REPLACE,
            1,
        ));
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        let sampler = self
            .sampler
            .get_or_insert_with(|| linear_clamp_sampler(ctx.device, "reveal blit sampler"));

        let Some(scene) = self.scene.as_ref() else { return };
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        if self.bind_group.is_some() && self.bind_generation == scene.generation() {
            return;
        }

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reveal blit bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.bind_generation = scene.generation();
    }
}

/// Size of the scene image for `viewport`: logical size times the clamped
/// pixel ratio.
fn scene_extent(viewport: Viewport) -> (u32, u32) {
    viewport.render_size()
}
