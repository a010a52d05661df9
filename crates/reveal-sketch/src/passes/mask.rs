use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use image::RgbaImage;
use wgpu::util::DeviceExt;

use reveal_engine::coords::Viewport;
use reveal_engine::render::{additive_blend, OffscreenTarget, RenderCtx, RenderTarget, Texture};

use crate::particles::ParticlePool;

use super::common::{
    linear_clamp_sampler, quad_pipeline, sampler_entry, texture_entry, uniform_buffer,
    uniform_entry, TexturedVertex, QUAD_INDICES, SPRITE_QUAD,
};

/// Color format of the mask texture.
const MASK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Renders the particle pool into an offscreen mask texture.
///
/// Every particle is an additively blended billboard sampled from the sprite
/// texture. The target is cleared each frame, so the mask depends only on the
/// current particle transforms.
pub struct MaskPass {
    pending_sprite: Option<RgbaImage>,
    sprite: Option<Texture>,
    sampler: Option<wgpu::Sampler>,

    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    params_ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instances: Vec<SpriteInstance>,

    target: Option<OffscreenTarget>,
}

impl MaskPass {
    pub fn new(sprite: RgbaImage) -> Self {
        Self {
            pending_sprite: Some(sprite),
            sprite: None,
            sampler: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            params_ubo: None,
            quad_vbo: None,
            quad_ibo: None,
            instance_vbo: None,
            instance_capacity: 0,
            instances: Vec::new(),
            target: None,
        }
    }

    /// The mask target, once the first frame has created it.
    pub fn target(&self) -> Option<&OffscreenTarget> {
        self.target.as_ref()
    }

    /// Draws `pool` into the mask target, replacing its previous contents.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        pool: &ParticlePool,
        view_proj: Mat4,
    ) {
        self.ensure_target(ctx);
        self.ensure_sprite(ctx);
        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);

        let sprite = pool.sprite();
        self.instances.clear();
        self.instances.extend(pool.particles().iter().map(|p| SpriteInstance {
            center: [p.position.x, p.position.y, sprite.depth],
            scale: p.scale(),
        }));

        self.write_params(ctx, view_proj, sprite.size);
        self.ensure_instance_capacity(ctx, self.instances.len());
        if let Some(instance_vbo) = self.instance_vbo.as_ref().filter(|_| !self.instances.is_empty()) {
            ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&self.instances));
        }

        let Some(target) = self.target.as_ref() else { return };
        let mut target = RenderTarget::new(encoder, target.view());

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("reveal mask pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if self.instances.is_empty() {
            return;
        }

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.instances.len() as u32);
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_target(&mut self, ctx: &RenderCtx<'_>) {
        let size = mask_extent(ctx.viewport);
        match self.target.as_mut() {
            Some(target) => {
                target.ensure_size(ctx.device, size);
            }
            None => {
                self.target = Some(OffscreenTarget::new(ctx.device, "reveal mask target", MASK_FORMAT, size));
            }
        }
    }

    fn ensure_sprite(&mut self, ctx: &RenderCtx<'_>) {
        let Some(image) = self.pending_sprite.take() else { return };
        self.sprite = Some(Texture::from_rgba(ctx.device, ctx.queue, "reveal sprite", &image));
        self.bind_group = None;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reveal sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reveal sprite bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, std::mem::size_of::<SpriteParams>()),
                texture_entry(1),
                sampler_entry(2),
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reveal sprite pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = quad_pipeline(
            ctx.device,
            "reveal sprite pipeline",
            &shader,
            &pipeline_layout,
            &[TexturedVertex::layout(), SpriteInstance::layout()],
            MASK_FORMAT,
            additive_blend(),
            1,
        );

        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(sprite) = self.sprite.as_ref() else { return };

        let sampler = self
            .sampler
            .get_or_insert_with(|| linear_clamp_sampler(ctx.device, "reveal sprite sampler"));
        let params_ubo = self.params_ubo.get_or_insert_with(|| {
            uniform_buffer(ctx.device, "reveal sprite params ubo", std::mem::size_of::<SpriteParams>())
        });

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reveal sprite bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(sprite.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("reveal sprite quad vbo"),
            contents: bytemuck::cast_slice(&SPRITE_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("reveal sprite quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn write_params(&mut self, ctx: &RenderCtx<'_>, view_proj: Mat4, sprite_size: f32) {
        let Some(ubo) = self.params_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&SpriteParams::new(view_proj, sprite_size)));
    }

    /// The pool never grows, so this allocates once.
    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let cap = required.max(1);
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reveal sprite instance vbo"),
            size: (cap * std::mem::size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = cap;
    }
}

/// Mask texture size for `viewport`: its logical size in whole pixels,
/// independent of the pixel ratio.
pub(crate) fn mask_extent(viewport: Viewport) -> (u32, u32) {
    viewport.logical_size()
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Sprite uniform (80 bytes): view-projection plus billboard edge length.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpriteParams {
    view_proj: [[f32; 4]; 4],
    size: f32,
    _pad: [f32; 3],
}

impl SpriteParams {
    fn new(view_proj: Mat4, size: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            size,
            _pad: [0.0; 3],
        }
    }
}

/// Instance data layout (16 bytes):
///
///  offset  0  center  [f32; 3]  loc 2
///  offset 12  scale   f32       loc 3
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SpriteInstance {
    center: [f32; 3],
    scale: f32,
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        2 => Float32x3, // center
        3 => Float32    // scale
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reveal_engine::render::next_extent;

    #[test]
    fn mask_follows_logical_size_through_resizes() {
        let mut current = mask_extent(Viewport::from_host(800.0, 600.0, 1.0));
        for (w, h, ratio, expected) in [
            (1920.0, 1080.0, 2.0, (1920, 1080)),
            (0.0, 0.0, 1.0, (1, 1)),
            (800.0, 600.0, 3.0, (800, 600)),
        ] {
            if let Some(next) = next_extent(current, mask_extent(Viewport::from_host(w, h, ratio))) {
                current = next;
            }
            assert_eq!(current, expected);
        }
    }

    #[test]
    fn gpu_types_have_expected_sizes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 16);
        assert_eq!(std::mem::size_of::<SpriteParams>(), 80);
    }
}
