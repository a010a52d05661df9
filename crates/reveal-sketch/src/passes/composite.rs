use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use reveal_engine::render::{alpha_blend, OffscreenTarget, RenderCtx, RenderTarget, Texture};

use crate::scene::PlaneSurface;

use super::common::{
    linear_clamp_sampler, plane_vertices, quad_pipeline, sampler_entry, texture_entry,
    uniform_buffer, uniform_entry, CameraUniform, TexturedVertex, QUAD_INDICES,
};

const REVEAL_PRELUDE: &str = include_str!("../shaders/reveal_prelude.wgsl");

/// MSAA sample count of the composite; 4× is supported for every
/// renderable sRGB color format.
pub const COMPOSITE_SAMPLES: u32 = 4;

/// Fragment stage of the reveal plane.
///
/// The source is appended to a fixed prelude that declares the camera, the
/// `RevealParams { uTime, uMouse }` uniform, the `uMask`, `uTexture`,
/// `uOverlayTexture` textures, `uSampler`, the `VsOut` struct, and `vs_main`.
/// The source must define `fs_main(in: VsOut) -> @location(0) vec4<f32>`.
#[derive(Debug, Clone)]
pub struct RevealShader {
    label: &'static str,
    fragment: Cow<'static, str>,
}

impl RevealShader {
    pub fn new(label: &'static str, fragment: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label,
            fragment: fragment.into(),
        }
    }

    /// Full WGSL module: prelude followed by the fragment source.
    pub fn module_source(&self) -> String {
        format!("{REVEAL_PRELUDE}\n{}", self.fragment)
    }
}

impl Default for RevealShader {
    fn default() -> Self {
        Self::new("reveal shader", include_str!("../shaders/reveal.wgsl"))
    }
}

/// Per-frame scalar inputs of the reveal shader.
///
/// The textures (mask, primary, overlay) are bound by the pass itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevealUniforms {
    /// Seconds since start.
    pub time: f32,
    /// Pointer position on the reveal plane in plane UV.
    pub mouse: Vec2,
}

/// Draws the opaque background plane and the shader-driven reveal plane on top.
///
/// Renders into a `COMPOSITE_SAMPLES`-sampled target that resolves into the
/// scene image.
pub struct CompositePass {
    shader: RevealShader,
    background_plane: PlaneSurface,
    reveal_plane: PlaneSurface,

    pending_primary: Option<RgbaImage>,
    pending_overlay: Option<RgbaImage>,
    primary: Option<Texture>,
    overlay: Option<Texture>,
    sampler: Option<wgpu::Sampler>,

    pipeline_format: Option<wgpu::TextureFormat>,
    background_pipeline: Option<wgpu::RenderPipeline>,
    reveal_pipeline: Option<wgpu::RenderPipeline>,
    background_bgl: Option<wgpu::BindGroupLayout>,
    reveal_bgl: Option<wgpu::BindGroupLayout>,

    camera_ubo: Option<wgpu::Buffer>,
    params_ubo: Option<wgpu::Buffer>,
    background_bind_group: Option<wgpu::BindGroup>,
    reveal_bind_group: Option<wgpu::BindGroup>,
    /// Mask generation the reveal bind group was built against.
    reveal_bind_generation: u64,

    background_vbo: Option<wgpu::Buffer>,
    reveal_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
}

impl CompositePass {
    pub fn new(
        shader: RevealShader,
        background_plane: PlaneSurface,
        reveal_plane: PlaneSurface,
        primary: RgbaImage,
        overlay: RgbaImage,
    ) -> Self {
        Self {
            shader,
            background_plane,
            reveal_plane,
            pending_primary: Some(primary),
            pending_overlay: Some(overlay),
            primary: None,
            overlay: None,
            sampler: None,
            pipeline_format: None,
            background_pipeline: None,
            reveal_pipeline: None,
            background_bgl: None,
            reveal_bgl: None,
            camera_ubo: None,
            params_ubo: None,
            background_bind_group: None,
            reveal_bind_group: None,
            reveal_bind_generation: u64::MAX,
            background_vbo: None,
            reveal_vbo: None,
            quad_ibo: None,
        }
    }

    /// Clears `target` to `clear` and draws both planes.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        view_proj: Mat4,
        uniforms: &RevealUniforms,
        mask: &OffscreenTarget,
        clear: wgpu::Color,
    ) {
        self.ensure_textures(ctx);
        self.ensure_pipelines(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx, mask);

        if let Some(ubo) = self.camera_ubo.as_ref() {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&CameraUniform::new(view_proj)));
        }
        if let Some(ubo) = self.params_ubo.as_ref() {
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&RevealParams::from(uniforms)));
        }

        let Some(background_pipeline) = self.background_pipeline.as_ref() else { return };
        let Some(reveal_pipeline) = self.reveal_pipeline.as_ref() else { return };
        let Some(background_bg) = self.background_bind_group.as_ref() else { return };
        let Some(reveal_bg) = self.reveal_bind_group.as_ref() else { return };
        let Some(background_vbo) = self.background_vbo.as_ref() else { return };
        let Some(reveal_vbo) = self.reveal_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        // Once resolved, the multisampled contents are not needed.
        let store = match target.resolve_view {
            Some(_) => wgpu::StoreOp::Discard,
            None => wgpu::StoreOp::Store,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("reveal composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: target.resolve_view,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        let index_count = QUAD_INDICES.len() as u32;

        // Painter's order: the background sits behind the reveal plane.
        rpass.set_pipeline(background_pipeline);
        rpass.set_bind_group(0, background_bg, &[]);
        rpass.set_vertex_buffer(0, background_vbo.slice(..));
        rpass.draw_indexed(0..index_count, 0, 0..1);

        rpass.set_pipeline(reveal_pipeline);
        rpass.set_bind_group(0, reveal_bg, &[]);
        rpass.set_vertex_buffer(0, reveal_vbo.slice(..));
        rpass.draw_indexed(0..index_count, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_textures(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(image) = self.pending_primary.take() {
            self.primary = Some(Texture::from_rgba(ctx.device, ctx.queue, "reveal primary", &image));
            self.reveal_bind_group = None;
        }
        if let Some(image) = self.pending_overlay.take() {
            self.overlay = Some(Texture::from_rgba(ctx.device, ctx.queue, "reveal overlay", &image));
            self.background_bind_group = None;
            self.reveal_bind_group = None;
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format)
            && self.background_pipeline.is_some()
            && self.reveal_pipeline.is_some()
        {
            return;
        }

        let background_shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reveal background shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/plane.wgsl").into()),
        });
        let reveal_shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.shader.label),
            source: wgpu::ShaderSource::Wgsl(self.shader.module_source().into()),
        });

        let camera_size = std::mem::size_of::<CameraUniform>();

        let background_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reveal background bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, camera_size),
                texture_entry(1),
                sampler_entry(2),
            ],
        });
        let reveal_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reveal plane bgl"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX, camera_size),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT, std::mem::size_of::<RevealParams>()),
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
                sampler_entry(5),
            ],
        });

        let background_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reveal background pipeline layout"),
            bind_group_layouts: &[&background_bgl],
            immediate_size: 0,
        });
        let reveal_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reveal plane pipeline layout"),
            bind_group_layouts: &[&reveal_bgl],
            immediate_size: 0,
        });

        self.background_pipeline = Some(quad_pipeline(
            ctx.device,
            "reveal background pipeline",
            &background_shader,
            &background_layout,
            &[TexturedVertex::layout()],
            ctx.surface_format,
            wgpu::BlendState::REPLACE,
            COMPOSITE_SAMPLES,
        ));
        self.reveal_pipeline = Some(quad_pipeline(
            ctx.device,
            "reveal plane pipeline",
            &reveal_shader,
            &reveal_layout,
            &[TexturedVertex::layout()],
            ctx.surface_format,
            alpha_blend(),
            COMPOSITE_SAMPLES,
        ));

        self.pipeline_format = Some(ctx.surface_format);
        self.background_bgl = Some(background_bgl);
        self.reveal_bgl = Some(reveal_bgl);
        self.background_bind_group = None;
        self.reveal_bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>, mask: &OffscreenTarget) {
        let sampler = self
            .sampler
            .get_or_insert_with(|| linear_clamp_sampler(ctx.device, "reveal composite sampler"));
        let camera_ubo = self.camera_ubo.get_or_insert_with(|| {
            uniform_buffer(ctx.device, "reveal camera ubo", std::mem::size_of::<CameraUniform>())
        });
        let params_ubo = self.params_ubo.get_or_insert_with(|| {
            uniform_buffer(ctx.device, "reveal params ubo", std::mem::size_of::<RevealParams>())
        });

        let (Some(primary), Some(overlay)) = (self.primary.as_ref(), self.overlay.as_ref()) else {
            return;
        };

        if self.background_bind_group.is_none() {
            if let Some(bgl) = self.background_bgl.as_ref() {
                self.background_bind_group =
                    Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("reveal background bind group"),
                        layout: bgl,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: camera_ubo.as_entire_binding(),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::TextureView(overlay.view()),
                            },
                            wgpu::BindGroupEntry {
                                binding: 2,
                                resource: wgpu::BindingResource::Sampler(sampler),
                            },
                        ],
                    }));
            }
        }

        if self.reveal_bind_group.is_some() && self.reveal_bind_generation == mask.generation() {
            return;
        }
        let Some(bgl) = self.reveal_bgl.as_ref() else { return };

        self.reveal_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reveal plane bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(mask.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(primary.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(overlay.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.reveal_bind_generation = mask.generation();
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.background_vbo.is_some() && self.reveal_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.background_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("reveal background vbo"),
            contents: bytemuck::cast_slice(&plane_vertices(&self.background_plane)),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.reveal_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("reveal plane vbo"),
            contents: bytemuck::cast_slice(&plane_vertices(&self.reveal_plane)),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("reveal plane ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Mirrors `RevealParams` in the prelude (16 bytes; `uMouse` is 8-aligned).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RevealParams {
    time: f32,
    _pad: f32,
    mouse: [f32; 2],
}

impl From<&RevealUniforms> for RevealParams {
    fn from(u: &RevealUniforms) -> Self {
        Self {
            time: u.time,
            _pad: 0.0,
            mouse: u.mouse.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shader_is_prelude_plus_fragment() {
        let src = RevealShader::default().module_source();
        assert!(src.starts_with(REVEAL_PRELUDE));
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_main"));
    }

    #[test]
    fn prelude_declares_the_binding_contract() {
        for name in ["uTime", "uMouse", "uMask", "uTexture", "uOverlayTexture"] {
            assert!(REVEAL_PRELUDE.contains(name), "missing {name}");
        }
    }

    #[test]
    fn custom_fragment_replaces_default() {
        let shader = RevealShader::new(
            "flat",
            "@fragment fn fs_main(in: VsOut) -> @location(0) vec4<f32> { return vec4<f32>(in.uv, 0.0, 1.0); }",
        );
        let src = shader.module_source();
        assert!(src.contains("vec4<f32>(in.uv, 0.0, 1.0)"));
        assert!(!src.contains("fn noise"));
    }

    #[test]
    fn params_layout_matches_wgsl() {
        let p = RevealParams::from(&RevealUniforms {
            time: 1.5,
            mouse: Vec2::new(0.25, 0.75),
        });
        assert_eq!(std::mem::size_of::<RevealParams>(), 16);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&p));
        assert_eq!(floats, &[1.5, 0.0, 0.25, 0.75]);
    }
}
