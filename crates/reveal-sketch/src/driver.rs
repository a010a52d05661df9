//! Per-frame orchestration of the sketch.
//!
//! Tick order: elapsed time → input events (camera controls, pointer) →
//! damped camera step → projection → particle advance → mask pass →
//! composite pass → present. The runtime schedules the next redraw.

use reveal_engine::coords::Viewport;
use reveal_engine::core::{App, AppControl, FrameCtx};
use reveal_engine::input::InputEvent;
use reveal_engine::render::RenderTarget;
use winit::window::WindowId;

use crate::assets::SketchAssets;
use crate::camera::OrthoCamera;
use crate::config::SketchConfig;
use crate::controls::OrbitControls;
use crate::particles::ParticlePool;
use crate::passes::{CompositePass, MaskPass, PresentPass, RevealUniforms};
use crate::pointer::{self, PointerContext};
use crate::scene::Scene;

pub struct RevealSketch {
    clear_color: wgpu::Color,
    viewport: Viewport,
    camera: OrthoCamera,
    controls: OrbitControls,
    scene: Scene,
    pointer: PointerContext,
    pool: ParticlePool,
    uniforms: RevealUniforms,

    mask: MaskPass,
    composite: CompositePass,
    present: PresentPass,
}

impl RevealSketch {
    pub fn new(config: SketchConfig, assets: SketchAssets) -> Self {
        let SketchConfig {
            particles,
            sprite,
            reveal_plane,
            background_plane,
            reveal_shader,
            controls,
            clear_color,
            ..
        } = config;

        let pool = match particles.seed {
            Some(seed) => ParticlePool::with_seed(particles, sprite, seed),
            None => ParticlePool::initialize(particles, sprite),
        };

        let mut scene = Scene::new();
        scene.add(background_plane);
        scene.add(reveal_plane);

        let SketchAssets {
            primary,
            overlay,
            sprite: sprite_image,
        } = assets;

        let camera = OrthoCamera::default();
        let controls = OrbitControls::new(controls, &camera);

        Self {
            clear_color,
            viewport: Viewport::default(),
            camera,
            controls,
            scene,
            pointer: PointerContext::default(),
            pool,
            uniforms: RevealUniforms::default(),
            mask: MaskPass::new(sprite_image),
            composite: CompositePass::new(
                reveal_shader,
                background_plane,
                reveal_plane,
                primary,
                overlay,
            ),
            present: PresentPass::new(),
        }
    }

    /// Records the new viewport and refreshes the camera projection.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        log::debug!(
            "viewport {}x{} @{} (aspect {:.3})",
            viewport.width,
            viewport.height,
            viewport.pixel_ratio,
            self.camera.aspect(),
        );
    }

    /// CPU half of a tick: input, camera, projection, particles, uniforms.
    ///
    /// `events` are the input events of this frame, oldest first.
    pub fn update(&mut self, elapsed: f32, events: &[InputEvent]) {
        self.uniforms.time = elapsed;

        for event in events {
            self.controls.handle_event(event, self.viewport, &self.camera);
            if let InputEvent::PointerMoved(m) = event {
                pointer::on_pointer_move(
                    &mut self.pointer,
                    m.x,
                    m.y,
                    self.viewport.width,
                    self.viewport.height,
                );
            }
        }
        self.controls.update(&mut self.camera);

        if let Some(uv) = pointer::project(&mut self.pointer, &self.camera, &self.scene) {
            self.uniforms.mouse = uv;
        }

        self.pool.advance(self.pointer.world_point);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn pointer(&self) -> &PointerContext {
        &self.pointer
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn uniforms(&self) -> &RevealUniforms {
        &self.uniforms
    }
}

impl App for RevealSketch {
    fn on_resize(&mut self, _window_id: WindowId, viewport: Viewport) {
        self.resize(viewport);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.update(ctx.time.elapsed, &ctx.input_frame.events);

        let clear = self.clear_color;
        let view_proj = self.camera.view_proj();
        let pool = &self.pool;
        let uniforms = &self.uniforms;
        let mask = &mut self.mask;
        let composite = &mut self.composite;
        let present = &mut self.present;

        ctx.render(clear, |rctx, target| {
            mask.render(rctx, target.encoder, pool, view_proj);

            present.prepare(rctx);
            if let (Some(mask_target), Some((color, resolve))) = (mask.target(), present.scene_views()) {
                let mut scene = RenderTarget::resolving(target.encoder, color, resolve);
                composite.render(rctx, &mut scene, view_proj, uniforms, mask_target, clear);
            }

            present.render(rctx, target);
        })
    }
}
