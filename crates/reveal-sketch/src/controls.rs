//! Damped orbit, pan and zoom for the orthographic camera.
//!
//! Primary drag orbits around the target, secondary drag pans in screen
//! space, middle drag and the wheel zoom. Orbit and pan accumulate into
//! deltas that `update` bleeds into the camera a fraction at a time, so
//! motion eases out after the pointer stops.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use reveal_engine::coords::Viewport;
use reveal_engine::input::{InputEvent, PointerButton};

use crate::camera::OrthoCamera;

/// Keeps the polar angle off the poles, where look-at with +Y up degenerates.
const POLAR_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsConfig {
    /// Fraction of the pending motion applied per update, in `(0, 1]`.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_zoom: 0.1,
            max_zoom: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragMode {
    Rotate,
    Pan,
    Zoom,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    mode: DragMode,
    button: PointerButton,
}

/// Camera offset from the target: radius, azimuth around +Y measured from
/// +Z (`theta`), and polar angle from +Y (`phi`).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: PI * 0.5,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }
}

pub struct OrbitControls {
    config: ControlsConfig,
    target: Vec3,
    spherical: Spherical,
    /// Pending (theta, phi) rotation.
    rotate_delta: Vec2,
    pan_offset: Vec3,
    zoom: f32,
    drag: Option<Drag>,
    last_pointer: Option<Vec2>,
}

impl OrbitControls {
    /// Starts from the camera's current pose.
    pub fn new(config: ControlsConfig, camera: &OrthoCamera) -> Self {
        Self {
            config,
            target: camera.target(),
            spherical: Spherical::from_offset(camera.position() - camera.target()),
            rotate_delta: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            zoom: camera.zoom(),
            drag: None,
            last_pointer: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Feeds one input event. Pointer positions are logical pixels.
    pub fn handle_event(&mut self, event: &InputEvent, viewport: Viewport, camera: &OrthoCamera) {
        match event {
            InputEvent::PointerMoved(m) => {
                let pos = Vec2::new(m.x, m.y);
                if let (Some(drag), Some(last)) = (self.drag, self.last_pointer) {
                    let delta = pos - last;
                    match drag.mode {
                        DragMode::Rotate => self.rotate(delta, viewport),
                        DragMode::Pan => self.pan(delta, viewport, camera),
                        DragMode::Zoom => self.zoom_by_drag(delta.y),
                    }
                }
                self.last_pointer = Some(pos);
            }

            InputEvent::PointerButton {
                button,
                pressed: true,
            } => {
                if self.drag.is_none() {
                    let mode = match button {
                        PointerButton::Primary => DragMode::Rotate,
                        PointerButton::Secondary => DragMode::Pan,
                        PointerButton::Middle => DragMode::Zoom,
                    };
                    self.drag = Some(Drag {
                        mode,
                        button: *button,
                    });
                }
            }

            InputEvent::PointerButton {
                button,
                pressed: false,
            } => {
                if self.drag.is_some_and(|d| d.button == *button) {
                    self.drag = None;
                }
            }

            InputEvent::Wheel { delta_y } => {
                if *delta_y > 0.0 {
                    self.zoom_in();
                } else if *delta_y < 0.0 {
                    self.zoom_out();
                }
            }

            // A release that happens while unfocused is never delivered.
            InputEvent::Focused(false) => self.drag = None,
            InputEvent::Focused(true) => {}
        }
    }

    /// Applies one damped step of the pending motion to `camera`.
    pub fn update(&mut self, camera: &mut OrthoCamera) {
        let k = self.config.damping_factor;

        self.spherical.theta += self.rotate_delta.x * k;
        self.spherical.phi = (self.spherical.phi + self.rotate_delta.y * k)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.target += self.pan_offset * k;

        let decay = 1.0 - k;
        self.rotate_delta *= decay;
        self.pan_offset *= decay;

        camera.set_view(self.target + self.spherical.to_offset(), self.target);
        camera.set_zoom(self.zoom);
    }

    fn rotate(&mut self, delta: Vec2, viewport: Viewport) {
        let scale = TAU * self.config.rotate_speed / viewport.height;
        self.rotate_delta -= delta * scale;
    }

    fn pan(&mut self, delta: Vec2, viewport: Viewport, camera: &OrthoCamera) {
        let extent = camera.frustum_extent() / self.zoom;
        let world = Vec2::new(
            delta.x * extent.x / viewport.width,
            delta.y * extent.y / viewport.height,
        ) * self.config.pan_speed;

        // Screen +Y points down; the scene follows the pointer.
        let (right, up) = camera.basis();
        self.pan_offset += up * world.y - right * world.x;
    }

    fn zoom_by_drag(&mut self, dy: f32) {
        if dy > 0.0 {
            self.zoom_out();
        } else if dy < 0.0 {
            self.zoom_in();
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95f32.powf(self.config.zoom_speed)
    }

    fn zoom_in(&mut self) {
        self.zoom = (self.zoom / self.zoom_scale()).clamp(self.config.min_zoom, self.config.max_zoom);
    }

    fn zoom_out(&mut self) {
        self.zoom = (self.zoom * self.zoom_scale()).clamp(self.config.min_zoom, self.config.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reveal_engine::input::PointerMoveEvent;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    fn button(button: PointerButton, pressed: bool) -> InputEvent {
        InputEvent::PointerButton { button, pressed }
    }

    fn drag(controls: &mut OrbitControls, camera: &OrthoCamera, b: PointerButton, from: Vec2, to: Vec2) {
        let vp = viewport();
        controls.handle_event(&moved(from.x, from.y), vp, camera);
        controls.handle_event(&button(b, true), vp, camera);
        controls.handle_event(&moved(to.x, to.y), vp, camera);
        controls.handle_event(&button(b, false), vp, camera);
    }

    fn settle(controls: &mut OrbitControls, camera: &mut OrthoCamera) {
        for _ in 0..600 {
            controls.update(camera);
        }
    }

    // ── spherical ─────────────────────────────────────────────────────────

    #[test]
    fn default_pose_is_on_the_equator() {
        let s = Spherical::from_offset(Vec3::Z);
        assert_eq!(s.radius, 1.0);
        assert!(s.theta.abs() < 1e-6);
        assert!((s.phi - PI * 0.5).abs() < 1e-6);
        assert!(s.to_offset().abs_diff_eq(Vec3::Z, 1e-6));
    }

    // ── rotate ────────────────────────────────────────────────────────────

    #[test]
    fn idle_controls_leave_camera_in_place() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        settle(&mut controls, &mut camera);
        assert!(camera.position().abs_diff_eq(Vec3::Z, 1e-5));
        assert_eq!(camera.zoom(), 1.0);
    }

    #[test]
    fn horizontal_drag_orbits_by_full_angle_after_damping() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);

        // 2π · 60 / 600 = 0.2π of azimuth, to the left.
        drag(&mut controls, &camera, PointerButton::Primary, Vec2::new(400.0, 300.0), Vec2::new(460.0, 300.0));

        controls.update(&mut camera);
        let first = camera.position();
        assert!(first.x < 0.0 && first.x > -0.1, "damping applies only part of the motion");

        settle(&mut controls, &mut camera);
        let angle = -0.2 * PI;
        let expected = Vec3::new(angle.sin(), 0.0, angle.cos());
        assert!(camera.position().abs_diff_eq(expected, 1e-3));
    }

    #[test]
    fn polar_angle_is_clamped_off_the_pole() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        drag(&mut controls, &camera, PointerButton::Primary, Vec2::new(400.0, 0.0), Vec2::new(400.0, 6000.0));
        settle(&mut controls, &mut camera);
        assert!(camera.position().y > 0.99);
        assert!(camera.view_proj().is_finite());
    }

    #[test]
    fn moves_without_a_pressed_button_do_nothing() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        controls.handle_event(&moved(0.0, 0.0), viewport(), &camera);
        controls.handle_event(&moved(300.0, 200.0), viewport(), &camera);
        settle(&mut controls, &mut camera);
        assert!(camera.position().abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn focus_loss_ends_the_drag() {
        let camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        controls.handle_event(&button(PointerButton::Primary, true), viewport(), &camera);
        assert!(controls.is_dragging());
        controls.handle_event(&InputEvent::Focused(false), viewport(), &camera);
        assert!(!controls.is_dragging());
    }

    #[test]
    fn releasing_another_button_keeps_the_drag() {
        let camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        controls.handle_event(&button(PointerButton::Primary, true), viewport(), &camera);
        controls.handle_event(&button(PointerButton::Secondary, false), viewport(), &camera);
        assert!(controls.is_dragging());
    }

    // ── pan ───────────────────────────────────────────────────────────────

    #[test]
    fn pan_drag_moves_target_with_pointer() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);

        // 80 px right of 800 = 0.1 of the unit frustum; the scene follows, so the target moves left.
        drag(&mut controls, &camera, PointerButton::Secondary, Vec2::new(400.0, 300.0), Vec2::new(480.0, 300.0));
        settle(&mut controls, &mut camera);

        assert!(camera.target().abs_diff_eq(Vec3::new(-0.1, 0.0, 0.0), 1e-3));
        assert!(camera.position().abs_diff_eq(Vec3::new(-0.1, 0.0, 1.0), 1e-3));
    }

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn wheel_up_zooms_in_immediately() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        controls.handle_event(&InputEvent::Wheel { delta_y: 1.0 }, viewport(), &camera);
        controls.update(&mut camera);
        assert!((camera.zoom() - 1.0 / 0.95).abs() < 1e-5);

        controls.handle_event(&InputEvent::Wheel { delta_y: -1.0 }, viewport(), &camera);
        controls.handle_event(&InputEvent::Wheel { delta_y: -1.0 }, viewport(), &camera);
        controls.update(&mut camera);
        assert!((camera.zoom() - 0.95).abs() < 1e-5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        for _ in 0..1000 {
            controls.handle_event(&InputEvent::Wheel { delta_y: 1.0 }, viewport(), &camera);
        }
        controls.update(&mut camera);
        assert_eq!(camera.zoom(), 50.0);
    }

    #[test]
    fn middle_drag_down_zooms_out() {
        let mut camera = OrthoCamera::default();
        let mut controls = OrbitControls::new(ControlsConfig::default(), &camera);
        drag(&mut controls, &camera, PointerButton::Middle, Vec2::new(400.0, 300.0), Vec2::new(400.0, 320.0));
        controls.update(&mut camera);
        assert!(camera.zoom() < 1.0);
    }
}
