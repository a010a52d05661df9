//! Orthographic camera that orbits a target point.

use glam::{Mat4, Vec2, Vec3};

use crate::scene::Ray;

/// Orthographic camera looking from `position` toward `target`, +Y up.
///
/// The frustum is a fixed unit square divided by `zoom`, so at zoom 1 the
/// 1×1 planes fill the viewport at any window shape. The aspect ratio is
/// tracked for diagnostics and for consumers that want to correct for
/// stretching.
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    near: f32,
    far: f32,
    position: Vec3,
    target: Vec3,
    zoom: f32,
    aspect: f32,
    view_proj: Mat4,
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(-0.5, 0.5, 0.5, -0.5, -1000.0, 1000.0, Vec3::new(0.0, 0.0, 1.0))
    }
}

impl OrthoCamera {
    /// Camera at `position` looking at the world origin.
    pub fn new(
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
        position: Vec3,
    ) -> Self {
        let mut camera = Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            position,
            target: Vec3::ZERO,
            zoom: 1.0,
            aspect: 1.0,
            view_proj: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Records a new aspect ratio and rebuilds the cached projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        self.update_projection();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Moves the camera and its look-at point.
    pub fn set_view(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        self.update_projection();
    }

    /// Sets the frustum zoom; non-positive values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
            self.update_projection();
        }
    }

    /// Unzoomed frustum width and height in world units.
    pub fn frustum_extent(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.top - self.bottom)
    }

    /// Camera right and up axes in world space.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let world = self.view().inverse();
        (world.x_axis.truncate(), world.y_axis.truncate())
    }

    /// World → clip transform (wgpu depth range `[0, 1]`).
    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    /// Ray from the near plane to the far plane through normalized device coordinates `ndc`.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj.inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    fn update_projection(&mut self) {
        let half = Vec2::new(self.right - self.left, self.top - self.bottom) / (2.0 * self.zoom);
        let centre = Vec2::new(self.right + self.left, self.top + self.bottom) * 0.5;
        let proj = Mat4::orthographic_rh(
            centre.x - half.x,
            centre.x + half.x,
            centre.y - half.y,
            centre.y + half.y,
            self.near,
            self.far,
        );
        self.view_proj = proj * self.view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── default pose ──────────────────────────────────────────────────────

    #[test]
    fn ndc_centre_ray_starts_on_axis() {
        let ray = OrthoCamera::default().ray_from_ndc(Vec2::ZERO);
        assert!(ray.origin.truncate().abs_diff_eq(Vec2::ZERO, 1e-5));
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn ndc_corners_map_to_frustum_edges() {
        let camera = OrthoCamera::default();
        let top_left = camera.ray_from_ndc(Vec2::new(-1.0, 1.0));
        assert!(top_left.origin.truncate().abs_diff_eq(Vec2::new(-0.5, 0.5), 1e-4));

        let right = camera.ray_from_ndc(Vec2::new(1.0, 0.0));
        assert!(right.origin.truncate().abs_diff_eq(Vec2::new(0.5, 0.0), 1e-4));
    }

    #[test]
    fn ray_origin_is_in_front_of_planes() {
        let ray = OrthoCamera::default().ray_from_ndc(Vec2::ZERO);
        assert!(ray.origin.z > 1.0);
    }

    #[test]
    fn world_origin_projects_to_clip_centre() {
        let clip = OrthoCamera::default().view_proj().project_point3(Vec3::ZERO);
        assert!(clip.truncate().abs_diff_eq(Vec2::ZERO, 1e-6));
        assert!((0.0..=1.0).contains(&clip.z));
    }

    #[test]
    fn aspect_is_recorded() {
        let mut camera = OrthoCamera::default();
        camera.set_aspect(800.0 / 600.0);
        assert!((camera.aspect() - 4.0 / 3.0).abs() < 1e-6);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect(), 1.0);
    }

    // ── moved camera ──────────────────────────────────────────────────────

    #[test]
    fn zoom_shrinks_the_frustum() {
        let mut camera = OrthoCamera::default();
        camera.set_zoom(2.0);
        let ray = camera.ray_from_ndc(Vec2::new(1.0, 1.0));
        assert!(ray.origin.truncate().abs_diff_eq(Vec2::new(0.25, 0.25), 1e-4));

        camera.set_zoom(0.0);
        assert_eq!(camera.zoom(), 2.0);
    }

    #[test]
    fn orbited_camera_rays_point_at_target() {
        let mut camera = OrthoCamera::default();
        let theta: f32 = 0.5;
        camera.set_view(Vec3::new(theta.sin(), 0.0, theta.cos()), Vec3::ZERO);

        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let expected = -Vec3::new(theta.sin(), 0.0, theta.cos());
        assert!(ray.direction.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn basis_follows_orbit() {
        let mut camera = OrthoCamera::default();
        let (right, up) = camera.basis();
        assert!(right.abs_diff_eq(Vec3::X, 1e-6));
        assert!(up.abs_diff_eq(Vec3::Y, 1e-6));

        camera.set_view(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        let (right, _) = camera.basis();
        assert!(right.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }
}
