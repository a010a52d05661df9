//! Pickable scene geometry and ray intersection.

use glam::{Vec2, Vec3};

/// A ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a successful ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Intersection point in world space.
    pub point: Vec3,
    /// Surface coordinate of the hit, `(0, 0)` bottom-left to `(1, 1)` top-right.
    pub uv: Vec2,
    /// Distance along the ray.
    pub distance: f32,
}

/// An axis-aligned rectangle in a plane of constant z, facing +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    pub center: Vec3,
    pub size: Vec2,
}

impl PlaneSurface {
    pub const fn new(center: Vec3, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Corners in counter-clockwise order starting bottom-left, paired with their UV.
    pub fn corners(&self) -> [(Vec3, Vec2); 4] {
        let h = self.size * 0.5;
        let c = self.center;
        [
            (Vec3::new(c.x - h.x, c.y - h.y, c.z), Vec2::new(0.0, 0.0)),
            (Vec3::new(c.x + h.x, c.y - h.y, c.z), Vec2::new(1.0, 0.0)),
            (Vec3::new(c.x + h.x, c.y + h.y, c.z), Vec2::new(1.0, 1.0)),
            (Vec3::new(c.x - h.x, c.y + h.y, c.z), Vec2::new(0.0, 1.0)),
        ]
    }

    /// Intersects `ray` with this rectangle. Both faces are hit-testable.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        if ray.direction.z.abs() <= f32::EPSILON {
            return None;
        }

        let t = (self.center.z - ray.origin.z) / ray.direction.z;
        if t < 0.0 {
            return None;
        }

        let point = ray.at(t);
        let local = (point.truncate() - self.center.truncate()) / self.size + Vec2::splat(0.5);
        if !(0.0..=1.0).contains(&local.x) || !(0.0..=1.0).contains(&local.y) {
            return None;
        }

        Some(Hit {
            point,
            uv: local,
            distance: t,
        })
    }
}

/// The set of surfaces pointer rays are tested against.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    surfaces: Vec<PlaneSurface>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, surface: PlaneSurface) {
        self.surfaces.push(surface);
    }

    /// Nearest hit along `ray`, if any surface is crossed.
    pub fn pick(&self, ray: &Ray) -> Option<Hit> {
        self.surfaces
            .iter()
            .filter_map(|s| s.intersect(ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down_ray(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 10.0), Vec3::NEG_Z)
    }

    fn unit_plane(z: f32) -> PlaneSurface {
        PlaneSurface::new(Vec3::new(0.0, 0.0, z), Vec2::ONE)
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn centre_hit_has_centre_uv() {
        let hit = unit_plane(0.0).intersect(&down_ray(0.0, 0.0)).unwrap();
        assert_eq!(hit.point, Vec3::ZERO);
        assert_eq!(hit.uv, Vec2::splat(0.5));
        assert!((hit.distance - 10.0).abs() < 1e-5);
    }

    #[test]
    fn uv_origin_is_bottom_left() {
        let hit = unit_plane(0.0).intersect(&down_ray(-0.5, -0.5)).unwrap();
        assert!(hit.uv.abs_diff_eq(Vec2::ZERO, 1e-6));

        let hit = unit_plane(0.0).intersect(&down_ray(0.25, 0.5)).unwrap();
        assert!(hit.uv.abs_diff_eq(Vec2::new(0.75, 1.0), 1e-6));
    }

    #[test]
    fn ray_outside_rectangle_misses() {
        assert!(unit_plane(0.0).intersect(&down_ray(0.6, 0.0)).is_none());
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(unit_plane(0.0).intersect(&ray).is_none());
    }

    #[test]
    fn plane_behind_origin_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -1.0), Vec3::NEG_Z);
        assert!(unit_plane(0.0).intersect(&ray).is_none());
    }

    // ── pick ──────────────────────────────────────────────────────────────

    #[test]
    fn pick_returns_nearest_surface() {
        let mut scene = Scene::new();
        scene.add(unit_plane(-0.001));
        scene.add(unit_plane(0.0));

        let hit = scene.pick(&down_ray(0.1, 0.1)).unwrap();
        assert_eq!(hit.point.z, 0.0);
    }

    #[test]
    fn empty_scene_has_no_hit() {
        assert!(Scene::new().pick(&down_ray(0.0, 0.0)).is_none());
    }

    #[test]
    fn corners_follow_uv_layout() {
        let corners = PlaneSurface::new(Vec3::new(1.0, 2.0, 3.0), Vec2::new(2.0, 4.0)).corners();
        assert_eq!(corners[0], (Vec3::new(0.0, 0.0, 3.0), Vec2::new(0.0, 0.0)));
        assert_eq!(corners[2], (Vec3::new(2.0, 4.0, 3.0), Vec2::new(1.0, 1.0)));
    }
}
