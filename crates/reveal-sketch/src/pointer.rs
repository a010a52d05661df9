//! Pointer projection: screen position → NDC → world point on the scene.

use glam::{Vec2, Vec3};

use crate::camera::OrthoCamera;
use crate::scene::Scene;

/// Pointer state shared by the projector and the particle pool for one tick.
///
/// `world_point` is sticky: it only changes when a ray cast hits the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerContext {
    /// Last pointer position in normalized device coordinates, `[-1, 1]` per axis, +Y up.
    pub ndc: Vec2,
    /// Last resolved intersection with the scene.
    pub world_point: Vec3,
}

/// Records a pointer move given in window pixels (origin top-left, +Y down).
///
/// Viewport extents below one pixel are treated as one pixel.
pub fn on_pointer_move(
    ctx: &mut PointerContext,
    screen_x: f32,
    screen_y: f32,
    viewport_w: f32,
    viewport_h: f32,
) {
    let w = viewport_w.max(1.0);
    let h = viewport_h.max(1.0);
    ctx.ndc = Vec2::new((screen_x / w) * 2.0 - 1.0, -(screen_y / h) * 2.0 + 1.0);
}

/// Casts a ray from `camera` through the current pointer NDC against `scene`.
///
/// On a hit, stores the hit point as the new world point and returns the
/// surface UV of the nearest surface. Without a hit, returns `None` and leaves
/// the world point untouched.
pub fn project(ctx: &mut PointerContext, camera: &OrthoCamera, scene: &Scene) -> Option<Vec2> {
    let ray = camera.ray_from_ndc(ctx.ndc);
    let hit = scene.pick(&ray)?;
    ctx.world_point = hit.point;
    Some(hit.uv)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::scene::PlaneSurface;

    fn sketch_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add(PlaneSurface::new(Vec3::new(0.0, 0.0, -0.001), Vec2::ONE));
        scene.add(PlaneSurface::new(Vec3::ZERO, Vec2::ONE));
        scene
    }

    // ── on_pointer_move ───────────────────────────────────────────────────

    #[test]
    fn right_edge_middle_maps_to_positive_x() {
        let mut ctx = PointerContext::default();
        on_pointer_move(&mut ctx, 800.0, 300.0, 800.0, 600.0);
        assert_eq!(ctx.ndc, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn top_left_maps_to_minus_one_plus_one() {
        let mut ctx = PointerContext::default();
        on_pointer_move(&mut ctx, 0.0, 0.0, 800.0, 600.0);
        assert_eq!(ctx.ndc, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn zero_viewport_does_not_divide_by_zero() {
        let mut ctx = PointerContext::default();
        on_pointer_move(&mut ctx, 0.5, 0.5, 0.0, 0.0);
        assert!(ctx.ndc.is_finite());
    }

    // ── project ───────────────────────────────────────────────────────────

    #[test]
    fn hit_updates_world_point_and_yields_uv() {
        let mut ctx = PointerContext::default();
        on_pointer_move(&mut ctx, 600.0, 150.0, 800.0, 600.0);

        let uv = project(&mut ctx, &OrthoCamera::default(), &sketch_scene()).unwrap();

        assert!(uv.abs_diff_eq(Vec2::new(0.75, 0.75), 1e-4));
        assert!(ctx.world_point.abs_diff_eq(Vec3::new(0.25, 0.25, 0.0), 1e-4));
    }

    #[test]
    fn miss_keeps_previous_world_point() {
        let mut ctx = PointerContext {
            ndc: Vec2::new(0.3, -0.2),
            world_point: Vec3::new(0.1, 0.2, 0.0),
        };
        let before = ctx.world_point;

        let uv = project(&mut ctx, &OrthoCamera::default(), &Scene::new());

        assert!(uv.is_none());
        assert_eq!(ctx.world_point, before);
    }

    #[test]
    fn world_point_sticks_after_leaving_geometry() {
        let plane = PlaneSurface::new(Vec3::ZERO, Vec2::splat(0.5));
        let mut small = Scene::new();
        small.add(plane);
        let camera = OrthoCamera::default();
        let mut ctx = PointerContext::default();

        on_pointer_move(&mut ctx, 400.0, 300.0, 800.0, 600.0);
        assert!(project(&mut ctx, &camera, &small).is_some());
        let inside = ctx.world_point;

        on_pointer_move(&mut ctx, 790.0, 10.0, 800.0, 600.0);
        assert!(project(&mut ctx, &camera, &small).is_none());
        assert_eq!(ctx.world_point, inside);
    }
}
