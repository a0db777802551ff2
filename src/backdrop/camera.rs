//! Perspective camera: world-to-screen projection and screen-to-world rays.
//!
//! Conventions:
//! - World space: right-handed, +Y up.
//! - Screen space: +Y down, origin at the top-left of the viewport, pixels.
//!
//! `project` feeds the pointer hit-test (sphere center vs. click position);
//! `ray` feeds the per-cell renderer.

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// The portfolio viewpoint: left of center, above, far back.
    pub fn portfolio(aspect: f32) -> Self {
        Self {
            position: Vec3::new(-250.0, 250.0, 700.0),
            target: Vec3::ZERO,
            fov_y_deg: 70.0,
            aspect: aspect.max(1e-3),
            near: 1.0,
            far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(1e-3);
    }

    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// Project a world point to viewport pixels. None when the point is
    /// behind the camera.
    pub fn project(&self, world: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.projection() * self.view() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.x,
            (-ndc.y * 0.5 + 0.5) * viewport.y,
        ))
    }

    /// Ray through a viewport pixel: (origin, normalized direction).
    pub fn ray(&self, pixel: Vec2, viewport: Vec2) -> (Vec3, Vec3) {
        let ndc = Vec2::new(
            pixel.x / viewport.x * 2.0 - 1.0,
            -(pixel.y / viewport.y * 2.0 - 1.0),
        );
        let inv = (self.projection() * self.view()).inverse();
        let near = inv * Vec4::new(ndc.x, ndc.y, -1.0, 1.0);
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        (near, (far - near).normalize())
    }
}
