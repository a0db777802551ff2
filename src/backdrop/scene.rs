//! Backdrop scene graph and its motion.
//!
//! One faceted sphere bouncing over a ground plane, lit by two point
//! lights. Motion is a pure function of elapsed wall-clock time, so a
//! paused scene can be frozen by reapplying a snapshot and a resumed scene
//! re-enters the live function (with the resulting visible jump).

use glam::Vec3;

/// Sphere segment counts; shading is quantized to these facets so the
/// rotation is visible on an otherwise featureless ball.
pub const SPHERE_WIDTH_SEGMENTS: u32 = 20;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 10;

/// Peak bounce height above the rest position.
pub const BOUNCE_HEIGHT: f32 = 150.0;

#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    /// Euler rotation (radians); only x and z are animated.
    pub rotation: Vec3,
}

#[derive(Debug, Clone)]
pub struct Ground {
    /// Plane height (world y).
    pub y: f32,
    /// Half extent of the square plane.
    pub half: f32,
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f32,
}

/// Per-millisecond motion speeds; device-class dependent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub jump: f32,
    pub spin_x: f32,
    pub spin_z: f32,
}

/// Values captured when the scene pauses, reapplied each frame while
/// paused so the sphere freezes in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauseSnapshot {
    pub elapsed_ms: f32,
    pub position_y: f32,
    pub rotation_x: f32,
    pub rotation_z: f32,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub sphere: Sphere,
    pub ground: Ground,
    pub lights: [PointLight; 2],
}

impl Scene {
    pub fn new() -> Self {
        Self {
            sphere: Sphere {
                center: Vec3::ZERO,
                radius: 200.0,
                rotation: Vec3::ZERO,
            },
            ground: Ground { y: -200.0, half: 200.0 },
            lights: [
                PointLight {
                    position: Vec3::new(500.0, 500.0, 500.0),
                    intensity: 3.0,
                },
                PointLight {
                    position: Vec3::new(-500.0, -500.0, -500.0),
                    intensity: 1.0,
                },
            ],
        }
    }

    /// Advance the sphere to its pose at `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: f32, motion: &MotionParams) {
        self.sphere.center.y = (elapsed_ms * motion.jump).sin().abs() * BOUNCE_HEIGHT;
        self.sphere.rotation.x = elapsed_ms * motion.spin_x;
        self.sphere.rotation.z = elapsed_ms * motion.spin_z;
    }

    /// Freeze the sphere at the snapshot pose.
    pub fn apply_snapshot(&mut self, snap: &PauseSnapshot) {
        self.sphere.center.y = snap.position_y;
        self.sphere.rotation.x = snap.rotation_x;
        self.sphere.rotation.z = snap.rotation_z;
    }

    /// Capture the current pose for pausing.
    pub fn snapshot(&self, elapsed_ms: f32) -> PauseSnapshot {
        PauseSnapshot {
            elapsed_ms,
            position_y: self.sphere.center.y,
            rotation_x: self.sphere.rotation.x,
            rotation_z: self.sphere.rotation.z,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOTION: MotionParams = MotionParams {
        jump: 0.0005,
        spin_x: 0.00015,
        spin_z: 0.0001,
    };

    #[test]
    fn test_motion_is_deterministic_in_elapsed_time() {
        let mut a = Scene::new();
        let mut b = Scene::new();

        // Whatever path each scene took, the same elapsed time gives the
        // same pose.
        a.advance(1000.0, &MOTION);
        a.advance(7000.0, &MOTION);
        b.advance(7000.0, &MOTION);

        assert_eq!(a.sphere.center.y, b.sphere.center.y);
        assert_eq!(a.sphere.rotation, b.sphere.rotation);
    }

    #[test]
    fn test_bounce_stays_above_rest_height() {
        let mut scene = Scene::new();
        for t in [0.0f32, 250.0, 1234.0, 99999.0] {
            scene.advance(t, &MOTION);
            assert!(scene.sphere.center.y >= 0.0);
            assert!(scene.sphere.center.y <= BOUNCE_HEIGHT);
        }
    }

    #[test]
    fn test_snapshot_round_trip_freezes_pose() {
        let mut scene = Scene::new();
        scene.advance(4321.0, &MOTION);
        let snap = scene.snapshot(4321.0);

        scene.advance(9999.0, &MOTION);
        scene.apply_snapshot(&snap);

        assert_eq!(scene.sphere.center.y, snap.position_y);
        assert_eq!(scene.sphere.rotation.x, snap.rotation_x);
        assert_eq!(scene.sphere.rotation.z, snap.rotation_z);
    }
}
