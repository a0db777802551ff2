//! Pointer-orbit camera controls.
//!
//! Dragging on the backdrop orbits the camera around the scene center at a
//! fixed radius. The lifecycle manager feeds pointer positions in and calls
//! `update()` once per rendered frame; everything else is plain state.

use glam::{Vec2, Vec3};

use super::camera::Camera;

/// Pitch limit keeps the camera off the poles.
const PITCH_LIMIT: f32 = 1.45;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    yaw: f32,
    pitch: f32,
    radius: f32,
    rotate_speed: f32,
    last_drag: Option<Vec2>,
    dirty: bool,
}

impl OrbitControls {
    /// Derive the orbit pose from the camera's current offset to its
    /// target.
    pub fn for_camera(camera: &Camera, rotate_speed: f32) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(1e-3);
        Self {
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / radius).clamp(-1.0, 1.0).asin(),
            radius,
            rotate_speed,
            last_drag: None,
            dirty: false,
        }
    }

    pub fn set_rotate_speed(&mut self, rotate_speed: f32) {
        self.rotate_speed = rotate_speed;
    }

    /// Feed a pointer position while the primary button is held. The first
    /// position anchors the drag; subsequent ones accumulate rotation.
    pub fn drag_to(&mut self, pos: Vec2, viewport: Vec2) {
        if let Some(last) = self.last_drag {
            let delta = (pos - last) / viewport.y.max(1.0);
            self.yaw -= delta.x * std::f32::consts::TAU * self.rotate_speed;
            self.pitch = (self.pitch + delta.y * std::f32::consts::PI * self.rotate_speed)
                .clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.dirty = true;
        }
        self.last_drag = Some(pos);
    }

    /// Pointer released; the next drag starts a fresh gesture.
    pub fn release(&mut self) {
        self.last_drag = None;
    }

    /// Apply accumulated rotation to the camera. Returns true if the
    /// camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.radius;
        camera.position = camera.target + offset;
        true
    }
}
