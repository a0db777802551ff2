//! ASCII renderer: casts one ray per character cell and maps the lit
//! surface to a density ramp.
//!
//! The renderer sits behind the `SceneRenderer` trait so the lifecycle
//! manager never depends on how frames are produced; tests substitute a
//! recording double and the shell injects this implementation.

use glam::{Mat3, Vec2, Vec3};

use super::camera::Camera;
use super::scene::{Scene, SPHERE_HEIGHT_SEGMENTS, SPHERE_WIDTH_SEGMENTS};

/// Character ramp, sparse to dense.
pub const ASCII_RAMP: &[u8] = b" .:-+*=%@#";

/// Approximate advance/height ratio of a monospace glyph.
const CELL_ASPECT: f32 = 0.6;

/// Grid bounds; keeps pathological viewports from allocating huge frames.
const MIN_COLS: usize = 16;
const MAX_COLS: usize = 360;
const MIN_ROWS: usize = 8;
const MAX_ROWS: usize = 200;

/// Flat shade of the unlit ground plane.
const GROUND_BRIGHTNESS: f32 = 0.55;

/// Device-class rendering parameters (resolution proxy, tint, opacity).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub font_px: f32,
    pub color: [u8; 3],
    pub opacity: f32,
}

/// One rendered character frame plus the parameters to paint it with.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiFrame {
    pub cols: usize,
    pub rows: usize,
    pub lines: Vec<String>,
    pub params: RenderParams,
}

/// Rendering boundary injected into the lifecycle manager.
pub trait SceneRenderer: Send {
    fn resize(&mut self, viewport: Vec2, params: RenderParams);
    fn render(&mut self, scene: &Scene, camera: &Camera) -> AsciiFrame;
}

/// Deferred renderer construction; failure leaves the page without a
/// backdrop but otherwise intact.
pub type RendererFactory = Box<dyn FnOnce() -> anyhow::Result<Box<dyn SceneRenderer>> + Send>;

pub struct AsciiRenderer {
    viewport: Vec2,
    params: RenderParams,
    cols: usize,
    rows: usize,
}

impl AsciiRenderer {
    pub fn new(viewport: Vec2, params: RenderParams) -> Self {
        let mut r = Self {
            viewport: Vec2::ZERO,
            params,
            cols: MIN_COLS,
            rows: MIN_ROWS,
        };
        r.resize(viewport, params);
        r
    }

    fn ramp_char(brightness: f32) -> char {
        let last = ASCII_RAMP.len() - 1;
        let idx = (brightness.clamp(0.0, 1.0) * last as f32).round() as usize;
        ASCII_RAMP[idx.min(last)] as char
    }

    /// Brightness of the scene along one ray, 0.0 when nothing is hit.
    fn shade(&self, scene: &Scene, origin: Vec3, dir: Vec3) -> f32 {
        let sphere_t = intersect_sphere(scene, origin, dir);
        let ground_t = intersect_ground(scene, origin, dir);

        match (sphere_t, ground_t) {
            (Some(ts), Some(tg)) if tg < ts => GROUND_BRIGHTNESS,
            (Some(ts), _) => self.shade_sphere(scene, origin + dir * ts),
            (None, Some(_)) => GROUND_BRIGHTNESS,
            (None, None) => 0.0,
        }
    }

    fn shade_sphere(&self, scene: &Scene, point: Vec3) -> f32 {
        let sphere = &scene.sphere;
        let normal = (point - sphere.center) / sphere.radius;
        let normal = facet_normal(normal, sphere.rotation);

        let mut luminance = 0.0;
        for light in &scene.lights {
            let to_light = (light.position - point).normalize();
            luminance += light.intensity * normal.dot(to_light).max(0.0);
        }
        (luminance / 3.0).clamp(0.0, 1.0)
    }
}

impl SceneRenderer for AsciiRenderer {
    fn resize(&mut self, viewport: Vec2, params: RenderParams) {
        self.viewport = viewport;
        self.params = params;
        let cell_w = params.font_px * CELL_ASPECT;
        let cell_h = params.font_px;
        self.cols = ((viewport.x / cell_w) as usize).clamp(MIN_COLS, MAX_COLS);
        self.rows = ((viewport.y / cell_h) as usize).clamp(MIN_ROWS, MAX_ROWS);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> AsciiFrame {
        let mut lines = Vec::with_capacity(self.rows);
        for row in 0..self.rows {
            let mut line = String::with_capacity(self.cols);
            for col in 0..self.cols {
                let pixel = Vec2::new(
                    (col as f32 + 0.5) / self.cols as f32 * self.viewport.x,
                    (row as f32 + 0.5) / self.rows as f32 * self.viewport.y,
                );
                let (origin, dir) = camera.ray(pixel, self.viewport);
                line.push(Self::ramp_char(self.shade(scene, origin, dir)));
            }
            lines.push(line);
        }
        AsciiFrame {
            cols: self.cols,
            rows: self.rows,
            lines,
            params: self.params,
        }
    }
}

fn intersect_sphere(scene: &Scene, origin: Vec3, dir: Vec3) -> Option<f32> {
    let sphere = &scene.sphere;
    let oc = origin - sphere.center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - sphere.radius * sphere.radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t > 1e-3).then_some(t)
}

fn intersect_ground(scene: &Scene, origin: Vec3, dir: Vec3) -> Option<f32> {
    if dir.y.abs() < 1e-6 {
        return None;
    }
    let t = (scene.ground.y - origin.y) / dir.y;
    if t <= 1e-3 {
        return None;
    }
    let p = origin + dir * t;
    let half = scene.ground.half;
    (p.x.abs() <= half && p.z.abs() <= half).then_some(t)
}

/// Quantize a surface normal to the sphere's facet grid so the flat-shaded
/// facets (and therefore the rotation) are visible.
fn facet_normal(normal: Vec3, rotation: Vec3) -> Vec3 {
    let rot = Mat3::from_rotation_z(rotation.z) * Mat3::from_rotation_x(rotation.x);
    // World -> object space; the rotation matrix is orthonormal.
    let local = rot.transpose() * normal;

    let polar = local.y.clamp(-1.0, 1.0).acos();
    let azimuth = local.z.atan2(local.x);

    let h = SPHERE_HEIGHT_SEGMENTS as f32;
    let w = SPHERE_WIDTH_SEGMENTS as f32;
    let polar_q = ((polar / std::f32::consts::PI * h).floor() + 0.5) / h * std::f32::consts::PI;
    let azimuth_q = ((azimuth / std::f32::consts::TAU * w).floor() + 0.5) / w * std::f32::consts::TAU;

    let local_q = Vec3::new(
        polar_q.sin() * azimuth_q.cos(),
        polar_q.cos(),
        polar_q.sin() * azimuth_q.sin(),
    );
    rot * local_q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backdrop::DeviceClass;

    fn desktop_renderer(viewport: Vec2) -> AsciiRenderer {
        AsciiRenderer::new(viewport, DeviceClass::Desktop.render_params())
    }

    #[test]
    fn test_frame_dimensions_match_grid() {
        let mut r = desktop_renderer(Vec2::new(1280.0, 720.0));
        let scene = Scene::new();
        let camera = Camera::portfolio(1280.0 / 720.0);

        let frame = r.render(&scene, &camera);
        assert_eq!(frame.lines.len(), frame.rows);
        assert!(frame.lines.iter().all(|l| l.chars().count() == frame.cols));
    }

    #[test]
    fn test_sphere_appears_in_frame() {
        let mut r = desktop_renderer(Vec2::new(1280.0, 720.0));
        let scene = Scene::new();
        let camera = Camera::portfolio(1280.0 / 720.0);

        let frame = r.render(&scene, &camera);
        let inked: usize = frame
            .lines
            .iter()
            .map(|l| l.chars().filter(|c| *c != ' ').count())
            .sum();
        assert!(inked > 0, "expected lit cells, frame was empty");
    }

    #[test]
    fn test_sphere_center_ray_hits() {
        let scene = Scene::new();
        let camera = Camera::portfolio(1.0);
        let viewport = Vec2::new(800.0, 800.0);

        let center_px = camera.project(scene.sphere.center, viewport).unwrap();
        let (origin, dir) = camera.ray(center_px, viewport);
        assert!(intersect_sphere(&scene, origin, dir).is_some());
    }

    #[test]
    fn test_resize_rescales_grid() {
        let mut r = desktop_renderer(Vec2::new(1280.0, 720.0));
        let wide_cols = {
            let scene = Scene::new();
            let camera = Camera::portfolio(1280.0 / 720.0);
            r.render(&scene, &camera).cols
        };

        r.resize(Vec2::new(640.0, 720.0), DeviceClass::Desktop.render_params());
        let scene = Scene::new();
        let camera = Camera::portfolio(640.0 / 720.0);
        let narrow = r.render(&scene, &camera);
        assert!(narrow.cols < wide_cols);
    }

    #[test]
    fn test_facet_normal_is_unit_and_stable() {
        let n = Vec3::new(0.3, 0.8, 0.52).normalize();
        let q1 = facet_normal(n, Vec3::new(0.4, 0.0, 1.2));
        let q2 = facet_normal(n, Vec3::new(0.4, 0.0, 1.2));
        assert!((q1.length() - 1.0).abs() < 1e-4);
        assert_eq!(q1, q2);
    }
}
