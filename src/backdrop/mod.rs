//! Backdrop lifecycle: mount, frame pacing, pause, transition gating and
//! disposal for the ASCII scene.
//!
//! **Architecture**: the shell owns exactly one `Backdrop` for the app's
//! lifetime (it survives page changes). The concrete renderer arrives
//! through a factory, so construction failure degrades to "no backdrop"
//! without touching the rest of the app, and tests inject doubles.
//!
//! **Timing model**: `tick()` is called every host frame but renders only
//! when the device-class frame interval has elapsed and no page transition
//! is in flight. The sphere's pose is a pure function of elapsed time;
//! pausing reapplies a captured snapshot each frame, and resuming re-enters
//! the live time function (the resulting jump is intended behavior).
//!
//! **Event wiring**: transition and visibility signals arrive over the
//! `EventBus`; every subscription is recorded in a ledger that `dispose()`
//! unwinds exactly once. `dispose()` is idempotent and also runs on drop.

pub mod ascii;
pub mod camera;
pub mod controls;
pub mod scene;

pub use ascii::{AsciiFrame, AsciiRenderer, RenderParams, RendererFactory, SceneRenderer};
pub use camera::Camera;
pub use controls::OrbitControls;
pub use scene::{MotionParams, PauseSnapshot, Scene};

use glam::Vec2;
use log::{debug, trace};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::core::debounce::{Debounce, TransitionGate};
use crate::core::event_bus::{EventBus, Subscription};
use crate::core::nav_events::{NavSettled, NavStarted, VisibilityChanged};

/// Window width at or below which the compact parameter set applies.
pub const COMPACT_BREAKPOINT: f32 = 768.0;

/// Quiet period before a resize is applied.
const RESIZE_DEBOUNCE_MS: u64 = 100;

/// Form-factor bucket; drives frame rate, hit radius, motion speeds and
/// render parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Compact,
}

impl DeviceClass {
    pub fn from_width(width: f32) -> Self {
        if width <= COMPACT_BREAKPOINT {
            DeviceClass::Compact
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn target_fps(self) -> f32 {
        match self {
            DeviceClass::Desktop => 30.0,
            DeviceClass::Compact => 20.0,
        }
    }

    pub fn frame_interval(self) -> Duration {
        Duration::from_secs_f32(1.0 / self.target_fps())
    }

    /// Pointer hit-test radius around the projected sphere center, in
    /// viewport pixels. Larger on compact for fat fingers.
    pub fn hit_radius(self) -> f32 {
        match self {
            DeviceClass::Desktop => 100.0,
            DeviceClass::Compact => 150.0,
        }
    }

    /// Orbit drag sensitivity; slower on compact.
    pub fn rotate_speed(self) -> f32 {
        match self {
            DeviceClass::Desktop => 1.0,
            DeviceClass::Compact => 0.5,
        }
    }

    /// Per-millisecond motion speeds; slower on compact.
    pub fn motion(self) -> MotionParams {
        match self {
            DeviceClass::Desktop => MotionParams {
                jump: 0.0005,
                spin_x: 0.00015,
                spin_z: 0.0001,
            },
            DeviceClass::Compact => MotionParams {
                jump: 0.0003,
                spin_x: 0.0001,
                spin_z: 0.00007,
            },
        }
    }

    pub fn render_params(self) -> RenderParams {
        match self {
            DeviceClass::Desktop => RenderParams {
                font_px: 12.0,
                color: [255, 255, 255],
                opacity: 0.8,
            },
            DeviceClass::Compact => RenderParams {
                font_px: 8.0,
                color: [255, 138, 149],
                opacity: 0.4,
            },
        }
    }
}

/// The mounted backdrop. Construct with [`Backdrop::mount`]; the shell
/// keeps it in an `Option` (absent = not mounted or construction failed).
pub struct Backdrop {
    scene: Scene,
    camera: Camera,
    controls: OrbitControls,
    renderer: Option<Box<dyn SceneRenderer>>,
    surface: Option<AsciiFrame>,

    started: Instant,
    last_render: Option<Instant>,

    paused: bool,
    snapshot: Option<PauseSnapshot>,

    gate: Arc<Mutex<TransitionGate>>,
    resize: Debounce<Vec2>,
    requested_viewport: Vec2,
    viewport: Vec2,
    device: DeviceClass,

    bus: EventBus,
    subscriptions: Vec<Subscription>,
    disposed: bool,
}

impl Backdrop {
    /// Build the scene and renderer and wire the event subscriptions.
    ///
    /// The factory is fallible on purpose: a renderer that cannot be
    /// constructed means no backdrop, never a broken page.
    pub fn mount(
        factory: RendererFactory,
        viewport: Vec2,
        bus: &EventBus,
        now: Instant,
    ) -> anyhow::Result<Backdrop> {
        let device = DeviceClass::from_width(viewport.x);
        let renderer = factory()?;

        let gate = Arc::new(Mutex::new(TransitionGate::default()));
        let mut subscriptions = Vec::new();

        {
            let gate = Arc::clone(&gate);
            subscriptions.push(bus.subscribe::<NavStarted, _>(move |_| {
                gate.lock().unwrap_or_else(|e| e.into_inner()).begin();
            }));
        }
        {
            let gate = Arc::clone(&gate);
            subscriptions.push(bus.subscribe::<NavSettled, _>(move |_| {
                gate.lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .finish(Instant::now());
            }));
        }
        {
            let gate = Arc::clone(&gate);
            subscriptions.push(bus.subscribe::<VisibilityChanged, _>(move |e| {
                let mut gate = gate.lock().unwrap_or_else(|e| e.into_inner());
                if e.hidden {
                    gate.begin();
                } else {
                    gate.finish(Instant::now());
                }
            }));
        }

        debug!(
            "Backdrop mounted: viewport {}x{}, {:?}",
            viewport.x, viewport.y, device
        );

        let camera = Camera::portfolio(viewport.x / viewport.y.max(1.0));
        let controls = OrbitControls::for_camera(&camera, device.rotate_speed());

        Ok(Self {
            scene: Scene::new(),
            camera,
            controls,
            renderer: Some(renderer),
            surface: None,
            started: now,
            last_render: None,
            paused: false,
            snapshot: None,
            gate,
            resize: Debounce::new(RESIZE_DEBOUNCE_MS),
            requested_viewport: viewport,
            viewport,
            device,
            bus: bus.clone(),
            subscriptions,
            disposed: false,
        })
    }

    /// Advance one host frame. Returns true when a new frame was rendered;
    /// `frame()` keeps returning the latest frame either way.
    ///
    /// Runs on every call regardless of pause state so resize and the
    /// transition gate stay responsive.
    pub fn tick(&mut self, now: Instant, viewport: Vec2) -> bool {
        if self.disposed {
            return false;
        }

        if viewport != self.requested_viewport {
            self.resize.schedule(viewport, now);
            self.requested_viewport = viewport;
        }
        if let Some(v) = self.resize.tick(now) {
            self.apply_resize(v);
        }

        // Hard pause while a page transition is in flight.
        if self
            .gate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tick(now)
        {
            return false;
        }

        if let Some(last) = self.last_render
            && now.duration_since(last) < self.device.frame_interval()
        {
            return false;
        }
        self.last_render = Some(now);

        if let Some(snap) = self.snapshot {
            self.scene.apply_snapshot(&snap);
        } else {
            let motion = self.device.motion();
            self.scene.advance(self.elapsed_ms(now), &motion);
        }
        self.controls.update(&mut self.camera);

        if let Some(renderer) = self.renderer.as_mut() {
            self.surface = Some(renderer.render(&self.scene, &self.camera));
            true
        } else {
            false
        }
    }

    /// Pointer or touch hit-test against the sphere's projected position;
    /// toggles pause when the hit lands. Returns whether it toggled.
    pub fn pointer_down(&mut self, pos: Vec2, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        let Some(screen) = self.camera.project(self.scene.sphere.center, self.viewport) else {
            return false;
        };
        if (pos - screen).length() >= self.device.hit_radius() {
            return false;
        }

        if self.paused {
            // Resume re-enters the live time function; the jump back is
            // intended.
            self.paused = false;
            self.snapshot = None;
            trace!("Backdrop resumed");
        } else {
            self.paused = true;
            self.snapshot = Some(self.scene.snapshot(self.elapsed_ms(now)));
            trace!("Backdrop paused at {:?}", self.snapshot);
        }
        true
    }

    /// Pointer moved with the primary button held; orbits the camera.
    pub fn pointer_dragged(&mut self, pos: Vec2) {
        if !self.disposed {
            self.controls.drag_to(pos, self.viewport);
        }
    }

    /// Primary button released; ends the current orbit gesture.
    pub fn pointer_released(&mut self) {
        self.controls.release();
    }

    /// Latest rendered frame, if any.
    pub fn frame(&self) -> Option<&AsciiFrame> {
        self.surface.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_transitioning(&self) -> bool {
        self.gate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Release everything exactly once: unsubscribe the ledger, drop the
    /// renderer and detach the output frame. Safe to call repeatedly and
    /// from drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for sub in self.subscriptions.drain(..) {
            self.bus.unsubscribe(sub);
        }
        self.renderer = None;
        self.surface = None;
        self.snapshot = None;
        debug!("Backdrop disposed");
    }

    fn apply_resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.camera.set_aspect(viewport.x / viewport.y.max(1.0));

        let device = DeviceClass::from_width(viewport.x);
        if device != self.device {
            debug!("Device class changed: {:?} -> {:?}", self.device, device);
            self.device = device;
            self.controls.set_rotate_speed(device.rotate_speed());
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(viewport, self.device.render_params());
        }
    }

    fn elapsed_ms(&self, now: Instant) -> f32 {
        now.duration_since(self.started).as_secs_f32() * 1000.0
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Renderer double: counts renders and records the sphere pose it saw.
    struct RecordingRenderer {
        renders: Arc<AtomicUsize>,
        last_y: Arc<Mutex<f32>>,
    }

    impl SceneRenderer for RecordingRenderer {
        fn resize(&mut self, _viewport: Vec2, _params: RenderParams) {}

        fn render(&mut self, scene: &Scene, _camera: &Camera) -> AsciiFrame {
            self.renders.fetch_add(1, Ordering::SeqCst);
            *self.last_y.lock().unwrap() = scene.sphere.center.y;
            AsciiFrame {
                cols: 1,
                rows: 1,
                lines: vec![" ".into()],
                params: DeviceClass::Desktop.render_params(),
            }
        }
    }

    struct Rig {
        backdrop: Backdrop,
        bus: EventBus,
        renders: Arc<AtomicUsize>,
        last_y: Arc<Mutex<f32>>,
        t0: Instant,
        viewport: Vec2,
    }

    fn rig() -> Rig {
        let bus = EventBus::new();
        let renders = Arc::new(AtomicUsize::new(0));
        let last_y = Arc::new(Mutex::new(f32::NAN));
        let viewport = Vec2::new(1280.0, 720.0);
        let t0 = Instant::now();

        let r = Arc::clone(&renders);
        let y = Arc::clone(&last_y);
        let factory: RendererFactory = Box::new(move || {
            Ok(Box::new(RecordingRenderer {
                renders: r,
                last_y: y,
            }))
        });

        let backdrop = Backdrop::mount(factory, viewport, &bus, t0).unwrap();
        Rig {
            backdrop,
            bus,
            renders,
            last_y,
            t0,
            viewport,
        }
    }

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_mount_failure_is_an_error() {
        let bus = EventBus::new();
        let factory: RendererFactory = Box::new(|| anyhow::bail!("no renderer available"));
        assert!(Backdrop::mount(factory, Vec2::new(800.0, 600.0), &bus, Instant::now()).is_err());
    }

    #[test]
    fn test_tick_respects_frame_interval() {
        let mut rig = rig();
        let v = rig.viewport;

        assert!(rig.backdrop.tick(rig.t0, v));
        // Desktop interval is ~33ms; 10ms later nothing renders.
        assert!(!rig.backdrop.tick(ms(rig.t0, 10), v));
        assert!(rig.backdrop.tick(ms(rig.t0, 40), v));
        assert_eq!(rig.renders.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_transition_gate_hard_pauses_rendering() {
        let mut rig = rig();
        let v = rig.viewport;

        rig.bus.emit(NavStarted { to: None });
        assert!(!rig.backdrop.tick(ms(rig.t0, 100), v));
        assert!(rig.backdrop.is_transitioning());

        // Settle; the gate lowers only after its quiet period.
        rig.bus.emit(NavSettled);
        assert!(rig.backdrop.tick(ms(rig.t0, 1000), v));
    }

    #[test]
    fn test_visibility_hidden_pauses_rendering() {
        let mut rig = rig();
        let v = rig.viewport;

        rig.bus.emit(VisibilityChanged { hidden: true });
        assert!(!rig.backdrop.tick(ms(rig.t0, 100), v));

        rig.bus.emit(VisibilityChanged { hidden: false });
        assert!(rig.backdrop.tick(ms(rig.t0, 1000), v));
    }

    #[test]
    fn test_pause_freezes_pose_and_resume_jumps_to_live_time() {
        let mut rig = rig();
        let v = rig.viewport;
        let motion = DeviceClass::Desktop.motion();

        assert!(rig.backdrop.tick(ms(rig.t0, 100), v));
        let y_at_pause = *rig.last_y.lock().unwrap();

        // Click on the sphere's projected center.
        let hit = rig
            .backdrop
            .camera
            .project(rig.backdrop.scene.sphere.center, v)
            .unwrap();
        assert!(rig.backdrop.pointer_down(hit, ms(rig.t0, 100)));
        assert!(rig.backdrop.is_paused());

        // Time advances, pose does not.
        assert!(rig.backdrop.tick(ms(rig.t0, 500), v));
        assert_eq!(*rig.last_y.lock().unwrap(), y_at_pause);

        // Resume: pose comes from the live time function, not from the
        // frozen value.
        assert!(rig.backdrop.pointer_down(hit, ms(rig.t0, 500)));
        assert!(!rig.backdrop.is_paused());
        assert!(rig.backdrop.tick(ms(rig.t0, 2000), v));

        let mut expected = Scene::new();
        expected.advance(2000.0, &motion);
        let live_y = *rig.last_y.lock().unwrap();
        assert!((live_y - expected.sphere.center.y).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_far_from_sphere_does_not_toggle() {
        let mut rig = rig();
        let v = rig.viewport;

        rig.backdrop.tick(rig.t0, v);
        assert!(!rig.backdrop.pointer_down(Vec2::new(1.0, 1.0), rig.t0));
        assert!(!rig.backdrop.is_paused());
    }

    #[test]
    fn test_dispose_is_idempotent_and_stops_everything() {
        let mut rig = rig();
        let v = rig.viewport;

        rig.backdrop.tick(rig.t0, v);
        assert!(rig.bus.has_subscribers::<NavStarted>());

        rig.backdrop.dispose();
        rig.backdrop.dispose(); // second call must not panic

        assert!(rig.backdrop.is_disposed());
        assert!(!rig.bus.has_subscribers::<NavStarted>());
        assert!(rig.backdrop.frame().is_none());

        let before = rig.renders.load(Ordering::SeqCst);
        assert!(!rig.backdrop.tick(ms(rig.t0, 5000), v));
        assert_eq!(rig.renders.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_resize_across_breakpoint_switches_device_class() {
        let mut rig = rig();
        assert_eq!(rig.backdrop.device(), DeviceClass::Desktop);

        // Narrow viewport; resize applies after the debounce quiet period.
        let narrow = Vec2::new(600.0, 720.0);
        rig.backdrop.tick(ms(rig.t0, 40), narrow);
        rig.backdrop.tick(ms(rig.t0, 200), narrow);

        assert_eq!(rig.backdrop.device(), DeviceClass::Compact);
    }
}
