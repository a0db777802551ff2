//! Application module - FolioApp and its submodules.
//!
//! - `nav` - sidebar, gradient frame border, watermark
//! - `pages_ui` - rendering of the four page bodies
//! - `run` - the eframe::App implementation (frame loop, persistence)

mod nav;
mod pages_ui;
mod run;

use eframe::egui;
use glam::Vec2;
use log::{error, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backdrop::{AsciiRenderer, Backdrop, DeviceClass, RendererFactory};
use crate::core::event_bus::EventBus;
use crate::core::nav_events::NavStarted;
use crate::core::preloader::PagePreloader;
use crate::core::workers::Workers;
use crate::pages::{PageBundle, PageId, PageStore, RouteTable};
use crate::settings::AppSettings;

/// Page crossfade driven by the frame loop.
///
/// `tick` reports completion exactly once so the shell can emit a single
/// navigation-settled signal per transition.
#[derive(Debug, Default)]
pub struct PageFade {
    started: Option<Instant>,
    settle_reported: bool,
}

impl PageFade {
    pub const DURATION: Duration = Duration::from_millis(200);

    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
        self.settle_reported = false;
    }

    /// Content opacity in [0, 1].
    pub fn opacity(&self, now: Instant) -> f32 {
        match self.started {
            None => 1.0,
            Some(started) => {
                let t = now.duration_since(started).as_secs_f32()
                    / Self::DURATION.as_secs_f32();
                t.clamp(0.0, 1.0)
            }
        }
    }

    /// True exactly once, on the frame the fade completes.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.started.is_some() && !self.settle_reported && self.opacity(now) >= 1.0 {
            self.settle_reported = true;
            return true;
        }
        false
    }
}

/// Frame-border gradient angle, smoothed toward the pointer direction.
///
/// The target snaps to 3 degree increments; the current angle moves along
/// the shortest angular path by 5% of the remaining difference per frame
/// and stops inside a 0.3 degree dead band.
#[derive(Debug, Clone, Copy)]
pub struct BorderAngle {
    pub target: f32,
    pub current: f32,
}

impl Default for BorderAngle {
    fn default() -> Self {
        Self {
            target: 135.0,
            current: 135.0,
        }
    }
}

impl BorderAngle {
    /// Aim the gradient at the pointer, measured from the screen center.
    pub fn point_at(&mut self, pointer: Vec2, center: Vec2) {
        let d = pointer - center;
        let raw = (d.y.atan2(d.x).to_degrees() + 360.0) % 360.0;
        self.target = (raw / 3.0).round() * 3.0;
    }

    /// One smoothing step; returns true while still animating.
    pub fn step(&mut self) -> bool {
        let diff = ((self.target - self.current + 540.0) % 360.0) - 180.0;
        if diff.abs() < 0.3 {
            return false;
        }
        self.current = (self.current + diff * 0.05).rem_euclid(360.0);
        true
    }
}

/// Main application state.
///
/// Persisted fields (settings, current page) ride through eframe storage;
/// everything else is rebuilt on startup by `Default`.
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FolioApp {
    pub settings: AppSettings,
    pub current_page: PageId,

    #[serde(skip)]
    pub workers: Arc<Workers>,
    #[serde(skip)]
    pub bus: EventBus,
    #[serde(skip)]
    pub store: PageStore,
    #[serde(skip)]
    pub routes: RouteTable,
    #[serde(skip)]
    pub preloader: PagePreloader,

    /// Mounted once, survives page changes. None = disabled or failed.
    #[serde(skip)]
    pub backdrop: Option<Backdrop>,
    #[serde(skip)]
    pub backdrop_failed: bool,

    #[serde(skip)]
    pub fade: PageFade,
    #[serde(skip)]
    pub border: BorderAngle,
    /// Page the cache was last warmed for.
    #[serde(skip)]
    pub warmed_for: Option<PageId>,
    /// Nav entry currently force-preloaded by hover/press/focus; guards
    /// against re-issuing every frame while the pointer sits still.
    #[serde(skip)]
    pub forced_hover: Option<PageId>,
    #[serde(skip)]
    pub was_hidden: bool,
    #[serde(skip)]
    pub close_signalled: bool,
    /// Sidebar rect from the previous frame; pointer presses inside it are
    /// navigation clicks, everything else goes to the backdrop hit-test.
    #[serde(skip)]
    pub nav_rect: egui::Rect,
}

impl Default for FolioApp {
    fn default() -> Self {
        let workers = Arc::new(Workers::new(2));
        let bus = EventBus::new();
        let store = PageStore::new();
        let routes = RouteTable::builtin(store.clone());
        let preloader = PagePreloader::new(Arc::clone(&workers)).with_emitter(bus.emitter());

        Self {
            settings: AppSettings::default(),
            current_page: PageId::Home,
            workers,
            bus,
            store,
            routes,
            preloader,
            backdrop: None,
            backdrop_failed: false,
            fade: PageFade::default(),
            border: BorderAngle::default(),
            warmed_for: None,
            forced_hover: None,
            was_hidden: false,
            close_signalled: false,
            nav_rect: egui::Rect::NOTHING,
        }
    }
}

impl FolioApp {
    /// Switch pages: signal the transition, then fade the new page in.
    pub fn navigate(&mut self, page: PageId, now: Instant) {
        if page == self.current_page {
            return;
        }
        self.bus.emit(NavStarted { to: Some(page) });
        self.current_page = page;
        self.fade.start(now);
    }

    /// Bundle for `page`: the store if warmed, otherwise an on-demand load
    /// at navigation time (the fallback a failed preload degrades to).
    pub fn bundle(&self, page: PageId) -> Option<Arc<PageBundle>> {
        if let Some(bundle) = self.store.get(page) {
            return Some(bundle);
        }
        if let Some(loader) = self.routes.loader(page)
            && let Err(err) = loader()
        {
            warn!("On-demand load of {:?} failed: {err:#}", page);
            return None;
        }
        self.store.get(page)
    }

    /// Mount the backdrop once a real viewport size is known. Failure is
    /// terminal for this run but harmless for the rest of the app.
    pub fn ensure_backdrop(&mut self, viewport: Vec2, now: Instant) {
        if self.backdrop.is_some()
            || self.backdrop_failed
            || !self.settings.backdrop_enabled
            || viewport.x <= 1.0
            || viewport.y <= 1.0
        {
            return;
        }

        let params = DeviceClass::from_width(viewport.x).render_params();
        let factory: RendererFactory =
            Box::new(move || Ok(Box::new(AsciiRenderer::new(viewport, params))));

        match Backdrop::mount(factory, viewport, &self.bus, now) {
            Ok(backdrop) => self.backdrop = Some(backdrop),
            Err(err) => {
                error!("Backdrop unavailable: {err:#}");
                self.backdrop_failed = true;
            }
        }
    }

    /// Warm the cache for the current page: priority pages first, then the
    /// rest, excluding the page being shown. Fire-and-forget.
    pub fn warm_preloads(&mut self) {
        if self.warmed_for == Some(self.current_page) {
            return;
        }
        self.warmed_for = Some(self.current_page);
        let _ = self.preloader.preload_priority(&self.routes);
        let _ = self.preloader.preload_all(&self.routes, Some(self.current_page));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_opacity_ramps_and_settles_once() {
        let mut fade = PageFade::default();
        let t0 = Instant::now();
        assert_eq!(fade.opacity(t0), 1.0);

        fade.start(t0);
        assert_eq!(fade.opacity(t0), 0.0);
        assert!((fade.opacity(t0 + Duration::from_millis(100)) - 0.5).abs() < 0.01);

        assert!(!fade.tick(t0 + Duration::from_millis(100)));
        assert!(fade.tick(t0 + Duration::from_millis(200)));
        // Completion is reported exactly once.
        assert!(!fade.tick(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn test_border_angle_snaps_target_to_three_degrees() {
        let mut border = BorderAngle::default();
        // Pointer straight down-right of center: 45 degrees.
        border.point_at(Vec2::new(110.0, 110.0), Vec2::new(100.0, 100.0));
        assert_eq!(border.target, 45.0);

        border.point_at(Vec2::new(200.0, 101.0), Vec2::new(100.0, 100.0));
        assert_eq!(border.target % 3.0, 0.0);
    }

    #[test]
    fn test_border_angle_takes_shortest_path() {
        let mut border = BorderAngle { target: 10.0, current: 350.0 };
        border.step();
        // Moving through 360, not backwards through 180.
        assert!(border.current > 350.0 || border.current < 10.0);

        for _ in 0..400 {
            if !border.step() {
                break;
            }
        }
        let diff = ((border.target - border.current + 540.0) % 360.0) - 180.0;
        assert!(diff.abs() < 0.3);
    }

    #[test]
    fn test_navigate_signals_and_switches() {
        let mut app = FolioApp::default();
        let t0 = Instant::now();

        app.navigate(PageId::Projects, t0);
        assert_eq!(app.current_page, PageId::Projects);
        assert!(app.fade.opacity(t0) < 1.0);
        assert_eq!(app.bus.poll().len(), 1);

        // Navigating to the current page is a no-op.
        app.navigate(PageId::Projects, t0);
        assert!(app.bus.poll().is_empty());
    }

    #[test]
    fn test_bundle_loads_on_demand() {
        let app = FolioApp::default();
        assert!(!app.store.contains(PageId::Contact));
        let bundle = app.bundle(PageId::Contact).unwrap();
        assert_eq!(bundle.page, PageId::Contact);
        assert!(app.store.contains(PageId::Contact));
    }

    #[test]
    fn test_warm_preloads_runs_once_per_page() {
        let mut app = FolioApp::default();
        app.warm_preloads();
        assert_eq!(app.warmed_for, Some(PageId::Home));

        // Wait for the background warmup to settle, then verify membership.
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            let stats = app.preloader.stats();
            if stats.loaded.len() == 3 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(app.preloader.is_loaded(PageId::Projects));
        assert!(app.preloader.is_loaded(PageId::Experience));
        assert!(app.preloader.is_loaded(PageId::Contact));
        assert!(!app.preloader.is_loaded(PageId::Home)); // excluded
    }
}
