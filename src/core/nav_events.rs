//! Application-wide event types carried on the `EventBus`.
//!
//! The shell emits; the backdrop (and the frame loop via `poll()`) consume.

use crate::pages::PageId;

/// Navigation to another page has started (nav click, history change,
/// window close request). The backdrop hard-pauses while one is in flight.
#[derive(Debug, Clone, Copy)]
pub struct NavStarted {
    pub to: Option<PageId>,
}

/// The page fade has completed; the backdrop may resume after its settle
/// delay.
#[derive(Debug, Clone, Copy)]
pub struct NavSettled;

/// The window was hidden or shown (minimize / focus loss and return).
#[derive(Debug, Clone, Copy)]
pub struct VisibilityChanged {
    pub hidden: bool,
}

/// A preload operation settled; emitted from worker threads so the frame
/// loop can repaint nav indicators.
#[derive(Debug, Clone, Copy)]
pub struct PreloadSettled {
    pub page: PageId,
    pub ok: bool,
}
