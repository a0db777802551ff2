//! FOLIO - portfolio shell library
//!
//! Re-exports all modules for use by the binary target and tests.

// Core engine (preloading, events, timers, workers)
pub mod core;

// Backdrop (lifecycle + ASCII rendering)
pub mod backdrop;

// App modules
pub mod app;
pub mod cli;
pub mod pages;
pub mod settings;

// Re-export commonly used types
pub use crate::backdrop::{Backdrop, DeviceClass};
pub use crate::core::event_bus::{BoxedEvent, EventBus, EventEmitter, downcast_event};
pub use crate::core::preloader::{PagePreloader, PreloadStats, PreloadTicket};
pub use crate::core::workers::Workers;
pub use crate::pages::{PageBundle, PageId, PageStore, RouteTable};
pub use crate::settings::AppSettings;
