//! Core engine modules - preloading, events, timers, workers.
//!
//! Everything here is UI-independent; the shell and the backdrop sit on top.

pub mod debounce;
pub mod event_bus;
pub mod nav_events;
pub mod preloader;
pub mod workers;

// Re-exports for convenience
pub use debounce::{Debounce, TransitionGate};
pub use event_bus::{EventBus, EventEmitter, Subscription};
pub use preloader::{PagePreloader, PreloadBatch, PreloadStats, PreloadTicket};
pub use workers::Workers;
