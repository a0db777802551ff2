//! Debounce timers for transition and resize handling.
//!
//! Two users:
//! 1. `Debounce<T>` - holds the latest value and fires it once a quiet
//!    period has elapsed (window resizes arrive in bursts; only the final
//!    geometry matters).
//! 2. `TransitionGate` - a page-transition-in-flight flag. Raised
//!    immediately when navigation starts, lowered only after a short
//!    debounced delay once navigation settles, so the backdrop stays dark
//!    through the whole fade instead of flickering back mid-transition.
//!
//! Both take `now: Instant` from the caller rather than sampling the clock
//! themselves, which keeps the frame loop on a single time source.

use std::time::{Duration, Instant};

/// One-slot debounce: re-scheduling replaces the pending value and resets
/// the timer.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: None,
        }
    }

    /// Schedule `value` to fire after the quiet period. Replaces any
    /// pending value and resets the timer.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Drop any pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns the pending value once its quiet period has elapsed.
    /// Clears the pending slot when it fires.
    pub fn tick(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((_, trigger_at)) if now >= *trigger_at);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Default settle delay after the last navigation-end signal.
pub const TRANSITION_SETTLE_MS: u64 = 150;

/// Transition-in-flight flag with a debounced end.
///
/// `begin()` raises the flag and cancels any pending end; `finish()` arms
/// the end timer; `tick()` lowers the flag once the timer elapses. A
/// begin/finish/begin sequence therefore keeps the gate raised - the end
/// only lands after a full quiet period.
#[derive(Debug, Clone)]
pub struct TransitionGate {
    active: bool,
    end_at: Option<Instant>,
    delay: Duration,
}

impl Default for TransitionGate {
    fn default() -> Self {
        Self::new(TRANSITION_SETTLE_MS)
    }
}

impl TransitionGate {
    pub fn new(settle_ms: u64) -> Self {
        Self {
            active: false,
            end_at: None,
            delay: Duration::from_millis(settle_ms),
        }
    }

    /// Navigation started: raise the flag, cancel any pending end.
    pub fn begin(&mut self) {
        self.active = true;
        self.end_at = None;
    }

    /// Navigation settled: arm the debounced end. Re-arming pushes the
    /// end further out.
    pub fn finish(&mut self, now: Instant) {
        if self.active {
            self.end_at = Some(now + self.delay);
        }
    }

    /// Advance the timer and report whether the gate is (still) raised.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(end_at) = self.end_at
            && now >= end_at
        {
            self.active = false;
            self.end_at = None;
        }
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut d: Debounce<u32> = Debounce::new(100);
        let t0 = Instant::now();

        d.schedule(1, t0);
        assert!(d.is_pending());
        assert!(d.tick(t0).is_none());
        assert!(d.tick(t0 + Duration::from_millis(99)).is_none());
        assert_eq!(d.tick(t0 + Duration::from_millis(100)), Some(1));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_debounce_reschedule_replaces_value() {
        let mut d: Debounce<u32> = Debounce::new(100);
        let t0 = Instant::now();

        d.schedule(1, t0);
        d.schedule(2, t0 + Duration::from_millis(60));

        // First deadline passed, but the timer was reset by the second call.
        assert!(d.tick(t0 + Duration::from_millis(110)).is_none());
        assert_eq!(d.tick(t0 + Duration::from_millis(160)), Some(2));
    }

    #[test]
    fn test_gate_begin_blocks_until_debounced_end() {
        let mut gate = TransitionGate::new(150);
        let t0 = Instant::now();

        gate.begin();
        assert!(gate.tick(t0));

        gate.finish(t0);
        assert!(gate.tick(t0 + Duration::from_millis(149)));
        assert!(!gate.tick(t0 + Duration::from_millis(150)));
    }

    #[test]
    fn test_gate_begin_cancels_pending_end() {
        let mut gate = TransitionGate::new(150);
        let t0 = Instant::now();

        gate.begin();
        gate.finish(t0);
        gate.begin(); // new navigation before the previous one settled

        assert!(gate.tick(t0 + Duration::from_millis(500)));

        gate.finish(t0 + Duration::from_millis(500));
        assert!(!gate.tick(t0 + Duration::from_millis(650)));
    }

    #[test]
    fn test_gate_finish_without_begin_is_noop() {
        let mut gate = TransitionGate::default();
        let t0 = Instant::now();

        gate.finish(t0);
        assert!(!gate.tick(t0 + Duration::from_millis(500)));
    }
}
