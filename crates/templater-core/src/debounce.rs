//! Trailing-edge debouncing of selection changes
//!
//! Selection events fire on every intermediate drag position; only the last
//! one in a burst is worth validating. Time is passed in by the caller so
//! the debouncer stays deterministic.

use std::time::{Duration, Instant};

/// Default delay before a pending selection is evaluated
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Holds the latest value until `delay` passes without a newer one
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    /// A deadline past the end of representable time never fires
    pending: Option<(T, Option<Instant>)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue `value`, replacing anything pending and restarting the delay
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now.checked_add(self.delay)));
    }

    /// Drop the pending value, returning it if there was one
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes ready
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and_then(|(_, deadline)| *deadline)
    }

    /// Take the pending value if its delay has elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.cancel(),
            _ => None,
        }
    }
}
