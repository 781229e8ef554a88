//! Instant-driven debounce and throttle primitives.
//!
//! Neither type owns a timer. Callers pass the current `Instant` on every
//! event and poll with [`Debouncer::poll`] / [`Throttle::poll`] from their
//! event loop, which keeps every transition a pure function of its inputs.

use std::time::{Duration, Instant};
use tracing::trace;

/// Default delay before a filter edit is committed.
pub const DEFAULT_FILTER_DEBOUNCE_MS: u64 = 500;

/// Trailing-edge debouncer holding at most one pending value.
///
/// Every push restarts the quiet period. The value is released once no push
/// happened for `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T> {
    /// Debouncer with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.push_merge(value, now, |_, next| next);
    }

    /// Merge `value` into the pending value (if any) and restart the quiet period.
    ///
    /// `merge(previous, next)` produces the new pending value.
    pub fn push_merge(&mut self, value: T, now: Instant, merge: impl FnOnce(T, T) -> T) {
        let value = match self.pending.take() {
            Some(prev) => merge(prev.value, value),
            None => value,
        };
        let deadline = now + self.delay;
        trace!(delay_ms = self.delay.as_millis() as u64, "Debounce window restarted");
        self.pending = Some(Pending { value, deadline });
    }

    /// Release the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// True while a value waits for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes ready.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

/// Minimum-interval gate with a trailing fire.
///
/// The first request fires immediately; requests arriving within `interval`
/// of the last fire are deferred until the interval has elapsed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
    scheduled: Option<Instant>,
}

impl Throttle {
    /// Throttle with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            scheduled: None,
        }
    }

    /// Request a fire. Returns true if the caller should fire right now.
    pub fn request(&mut self, now: Instant) -> bool {
        let ready = match self.last_fired {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if ready && self.scheduled.is_none() {
            self.last_fired = Some(now);
            return true;
        }
        if self.scheduled.is_none() {
            let at = self.last_fired.map_or(now, |last| last + self.interval);
            trace!("Throttled; trailing fire scheduled");
            self.scheduled = Some(at);
        }
        false
    }

    /// Fire a deferred request whose time has come.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.scheduled {
            Some(at) if now >= at => {
                self.scheduled = None;
                self.last_fired = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Fire a deferred request immediately, if any.
    pub fn flush(&mut self, now: Instant) -> bool {
        if self.scheduled.take().is_some() {
            self.last_fired = Some(now);
            true
        } else {
            false
        }
    }

    /// True when a deferred fire is waiting.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn debouncer_releases_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        d.push("a", t0);
        assert_eq!(d.poll(t0 + ms(499)), None);
        assert_eq!(d.poll(t0 + ms(500)), Some("a"));
        assert!(!d.is_pending());
    }

    #[test]
    fn debouncer_deadline_moves_with_each_push() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        assert_eq!(d.deadline(), None);
        d.push(1, t0);
        assert_eq!(d.deadline(), Some(t0 + ms(500)));
        d.push(2, t0 + ms(200));
        assert_eq!(d.deadline(), Some(t0 + ms(700)));
        d.flush();
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn debouncer_coalesces_to_last_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(500));
        for (i, v) in ["a", "ab", "abc", "abcd"].into_iter().enumerate() {
            d.push(v, t0 + ms(100 * i as u64));
        }
        // Last push at 300ms, so nothing before 800ms.
        assert_eq!(d.poll(t0 + ms(700)), None);
        assert_eq!(d.poll(t0 + ms(800)), Some("abcd"));
        assert_eq!(d.poll(t0 + ms(2000)), None);
    }

    #[test]
    fn debouncer_merges_pending_values() {
        let t0 = Instant::now();
        let mut d: Debouncer<Vec<u8>> = Debouncer::new(ms(10));
        d.push(vec![1], t0);
        d.push_merge(vec![2], t0, |mut a, b| {
            a.extend(b);
            a
        });
        assert_eq!(d.flush(), Some(vec![1, 2]));
    }

    #[test]
    fn debouncer_cancel_drops_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(10));
        d.push(1, t0);
        d.cancel();
        assert_eq!(d.poll(t0 + ms(100)), None);
    }

    #[test]
    fn debouncer_zero_delay_is_ready_immediately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.push(7, t0);
        assert_eq!(d.poll(t0), Some(7));
    }

    #[test]
    fn throttle_first_request_fires() {
        let mut t = Throttle::new(ms(50));
        assert!(t.request(Instant::now()));
    }

    #[test]
    fn throttle_defers_within_interval() {
        let t0 = Instant::now();
        let mut t = Throttle::new(ms(50));
        assert!(t.request(t0));
        assert!(!t.request(t0 + ms(10)));
        assert!(!t.request(t0 + ms(20)));
        assert!(t.is_scheduled());
        assert!(!t.poll(t0 + ms(49)));
        assert!(t.poll(t0 + ms(50)));
        assert!(!t.poll(t0 + ms(60)), "Trailing fire happens once");
    }

    #[test]
    fn throttle_fires_again_after_interval() {
        let t0 = Instant::now();
        let mut t = Throttle::new(ms(50));
        assert!(t.request(t0));
        assert!(t.request(t0 + ms(60)));
    }

    #[test]
    fn throttle_flush_fires_scheduled() {
        let t0 = Instant::now();
        let mut t = Throttle::new(ms(50));
        t.request(t0);
        t.request(t0 + ms(1));
        assert!(t.flush(t0 + ms(2)));
        assert!(!t.flush(t0 + ms(3)));
    }
}
