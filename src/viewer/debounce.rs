//! Trailing-edge debouncing with a max-wait ceiling.
//!
//! Time is passed in by the caller (milliseconds from any monotonic origin)
//! so the same logic runs under a browser clock and in tests.

/// Batches rapid values, releasing the latest one once input has been quiet
/// for `wait` ms, or at the latest `max_wait` ms after the first unreleased value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: f64,
    max_wait: f64,
    pending: Option<T>,
    last_push_ms: f64,
    first_push_ms: Option<f64>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: f64, max_wait: f64) -> Self {
        Self {
            wait: wait.max(0.0),
            max_wait: max_wait.max(wait).max(0.0),
            pending: None,
            last_push_ms: 0.0,
            first_push_ms: None,
        }
    }

    /// Record a new value, replacing any unreleased one.
    pub fn push(&mut self, value: T, now_ms: f64) {
        self.pending = Some(value);
        self.last_push_ms = now_ms;
        if self.first_push_ms.is_none() {
            self.first_push_ms = Some(now_ms);
        }
    }

    /// Release the pending value if a deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let deadline = self.deadline()?;
        if now_ms >= deadline {
            self.flush()
        } else {
            None
        }
    }

    /// Release the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.first_push_ms = None;
        self.pending.take()
    }

    /// Drop the pending value.
    pub fn cancel(&mut self) {
        self.first_push_ms = None;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time at which [`Debouncer::poll`] will release the pending value.
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref()?;
        let quiet = self.last_push_ms + self.wait;
        let ceiling = self.first_push_ms.map_or(quiet, |first| first + self.max_wait);
        Some(quiet.min(ceiling))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_after_quiet_period() {
        let mut d = Debouncer::new(20.0, 60.0);
        d.push(1, 0.0);
        assert_eq!(d.poll(10.0), None);
        d.push(2, 10.0);
        assert_eq!(d.poll(29.0), None);
        assert_eq!(d.poll(30.0), Some(2));
        assert!(!d.is_pending());
        assert_eq!(d.poll(100.0), None);
    }

    #[test]
    fn test_max_wait_ceiling() {
        let mut d = Debouncer::new(20.0, 60.0);
        let mut released = Vec::new();
        // A continuous stream every 10ms never goes quiet.
        for step in 0..=12 {
            let now = f64::from(step) * 10.0;
            if let Some(v) = d.poll(now) {
                released.push((now, v));
            }
            d.push(step, now);
        }
        assert_eq!(released.first(), Some(&(60.0, 5)));
        assert_eq!(released.get(1), Some(&(120.0, 11)));
    }

    #[test]
    fn test_cancel_and_deadline() {
        let mut d = Debouncer::new(20.0, 10.0);
        assert_eq!(d.deadline(), None);
        d.push("a", 5.0);
        // max_wait is never below wait
        assert_eq!(d.deadline(), Some(25.0));
        d.cancel();
        assert_eq!(d.poll(100.0), None);
    }
}
