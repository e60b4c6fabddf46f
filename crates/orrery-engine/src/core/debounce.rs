/// Cancellable delayed task: each `schedule` replaces whatever was pending
/// and restarts the quiet period, so only the last value inside a burst is
/// ever delivered.
///
/// Time is passed in explicitly (milliseconds, e.g. `performance.now()`),
/// which keeps the type deterministic under test.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_ms: f64,
    pending: Option<(f64, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms: quiet_ms.max(0.0),
            pending: None,
        }
    }

    pub fn quiet_ms(&self) -> f64 {
        self.quiet_ms
    }

    /// Cancel any pending value and schedule `value` for `now + quiet_ms`.
    pub fn schedule(&mut self, now_ms: f64, value: T) {
        self.pending = Some((now_ms + self.quiet_ms, value));
    }

    /// Deliver the pending value once its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now_ms >= deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_quiet_period() {
        let mut d = Debouncer::new(250.0);
        d.schedule(1000.0, "a");
        assert_eq!(d.poll(1100.0), None);
        assert_eq!(d.poll(1249.9), None);
        assert_eq!(d.poll(1250.0), Some("a"));
        assert_eq!(d.poll(2000.0), None);
    }

    #[test]
    fn reschedule_restarts_and_keeps_last() {
        let mut d = Debouncer::new(250.0);
        d.schedule(0.0, 1);
        d.schedule(200.0, 2);
        d.schedule(400.0, 3);
        assert_eq!(d.poll(500.0), None);
        assert_eq!(d.poll(650.0), Some(3));
        assert!(!d.is_pending());
    }

    #[test]
    fn cancel_drops_pending() {
        let mut d = Debouncer::new(10.0);
        d.schedule(0.0, ());
        d.cancel();
        assert_eq!(d.poll(100.0), None);
    }
}
