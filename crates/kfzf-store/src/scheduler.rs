use std::time::{Duration, Instant};

/// Rate limiter for full rewrites.
///
/// A request inside `min_interval` of the last accepted one is dropped, not
/// queued: the next mutation's request is what eventually triggers the next
/// rewrite. There is no timer.
#[derive(Clone, Debug)]
pub struct DumpScheduler {
    min_interval: Duration,
    last_full_dump: Option<Instant>,
}

impl DumpScheduler {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_full_dump: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_full_dump(&self) -> Option<Instant> {
        self.last_full_dump
    }

    /// Time since the last accepted rewrite, if any.
    pub fn elapsed_since_last(&self, now: Instant) -> Option<Duration> {
        self.last_full_dump
            .map(|last| now.saturating_duration_since(last))
    }

    /// Returns `true` if a rewrite may run at `now`, recording `now` as the
    /// last rewrite time. Returns `false` while throttled.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if let Some(elapsed) = self.elapsed_since_last(now) {
            if elapsed < self.min_interval {
                return false;
            }
        }
        self.last_full_dump = Some(now);
        true
    }

    /// Records a rewrite that bypassed the throttle.
    pub fn record(&mut self, now: Instant) {
        self.last_full_dump = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Duration = Duration::from_millis(500);

    #[test]
    fn first_request_always_runs() {
        let mut scheduler = DumpScheduler::new(Duration::from_secs(3600));
        assert!(scheduler.try_acquire(Instant::now()));
    }

    #[test]
    fn requests_inside_interval_are_dropped() {
        let start = Instant::now();
        let mut scheduler = DumpScheduler::new(T);
        assert!(scheduler.try_acquire(start));
        assert!(!scheduler.try_acquire(start + Duration::from_millis(1)));
        assert!(!scheduler.try_acquire(start + T - Duration::from_millis(1)));
        // Dropped requests do not move the window.
        assert_eq!(scheduler.last_full_dump(), Some(start));
    }

    #[test]
    fn requests_at_or_after_interval_run() {
        let start = Instant::now();
        let mut scheduler = DumpScheduler::new(T);
        assert!(scheduler.try_acquire(start));
        assert!(scheduler.try_acquire(start + T));
        assert!(scheduler.try_acquire(start + T * 3));
        assert_eq!(scheduler.last_full_dump(), Some(start + T * 3));
    }

    #[test]
    fn zero_interval_never_throttles() {
        let now = Instant::now();
        let mut scheduler = DumpScheduler::new(Duration::ZERO);
        assert!(scheduler.try_acquire(now));
        assert!(scheduler.try_acquire(now));
    }

    #[test]
    fn forced_rewrite_restarts_the_window() {
        let start = Instant::now();
        let mut scheduler = DumpScheduler::new(T);
        scheduler.record(start);
        assert!(!scheduler.try_acquire(start + Duration::from_millis(10)));
        assert_eq!(
            scheduler.elapsed_since_last(start + Duration::from_millis(10)),
            Some(Duration::from_millis(10))
        );
    }
}
