/// Scheduled-task handles for the session's periodic work.
///
/// A `Timer` is a single slot: `start()` replaces whatever was scheduled
/// before, so one handle can never have two schedules armed at once.
/// Time never advances on its own; the owner feeds `now` into `poll()`.

use std::time::{Duration, Instant};

/// Lower bound on any cadence. A zero interval would never let `poll` drain.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Debug)]
pub struct Timer {
    interval: Duration,
    /// Next scheduled firing. `None` = cancelled / never started.
    next_due: Option<Instant>,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Timer {
            interval: interval.max(MIN_INTERVAL),
            next_due: None,
        }
    }

    /// Arm the timer: first firing one interval after `now`.
    /// Cancels any previous schedule.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    #[allow(dead_code)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Pop the next due firing at or before `now`, returning its scheduled
    /// instant. Call in a loop to catch up on missed periods in order.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(due + self.interval);
        Some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_timer_never_fires() {
        let t0 = Instant::now();
        let mut t = Timer::new(ms(10));
        assert!(!t.is_active());
        assert_eq!(t.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn fires_once_per_period_with_catch_up() {
        let t0 = Instant::now();
        let mut t = Timer::new(ms(50));
        t.start(t0);
        assert_eq!(t.poll(t0 + ms(49)), None);

        let mut fired = vec![];
        while let Some(at) = t.poll(t0 + ms(160)) {
            fired.push(at);
        }
        assert_eq!(fired, vec![t0 + ms(50), t0 + ms(100), t0 + ms(150)]);
        assert_eq!(t.poll(t0 + ms(199)), None);
        assert_eq!(t.poll(t0 + ms(200)), Some(t0 + ms(200)));
    }

    #[test]
    fn restart_replaces_previous_schedule() {
        let t0 = Instant::now();
        let mut t = Timer::new(ms(50));
        t.start(t0);
        t.start(t0 + ms(40));
        // The first schedule (due at 50ms) is gone.
        assert_eq!(t.poll(t0 + ms(60)), None);
        assert_eq!(t.poll(t0 + ms(90)), Some(t0 + ms(90)));
    }

    #[test]
    fn cancel_stops_firing() {
        let t0 = Instant::now();
        let mut t = Timer::new(ms(10));
        t.start(t0);
        t.cancel();
        assert!(!t.is_active());
        assert_eq!(t.poll(t0 + ms(100)), None);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let t = Timer::new(Duration::ZERO);
        assert_eq!(t.interval(), MIN_INTERVAL);
    }
}
