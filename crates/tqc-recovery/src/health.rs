//! System health assessment
//!
//! Graceful degradation branches on this: a rolling count of
//! infrastructure errors inside a trailing window, read at evaluation
//! time. No background timer.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Assessed health level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthLevel {
    /// Isolated failures only
    Healthy,
    /// Elevated failure rate; prefer cached reuse
    Stressed,
    /// Sustained failures; go straight to emergency content
    Critical,
}

/// Rolling infrastructure-error monitor
#[derive(Debug)]
pub struct HealthMonitor {
    window: Duration,
    stressed_at: usize,
    critical_at: usize,
    events: Mutex<VecDeque<Instant>>,
}

impl HealthMonitor {
    /// Create monitor over a trailing window with level thresholds
    #[must_use]
    pub fn new(window: Duration, stressed_at: usize, critical_at: usize) -> Self {
        Self {
            window,
            stressed_at: stressed_at.max(1),
            critical_at: critical_at.max(2),
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Record one infrastructure error at now
    pub fn record_failure(&self) {
        let now = Instant::now();
        let mut events = self.events.lock();
        events.push_back(now);
        Self::prune(&mut events, now, self.window);
    }

    /// Assess the current level from wall-clock reads
    #[must_use]
    pub fn assess(&self) -> HealthLevel {
        let now = Instant::now();
        let mut events = self.events.lock();
        Self::prune(&mut events, now, self.window);
        let count = events.len();
        if count >= self.critical_at {
            HealthLevel::Critical
        } else if count >= self.stressed_at {
            HealthLevel::Stressed
        } else {
            HealthLevel::Healthy
        }
    }

    /// Infrastructure errors currently inside the window
    #[must_use]
    pub fn failure_count(&self) -> usize {
        let now = Instant::now();
        let mut events = self.events.lock();
        Self::prune(&mut events, now, self.window);
        events.len()
    }

    fn prune(events: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while matches!(events.front(), Some(t) if now.duration_since(*t) > window) {
            events.pop_front();
        }
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), 3, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_monitor_is_healthy() {
        let monitor = HealthMonitor::default();
        assert_eq!(monitor.assess(), HealthLevel::Healthy);
    }

    #[test]
    fn levels_rise_with_failures() {
        let monitor = HealthMonitor::new(Duration::from_secs(60), 2, 4);
        monitor.record_failure();
        assert_eq!(monitor.assess(), HealthLevel::Healthy);

        monitor.record_failure();
        assert_eq!(monitor.assess(), HealthLevel::Stressed);

        monitor.record_failure();
        monitor.record_failure();
        assert_eq!(monitor.assess(), HealthLevel::Critical);
    }

    #[test]
    fn failures_age_out_of_the_window() {
        let monitor = HealthMonitor::new(Duration::from_millis(10), 1, 2);
        monitor.record_failure();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(monitor.assess(), HealthLevel::Healthy);
        assert_eq!(monitor.failure_count(), 0);
    }
}
