//! Recovery statistics
//!
//! Per-strategy counters live in a concurrent map keyed by strategy id;
//! cascade-level totals are atomics.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters for one strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStats {
    /// Executions
    pub attempts: u64,
    /// Executions that produced a usable result
    pub successes: u64,
    /// Executions that failed (errors included)
    pub failures: u64,
    /// Failures caused by the strategy deadline
    pub timeouts: u64,
    /// Total execution time in milliseconds
    pub total_duration_ms: u64,
}

/// Point-in-time recovery statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryStatistics {
    /// Cascades run
    pub total_cascades: u64,
    /// Cascades that terminated with emergency content
    pub emergency_terminations: u64,
    /// Per-strategy counters
    pub by_strategy: HashMap<String, StrategyStats>,
}

/// Live counter set maintained by the engine
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    pub(crate) total_cascades: AtomicU64,
    pub(crate) emergency_terminations: AtomicU64,
    pub(crate) by_strategy: DashMap<String, StrategyStats>,
}

impl StatsRecorder {
    pub(crate) fn record_execution(
        &self,
        strategy_id: &str,
        success: bool,
        timed_out: bool,
        duration: Duration,
    ) {
        let mut entry = self.by_strategy.entry(strategy_id.to_string()).or_default();
        entry.attempts += 1;
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
            if timed_out {
                entry.timeouts += 1;
            }
        }
        entry.total_duration_ms += duration.as_millis() as u64;
    }

    pub(crate) fn snapshot(&self) -> RecoveryStatistics {
        RecoveryStatistics {
            total_cascades: self.total_cascades.load(Ordering::Relaxed),
            emergency_terminations: self.emergency_terminations.load(Ordering::Relaxed),
            by_strategy: self
                .by_strategy
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_counters_accumulate() {
        let recorder = StatsRecorder::default();
        recorder.record_execution("alternate_method", true, false, Duration::from_millis(40));
        recorder.record_execution("alternate_method", false, true, Duration::from_millis(60));

        let stats = recorder.snapshot();
        let alternate = stats.by_strategy.get("alternate_method").unwrap();
        assert_eq!(alternate.attempts, 2);
        assert_eq!(alternate.successes, 1);
        assert_eq!(alternate.failures, 1);
        assert_eq!(alternate.timeouts, 1);
        assert_eq!(alternate.total_duration_ms, 100);
    }
}
