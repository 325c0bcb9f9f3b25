//! Escalation metrics
//!
//! Maintained under the engine's lock and handed out as snapshots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Recovery outcomes reported through the intake, per error code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryTally {
    /// Successful recovery attempts
    pub successes: u64,
    /// Failed recovery attempts
    pub failures: u64,
}

/// Point-in-time escalation metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscalationMetrics {
    /// Total rule firings
    pub total_escalations: u64,
    /// Firings per rule id
    pub escalations_by_rule: HashMap<String, u64>,
    /// Firings per trigger severity
    pub escalations_by_severity: HashMap<String, u64>,
    /// Notifications dispatched successfully
    pub notifications_succeeded: u64,
    /// Notifications that exhausted their retries
    pub notifications_failed: u64,
    /// Satisfied rules skipped because of cooldown
    pub skipped_cooldown: u64,
    /// Satisfied rules skipped because of the hourly cap
    pub skipped_hourly_cap: u64,
    /// Errors processed through the engine
    pub errors_processed: u64,
    /// Recovery intake tallies per error code
    pub recovery_reports: HashMap<String, RecoveryTally>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zeroed() {
        let metrics = EscalationMetrics::default();
        assert_eq!(metrics.total_escalations, 0);
        assert!(metrics.escalations_by_rule.is_empty());
        assert!(metrics.recovery_reports.is_empty());
    }
}
