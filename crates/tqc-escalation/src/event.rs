//! Escalation audit events
//!
//! An `EscalationEvent` is the immutable record of one rule firing: the
//! trigger snapshot, every executed action with its result, and the
//! resolution state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tqc_domain::{ErrorCode, RequestId, Severity, UserImpact};
use uuid::Uuid;

/// Snapshot of the error that triggered a firing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSnapshot {
    /// Stable code
    pub code: ErrorCode,
    /// Severity at firing time
    pub severity: Severity,
    /// Rendered message
    pub message: String,
    /// User impact from the context
    pub user_impact: UserImpact,
    /// Request in flight, when per-request
    pub request_id: Option<RequestId>,
    /// Firing instant
    pub timestamp: DateTime<Utc>,
}

/// One executed action with its result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionExecution {
    /// Stable action label
    pub action: String,
    /// Dispatch attempts made (1 = no retry needed)
    pub attempts: u32,
    /// Whether dispatch ultimately succeeded
    pub success: bool,
    /// Total time spent on this action
    pub duration: Duration,
    /// Last dispatch error, when failed
    pub error: Option<String>,
}

/// Resolution state of a firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionState {
    /// Every action dispatched
    Notified,
    /// Some actions dispatched
    PartiallyNotified,
    /// No action dispatched
    NotificationFailed,
}

/// Immutable audit record of one rule firing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationEvent {
    /// Event identifier
    pub id: Uuid,
    /// Rule that fired
    pub rule_id: String,
    /// Trigger snapshot
    pub trigger: TriggerSnapshot,
    /// Executed actions with results
    pub actions: Vec<ActionExecution>,
    /// Resolution state
    pub resolution: ResolutionState,
}

impl EscalationEvent {
    /// Build the event, deriving the resolution from action outcomes
    #[must_use]
    pub fn new(rule_id: impl Into<String>, trigger: TriggerSnapshot, actions: Vec<ActionExecution>) -> Self {
        let succeeded = actions.iter().filter(|a| a.success).count();
        let resolution = if actions.is_empty() || succeeded == actions.len() {
            ResolutionState::Notified
        } else if succeeded > 0 {
            ResolutionState::PartiallyNotified
        } else {
            ResolutionState::NotificationFailed
        };
        Self {
            id: Uuid::new_v4(),
            rule_id: rule_id.into(),
            trigger,
            actions,
            resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger() -> TriggerSnapshot {
        TriggerSnapshot {
            code: ErrorCode::ServiceUnavailable,
            severity: Severity::Critical,
            message: "service unavailable: gate".to_string(),
            user_impact: UserImpact::Low,
            request_id: None,
            timestamp: Utc::now(),
        }
    }

    fn execution(success: bool) -> ActionExecution {
        ActionExecution {
            action: "log_critical".to_string(),
            attempts: 1,
            success,
            duration: Duration::from_millis(3),
            error: if success { None } else { Some("boom".to_string()) },
        }
    }

    #[test]
    fn all_successes_resolve_notified() {
        let event = EscalationEvent::new("r1", trigger(), vec![execution(true), execution(true)]);
        assert_eq!(event.resolution, ResolutionState::Notified);
    }

    #[test]
    fn mixed_results_resolve_partial() {
        let event = EscalationEvent::new("r1", trigger(), vec![execution(true), execution(false)]);
        assert_eq!(event.resolution, ResolutionState::PartiallyNotified);
    }

    #[test]
    fn all_failures_resolve_failed() {
        let event = EscalationEvent::new("r1", trigger(), vec![execution(false)]);
        assert_eq!(event.resolution, ResolutionState::NotificationFailed);
    }
}
