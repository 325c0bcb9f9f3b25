//! Notification dispatch boundary
//!
//! The engine never talks to paging/chat/incident systems directly; it
//! dispatches through this trait. Dispatch is the engine's only I/O-bound
//! suspension point.

use crate::event::TriggerSnapshot;
use crate::rule::EscalationAction;
use async_trait::async_trait;

/// Dispatch failure
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    /// Receiving system rejected or dropped the notification
    #[error("notification dispatch failed: {0}")]
    DispatchFailed(String),

    /// Receiving system unreachable
    #[error("notification channel unavailable: {0}")]
    ChannelUnavailable(String),
}

/// Notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatch one action for a firing
    async fn notify(
        &self,
        action: &EscalationAction,
        trigger: &TriggerSnapshot,
    ) -> Result<(), NotifyError>;
}

/// Notifier that emits structured log records instead of paging anyone
///
/// The default sink for tests and for deployments that wire alerting at
/// the log layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        action: &EscalationAction,
        trigger: &TriggerSnapshot,
    ) -> Result<(), NotifyError> {
        tracing::error!(
            action = %action.label(),
            code = %trigger.code,
            severity = %trigger.severity,
            "escalation notification: {}",
            trigger.message
        );
        Ok(())
    }
}
