//! Escalation engine
//!
//! Evaluates every enabled rule's condition conjunction against each
//! processed error, rate-limits firings per rule, and dispatches actions
//! through the notifier with bounded retries. Rolling history, per-rule
//! firing state, and metrics all live behind one lock; notification
//! dispatch happens outside it.

use crate::event::{ActionExecution, EscalationEvent, TriggerSnapshot};
use crate::history::{ErrorRecord, RollingHistory};
use crate::metrics::EscalationMetrics;
use crate::notifier::Notifier;
use crate::rule::{Condition, EscalationAction, EscalationRule};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tqc_domain::{ErrorCode, ErrorContext, TranslationError};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EscalationConfig {
    /// Rolling error-history bound
    pub history_limit: usize,
    /// Per-action dispatch deadline
    pub action_timeout: Duration,
    /// Dispatch retries after the first attempt
    pub action_retries: u32,
    /// Cooldown applied by `default_rule`
    pub default_cooldown: Duration,
    /// Hourly cap applied by `default_rule`
    pub default_max_executions_per_hour: u32,
    /// Retained audit-event bound
    pub event_limit: usize,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            action_timeout: Duration::from_secs(5),
            action_retries: 2,
            default_cooldown: Duration::from_secs(15 * 60),
            default_max_executions_per_hour: 4,
            event_limit: 256,
        }
    }
}

/// Lock-guarded interior
struct EngineState {
    rules: Vec<EscalationRule>,
    history: RollingHistory,
    events: VecDeque<EscalationEvent>,
    metrics: EscalationMetrics,
}

/// The escalation engine
pub struct EscalationEngine {
    state: Mutex<EngineState>,
    notifier: Arc<dyn Notifier>,
    config: EscalationConfig,
}

impl std::fmt::Debug for EscalationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EscalationEngine {
    /// Create engine with the given notifier
    #[must_use]
    pub fn new(config: EscalationConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Mutex::new(EngineState {
                rules: Vec::new(),
                history: RollingHistory::new(config.history_limit),
                events: VecDeque::new(),
                metrics: EscalationMetrics::default(),
            }),
            notifier,
            config,
        }
    }

    /// Register a rule (done once at startup)
    pub fn register_rule(&self, rule: EscalationRule) {
        tracing::debug!(rule = %rule.id, priority = rule.priority, "escalation rule registered");
        self.state.lock().rules.push(rule);
    }

    /// Build a rule carrying the engine's default cooldown and hourly cap
    #[must_use]
    pub fn default_rule(
        &self,
        id: impl Into<String>,
        conditions: Vec<Condition>,
        actions: Vec<EscalationAction>,
    ) -> EscalationRule {
        EscalationRule::new(
            id,
            conditions,
            actions,
            self.config.default_cooldown,
            self.config.default_max_executions_per_hour,
        )
    }

    /// Process one error
    ///
    /// Appends to the rolling history, evaluates every enabled rule, and
    /// fires the highest-priority satisfied rule that is neither in
    /// cooldown nor at its hourly cap. Skips are logged, never silently
    /// retried within the same evaluation. Returns the audit event when a
    /// rule fired.
    pub async fn process_error(
        &self,
        error: &TranslationError,
        context: &ErrorContext,
    ) -> Option<EscalationEvent> {
        let now = Utc::now();

        // Evaluate and claim the firing under the lock; rate-limit state
        // is updated before any await so a concurrent caller cannot
        // double-fire the same rule.
        let (rule_id, actions, trigger) = {
            let mut state = self.state.lock();
            state.metrics.errors_processed += 1;
            state.history.push(ErrorRecord {
                code: error.code(),
                severity: error.severity(),
                message: error.to_string(),
                user_impact: context.user_impact,
                timestamp: now,
            });

            let satisfied: Vec<usize> = state
                .rules
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.is_satisfied(error, context, state.history.records(), now))
                .map(|(idx, _)| idx)
                .collect();

            let mut eligible: Vec<usize> = Vec::new();
            for idx in satisfied {
                let rule = &state.rules[idx];
                let (in_cooldown, at_cap, rule_id) =
                    (rule.in_cooldown(now), rule.at_hourly_cap(now), rule.id.clone());
                if in_cooldown {
                    tracing::info!(rule = %rule_id, "satisfied rule skipped: in cooldown");
                    state.metrics.skipped_cooldown += 1;
                } else if at_cap {
                    tracing::info!(rule = %rule_id, "satisfied rule skipped: hourly cap reached");
                    state.metrics.skipped_hourly_cap += 1;
                } else {
                    eligible.push(idx);
                }
            }

            let chosen = eligible
                .into_iter()
                .min_by_key(|idx| state.rules[*idx].priority)?;

            let rule = &mut state.rules[chosen];
            rule.record_firing(now);
            tracing::warn!(rule = %rule.id, code = %error.code(), "escalation rule firing");

            (
                rule.id.clone(),
                rule.actions.clone(),
                TriggerSnapshot {
                    code: error.code(),
                    severity: error.severity(),
                    message: error.to_string(),
                    user_impact: context.user_impact,
                    request_id: context.request_id,
                    timestamp: now,
                },
            )
        };

        let mut executions = Vec::with_capacity(actions.len());
        for action in &actions {
            executions.push(self.dispatch_with_retries(action, &trigger).await);
        }

        let event = EscalationEvent::new(rule_id, trigger, executions);

        {
            let mut state = self.state.lock();
            state.metrics.total_escalations += 1;
            *state
                .metrics
                .escalations_by_rule
                .entry(event.rule_id.clone())
                .or_insert(0) += 1;
            *state
                .metrics
                .escalations_by_severity
                .entry(event.trigger.severity.as_str().to_string())
                .or_insert(0) += 1;
            for execution in &event.actions {
                if execution.success {
                    state.metrics.notifications_succeeded += 1;
                } else {
                    state.metrics.notifications_failed += 1;
                }
            }
            if state.events.len() == self.config.event_limit {
                state.events.pop_front();
            }
            state.events.push_back(event.clone());
        }

        Some(event)
    }

    /// Recovery intake: tallies `(error code, action, success)` reported by
    /// the recovery engine
    pub fn record_recovery(&self, code: ErrorCode, action: &str, success: bool) {
        tracing::debug!(%code, action, success, "recovery outcome recorded");
        let mut state = self.state.lock();
        let tally = state
            .metrics
            .recovery_reports
            .entry(code.as_str().to_string())
            .or_default();
        if success {
            tally.successes += 1;
        } else {
            tally.failures += 1;
        }
    }

    /// Point-in-time metrics snapshot
    #[must_use]
    pub fn metrics(&self) -> EscalationMetrics {
        self.state.lock().metrics.clone()
    }

    /// Retained audit events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<EscalationEvent> {
        self.state.lock().events.iter().cloned().collect()
    }

    /// Number of registered rules
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.state.lock().rules.len()
    }

    /// Dispatch one action with timeout and bounded retries
    async fn dispatch_with_retries(
        &self,
        action: &EscalationAction,
        trigger: &TriggerSnapshot,
    ) -> ActionExecution {
        let started = Instant::now();
        let max_attempts = self.config.action_retries + 1;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match tokio::time::timeout(self.config.action_timeout, self.notifier.notify(action, trigger))
                .await
            {
                Ok(Ok(())) => {
                    return ActionExecution {
                        action: action.label(),
                        attempts: attempt,
                        success: true,
                        duration: started.elapsed(),
                        error: None,
                    };
                }
                Ok(Err(err)) => {
                    tracing::warn!(action = %action.label(), attempt, "notification dispatch failed: {err}");
                    last_error = Some(err.to_string());
                }
                Err(_) => {
                    tracing::warn!(action = %action.label(), attempt, "notification dispatch timed out");
                    last_error = Some(format!(
                        "dispatch timed out after {:?}",
                        self.config.action_timeout
                    ));
                }
            }
        }

        ActionExecution {
            action: action.label(),
            attempts: max_attempts,
            success: false,
            duration: started.elapsed(),
            error: last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ResolutionState;
    use crate::notifier::{LogNotifier, NotifyError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tqc_domain::Severity;

    struct FlakyNotifier {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn notify(
            &self,
            _action: &EscalationAction,
            _trigger: &TriggerSnapshot,
        ) -> Result<(), NotifyError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(NotifyError::DispatchFailed("unreachable".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn infra_error() -> TranslationError {
        TranslationError::ServiceUnavailable("gate".to_string())
    }

    fn burst_rule(engine: &EscalationEngine) -> EscalationRule {
        engine.default_rule(
            "infra-burst",
            vec![
                Condition::SeverityEquals(Severity::Critical),
                Condition::Frequency {
                    window: Duration::from_secs(600),
                    threshold: 10,
                },
            ],
            vec![EscalationAction::LogCritical],
        )
    }

    fn engine() -> EscalationEngine {
        EscalationEngine::new(EscalationConfig::default(), Arc::new(LogNotifier))
    }

    #[tokio::test]
    async fn burst_fires_exactly_once_then_cooldown_blocks() {
        let engine = engine();
        let rule = burst_rule(&engine);
        engine.register_rule(rule);

        let ctx = ErrorContext::empty();
        let mut fired = 0;
        for _ in 0..11 {
            if engine.process_error(&infra_error(), &ctx).await.is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);

        // Twelfth occurrence inside the cooldown window fires nothing
        let event = engine.process_error(&infra_error(), &ctx).await;
        assert!(event.is_none());

        let metrics = engine.metrics();
        assert_eq!(metrics.total_escalations, 1);
        assert_eq!(metrics.escalations_by_rule.get("infra-burst"), Some(&1));
        assert_eq!(metrics.escalations_by_severity.get("critical"), Some(&1));
        assert!(metrics.skipped_cooldown >= 1);
    }

    #[tokio::test]
    async fn highest_priority_satisfied_rule_fires() {
        let engine = engine();
        engine.register_rule(
            engine
                .default_rule(
                    "catch-all",
                    vec![Condition::SeverityEquals(Severity::Critical)],
                    vec![EscalationAction::LogCritical],
                )
                .with_priority(50),
        );
        engine.register_rule(
            engine
                .default_rule(
                    "infra-specific",
                    vec![Condition::ErrorCodeEquals(ErrorCode::ServiceUnavailable)],
                    vec![EscalationAction::LogCritical],
                )
                .with_priority(10),
        );

        let event = engine
            .process_error(&infra_error(), &ErrorContext::empty())
            .await
            .expect("rule fires");
        assert_eq!(event.rule_id, "infra-specific");
        assert_eq!(engine.metrics().total_escalations, 1);
    }

    #[tokio::test]
    async fn disabled_rule_never_fires() {
        let engine = engine();
        engine.register_rule(
            engine
                .default_rule(
                    "disabled",
                    vec![Condition::SeverityEquals(Severity::Critical)],
                    vec![EscalationAction::LogCritical],
                )
                .disabled(),
        );

        let event = engine
            .process_error(&infra_error(), &ErrorContext::empty())
            .await;
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn dispatch_retries_then_succeeds() {
        let notifier = Arc::new(FlakyNotifier {
            failures_before_success: 1,
            calls: AtomicU32::new(0),
        });
        let engine = EscalationEngine::new(EscalationConfig::default(), notifier);
        engine.register_rule(engine.default_rule(
            "r1",
            vec![Condition::SeverityEquals(Severity::Critical)],
            vec![EscalationAction::LogCritical],
        ));

        let event = engine
            .process_error(&infra_error(), &ErrorContext::empty())
            .await
            .expect("rule fires");
        assert_eq!(event.resolution, ResolutionState::Notified);
        assert_eq!(event.actions[0].attempts, 2);
        assert_eq!(engine.metrics().notifications_succeeded, 1);
    }

    #[tokio::test]
    async fn exhausted_retries_record_failure() {
        let notifier = Arc::new(FlakyNotifier {
            failures_before_success: u32::MAX,
            calls: AtomicU32::new(0),
        });
        let engine = EscalationEngine::new(
            EscalationConfig {
                action_retries: 1,
                ..EscalationConfig::default()
            },
            notifier,
        );
        engine.register_rule(engine.default_rule(
            "r1",
            vec![Condition::SeverityEquals(Severity::Critical)],
            vec![EscalationAction::LogCritical],
        ));

        let event = engine
            .process_error(&infra_error(), &ErrorContext::empty())
            .await
            .expect("rule fires");
        assert_eq!(event.resolution, ResolutionState::NotificationFailed);
        assert_eq!(event.actions[0].attempts, 2);
        assert!(event.actions[0].error.is_some());
        assert_eq!(engine.metrics().notifications_failed, 1);
    }

    #[tokio::test]
    async fn recovery_intake_tallies_outcomes() {
        let engine = engine();
        engine.record_recovery(ErrorCode::QualityRejected, "retry_alternate_method", true);
        engine.record_recovery(ErrorCode::QualityRejected, "retry_alternate_method", false);
        engine.record_recovery(ErrorCode::Timeout, "graceful_degradation", true);

        let metrics = engine.metrics();
        let quality = metrics.recovery_reports.get("quality_rejected").unwrap();
        assert_eq!(quality.successes, 1);
        assert_eq!(quality.failures, 1);
        assert_eq!(metrics.recovery_reports.get("timeout").unwrap().successes, 1);
    }

    #[tokio::test]
    async fn events_are_retained_and_bounded() {
        let engine = EscalationEngine::new(
            EscalationConfig {
                event_limit: 2,
                ..EscalationConfig::default()
            },
            Arc::new(LogNotifier),
        );
        engine.register_rule(EscalationRule::new(
            "r1",
            vec![Condition::SeverityEquals(Severity::Critical)],
            vec![EscalationAction::LogCritical],
            Duration::ZERO,
            1000,
        ));

        for _ in 0..3 {
            engine
                .process_error(&infra_error(), &ErrorContext::empty())
                .await
                .expect("rule fires");
        }
        assert_eq!(engine.events().len(), 2);
        assert_eq!(engine.rule_count(), 1);
    }
}
