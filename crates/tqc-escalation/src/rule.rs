//! Escalation rules
//!
//! A rule is a conjunction of conditions plus an action list, rate-limited
//! by a cooldown window and a rolling hourly cap. Firing state lives inside
//! the rule record and is mutated only under the engine's lock.

use crate::history::ErrorRecord;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tqc_domain::{ErrorCode, ErrorContext, Severity, TranslationError, UserImpact};

/// One condition of a rule's conjunction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Error code equals
    ErrorCodeEquals(ErrorCode),
    /// Rendered error message contains the fragment
    MessageContains(String),
    /// Severity equals
    SeverityEquals(Severity),
    /// More than `threshold` errors with the same code inside the trailing
    /// window (the incoming error included)
    Frequency {
        /// Trailing window length
        window: Duration,
        /// Count that must be exceeded
        threshold: usize,
    },
    /// User impact at least this level
    UserImpactAtLeast(UserImpact),
    /// Local hour of day in `start..end` (wrapping ranges allowed)
    TimeOfDayBetween {
        /// Inclusive start hour (0-23)
        start_hour: u32,
        /// Exclusive end hour (0-23)
        end_hour: u32,
    },
}

impl Condition {
    /// Evaluate against the incoming error, its context, and the rolling
    /// history
    #[must_use]
    pub fn is_met(
        &self,
        error: &TranslationError,
        context: &ErrorContext,
        history: &VecDeque<ErrorRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        match self {
            Condition::ErrorCodeEquals(code) => error.code() == *code,
            Condition::MessageContains(fragment) => error.to_string().contains(fragment),
            Condition::SeverityEquals(severity) => error.severity() == *severity,
            Condition::Frequency { window, threshold } => {
                let cutoff = now
                    - chrono::Duration::from_std(*window)
                        .unwrap_or_else(|_| chrono::Duration::hours(1));
                let code = error.code();
                let matching = history
                    .iter()
                    .filter(|record| record.code == code && record.timestamp >= cutoff)
                    .count();
                matching > *threshold
            }
            Condition::UserImpactAtLeast(level) => context.user_impact >= *level,
            Condition::TimeOfDayBetween {
                start_hour,
                end_hour,
            } => {
                let hour = now.hour();
                if start_hour <= end_hour {
                    (*start_hour..*end_hour).contains(&hour)
                } else {
                    // Wrapping range, e.g. 22..6
                    hour >= *start_hour || hour < *end_hour
                }
            }
        }
    }
}

/// Notification action executed when a rule fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationAction {
    /// Page the on-call rotation
    PageOncall {
        /// Rotation identifier
        rotation: String,
    },
    /// Post to an operations channel
    NotifyChannel {
        /// Channel identifier
        channel: String,
    },
    /// Emit a critical log record
    LogCritical,
    /// Open an incident against a service
    OpenIncident {
        /// Service identifier
        service: String,
    },
}

impl EscalationAction {
    /// Stable label used in audit records and metrics
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            EscalationAction::PageOncall { rotation } => format!("page_oncall:{rotation}"),
            EscalationAction::NotifyChannel { channel } => format!("notify_channel:{channel}"),
            EscalationAction::LogCritical => "log_critical".to_string(),
            EscalationAction::OpenIncident { service } => format!("open_incident:{service}"),
        }
    }
}

/// A registered escalation rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRule {
    /// Rule identifier
    pub id: String,
    /// Human-readable description
    pub description: String,
    /// Condition conjunction; all must hold
    pub conditions: Vec<Condition>,
    /// Actions executed on firing
    pub actions: Vec<EscalationAction>,
    /// Minimum interval between firings
    pub cooldown: Duration,
    /// Rolling-hour firing cap
    pub max_executions_per_hour: u32,
    /// Whether the rule participates in evaluation
    pub enabled: bool,
    /// Selection priority among satisfied rules (lower fires first)
    pub priority: u32,
    /// Last firing instant
    pub last_executed: Option<DateTime<Utc>>,
    /// Lifetime firing count
    pub execution_count: u64,
    /// Firing instants inside the rolling hour
    recent_firings: VecDeque<DateTime<Utc>>,
}

impl EscalationRule {
    /// Create an enabled rule with the given rate limits
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        conditions: Vec<Condition>,
        actions: Vec<EscalationAction>,
        cooldown: Duration,
        max_executions_per_hour: u32,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            conditions,
            actions,
            cooldown,
            max_executions_per_hour,
            enabled: true,
            priority: 100,
            last_executed: None,
            execution_count: 0,
            recent_firings: VecDeque::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With selection priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Disabled variant (kept registered but skipped)
    #[inline]
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether all conditions hold
    #[must_use]
    pub fn is_satisfied(
        &self,
        error: &TranslationError,
        context: &ErrorContext,
        history: &VecDeque<ErrorRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        self.enabled
            && self
                .conditions
                .iter()
                .all(|c| c.is_met(error, context, history, now))
    }

    /// Whether `now` falls inside the cooldown window of the last firing
    #[must_use]
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        match (self.last_executed, chrono::Duration::from_std(self.cooldown)) {
            (Some(last), Ok(cooldown)) => now - last < cooldown,
            _ => false,
        }
    }

    /// Whether the rolling-hour cap is exhausted at `now`
    #[must_use]
    pub fn at_hourly_cap(&self, now: DateTime<Utc>) -> bool {
        let cutoff = now - chrono::Duration::hours(1);
        let recent = self
            .recent_firings
            .iter()
            .filter(|t| **t > cutoff)
            .count();
        recent >= self.max_executions_per_hour as usize
    }

    /// Record a firing at `now`, pruning instants older than an hour
    pub fn record_firing(&mut self, now: DateTime<Utc>) {
        self.last_executed = Some(now);
        self.execution_count += 1;
        self.recent_firings.push_back(now);
        let cutoff = now - chrono::Duration::hours(1);
        while matches!(self.recent_firings.front(), Some(t) if *t <= cutoff) {
            self.recent_firings.pop_front();
        }
    }
}
