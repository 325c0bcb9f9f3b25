//! TQC Escalation - rate-limited escalation engine
//!
//! Turns a stream of processed errors into bounded, audited operational
//! notifications:
//! - Rules are conjunctions of conditions (code, message, severity,
//!   trailing-window frequency, user impact, time of day)
//! - Firing is rate-limited per rule by a cooldown and a rolling hourly
//!   cap; skips are logged, never silently retried
//! - Actions dispatch through an async [`Notifier`] with bounded retries,
//!   producing an immutable [`EscalationEvent`] audit record
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tqc_escalation::{
//!     Condition, EscalationAction, EscalationConfig, EscalationEngine, LogNotifier,
//! };
//! use tqc_domain::Severity;
//!
//! let engine = EscalationEngine::new(EscalationConfig::default(), Arc::new(LogNotifier));
//! let rule = engine.default_rule(
//!     "critical-infra",
//!     vec![Condition::SeverityEquals(Severity::Critical)],
//!     vec![EscalationAction::LogCritical],
//! );
//! engine.register_rule(rule);
//! assert_eq!(engine.rule_count(), 1);
//! ```

#![warn(unreachable_pub)]

pub mod engine;
pub mod event;
pub mod history;
pub mod metrics;
pub mod notifier;
pub mod rule;

// Re-exports for convenience
pub use engine::{EscalationConfig, EscalationEngine};
pub use event::{ActionExecution, EscalationEvent, ResolutionState, TriggerSnapshot};
pub use history::{ErrorRecord, RollingHistory};
pub use metrics::{EscalationMetrics, RecoveryTally};
pub use notifier::{LogNotifier, Notifier, NotifyError};
pub use rule::{Condition, EscalationAction, EscalationRule};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
