//! TQC Recovery - cascading recovery engine
//!
//! Guarantees every failed request still terminates with a usable result:
//! - Strategy selection by ascending priority over a stateless catalogue,
//!   never re-selecting an id already in the request's attempt log
//! - Per-strategy deadlines and an overall cascade budget; timeouts and
//!   thrown errors are failed attempts, never hangs or crashes
//! - Graceful degradation branches on assessed system health
//! - A fixed, pre-validated emergency backstop that cannot fail
//! - Every step is logged and reported to telemetry and the escalation
//!   intake
//!
//! # Example
//!
//! ```rust,ignore
//! use tqc_recovery::{RecoveryConfig, RecoveryEngine};
//!
//! let engine = RecoveryEngine::new(producer, gate, synthesizer, telemetry, escalation,
//!     RecoveryConfig::default());
//! let result = engine.recover(&request, &error, failed_method, Vec::new()).await;
//! assert!(result.success);
//! ```

#![warn(unreachable_pub)]

pub mod context;
pub mod emergency;
pub mod engine;
pub mod health;
pub mod stats;
pub mod strategy;

// Re-exports for convenience
pub use context::{DegradedResult, DegradedResultSource, RecoveryAttempt, RecoveryResult};
pub use emergency::{emergency_quality, emergency_text, EMERGENCY_CONFIDENCE};
pub use engine::{enhance_input, RecoveryConfig, RecoveryEngine, EMERGENCY_ACTION};
pub use health::{HealthLevel, HealthMonitor};
pub use stats::{RecoveryStatistics, StrategyStats};
pub use strategy::{catalogue, ApplicableErrors, RecoveryStrategy, StrategyKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
