//! Recovery records and results
//!
//! The growing `RecoveryAttempt` list is the sole state threaded through
//! one request's cascade; strategy selection excludes every id already in
//! it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tqc_domain::{QualityReport, TranslationMethod, TranslationRequest};

/// Log record of one cascade step, appended regardless of outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryAttempt {
    /// Strategy that executed
    pub strategy_id: String,
    /// Action label the step produced
    pub action: String,
    /// Step start instant
    pub timestamp: DateTime<Utc>,
    /// Whether the step produced a usable result
    pub success: bool,
    /// Step duration
    pub duration: Duration,
    /// Failure detail, when failed
    pub error: Option<String>,
}

/// Terminal result of one cascade
///
/// A cascade always terminates with a usable result; the worst case is
/// explicitly flagged emergency content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryResult {
    /// Whether a usable result was produced (always true at the terminal)
    pub success: bool,
    /// Recovered text
    pub text: String,
    /// Confidence in the recovered text, 0-1
    pub confidence: f64,
    /// Action that produced the result (e.g. `retry_with_secondary`)
    pub action: String,
    /// Method that produced the text, when production was involved
    pub method: Option<TranslationMethod>,
    /// Whether the result came from a different method than the failed one
    pub method_switched: bool,
    /// Whether this is flagged emergency content
    pub emergency: bool,
    /// Quality report for the recovered text, when validated
    pub quality: Option<QualityReport>,
    /// Full cascade log
    pub attempts: Vec<RecoveryAttempt>,
}

/// A previously cached result offered for degraded reuse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedResult {
    /// Cached text
    pub text: String,
    /// Confidence recorded at admission time
    pub confidence: f64,
    /// Quality report recorded at admission time
    pub quality: QualityReport,
}

/// Source of cached results for graceful degradation
///
/// The engine stays independent of any concrete store; the orchestrator
/// wires this to the quality-gated cache.
pub trait DegradedResultSource: Send + Sync {
    /// A cached result usable for this request, if any
    fn lookup(&self, request: &TranslationRequest) -> Option<DegradedResult>;
}
