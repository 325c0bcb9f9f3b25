//! Error taxonomy for the translation core
//!
//! Four classes cover the pipeline:
//! - Production: the producer failed or returned low confidence
//! - Validation: the quality gate rejected the output
//! - Infrastructure: network/timeout/resource/service failures
//! - Configuration: invalid thresholds (clamped at the edge, never surfaced)

use crate::request::{ContentType, LanguagePair, RequestId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main translation error type
#[derive(Debug, Clone, thiserror::Error)]
pub enum TranslationError {
    /// Producer call failed outright
    #[error("production failed ({method}): {message}")]
    ProductionFailed {
        /// Method that failed
        method: String,
        /// Failure detail
        message: String,
    },

    /// Producer returned a result below the confidence floor
    #[error("producer confidence {confidence:.2} below floor {floor:.2}")]
    LowConfidence {
        /// Reported confidence
        confidence: f64,
        /// Configured floor
        floor: f64,
    },

    /// Quality gate rejected the output
    #[error("quality gate rejected output (overall {overall:.1})")]
    QualityRejected {
        /// Overall score the gate computed
        overall: f64,
        /// Violations the gate reported
        violations: Vec<String>,
    },

    /// Output contaminated with non-target language/script
    #[error("purity {purity:.1} below required {required:.1}")]
    PurityViolation {
        /// Measured purity
        purity: f64,
        /// Required purity
        required: f64,
    },

    /// Network failure reaching a collaborator
    #[error("network failure: {0}")]
    Network(String),

    /// Collaborator call exceeded its deadline
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Resource exhaustion (memory, quota, connections)
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Collaborator reported itself unavailable
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl TranslationError {
    /// Stable error code used for strategy matching and rule conditions
    #[inline]
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            TranslationError::ProductionFailed { .. } => ErrorCode::ProductionFailed,
            TranslationError::LowConfidence { .. } => ErrorCode::LowConfidence,
            TranslationError::QualityRejected { .. } => ErrorCode::QualityRejected,
            TranslationError::PurityViolation { .. } => ErrorCode::PurityViolation,
            TranslationError::Network(_) => ErrorCode::NetworkFailure,
            TranslationError::Timeout(_) => ErrorCode::Timeout,
            TranslationError::ResourceExhausted(_) => ErrorCode::ResourceExhausted,
            TranslationError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
            TranslationError::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
        }
    }

    /// Taxonomy class
    #[inline]
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        self.code().class()
    }

    /// Default severity for this error
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            TranslationError::ProductionFailed { .. } => Severity::High,
            TranslationError::LowConfidence { .. } => Severity::Medium,
            TranslationError::QualityRejected { .. } => Severity::Medium,
            TranslationError::PurityViolation { .. } => Severity::High,
            TranslationError::Network(_) => Severity::High,
            TranslationError::Timeout(_) => Severity::Medium,
            TranslationError::ResourceExhausted(_) => Severity::Critical,
            TranslationError::ServiceUnavailable(_) => Severity::Critical,
            TranslationError::InvalidConfiguration(_) => Severity::Low,
        }
    }

    /// Whether this is an infrastructure failure
    #[inline]
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        self.class() == ErrorClass::Infrastructure
    }
}

/// Stable error codes
///
/// Strategy applicability sets and escalation rule conditions match on
/// these, never on rendered messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Producer call failed
    ProductionFailed,
    /// Producer confidence below floor
    LowConfidence,
    /// Quality gate rejection
    QualityRejected,
    /// Purity below required level
    PurityViolation,
    /// Network failure
    NetworkFailure,
    /// Deadline exceeded
    Timeout,
    /// Resource exhaustion
    ResourceExhausted,
    /// Service unavailable
    ServiceUnavailable,
    /// Invalid configuration
    InvalidConfiguration,
}

impl ErrorCode {
    /// Taxonomy class this code belongs to
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorCode::ProductionFailed | ErrorCode::LowConfidence => ErrorClass::Production,
            ErrorCode::QualityRejected | ErrorCode::PurityViolation => ErrorClass::Validation,
            ErrorCode::NetworkFailure
            | ErrorCode::Timeout
            | ErrorCode::ResourceExhausted
            | ErrorCode::ServiceUnavailable => ErrorClass::Infrastructure,
            ErrorCode::InvalidConfiguration => ErrorClass::Configuration,
        }
    }

    /// Stable string form
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ProductionFailed => "production_failed",
            ErrorCode::LowConfidence => "low_confidence",
            ErrorCode::QualityRejected => "quality_rejected",
            ErrorCode::PurityViolation => "purity_violation",
            ErrorCode::NetworkFailure => "network_failure",
            ErrorCode::Timeout => "timeout",
            ErrorCode::ResourceExhausted => "resource_exhausted",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::InvalidConfiguration => "invalid_configuration",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Producer-side failure, resolved locally by the cascade
    Production,
    /// Quality-gate rejection, resolved locally by the cascade
    Validation,
    /// Environmental failure; degraded locally and forwarded to escalation
    Infrastructure,
    /// Invalid configuration; clamped to safe defaults, never surfaced
    Configuration,
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational
    Low,
    /// Degraded result possible
    Medium,
    /// Request likely to miss its quality bar
    High,
    /// Operational incident class
    Critical,
}

impl Severity {
    /// Stable string form
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly an error affects the requesting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UserImpact {
    /// Degradation invisible to the caller
    Low,
    /// Caller receives a reduced-quality result
    Medium,
    /// Caller receives emergency content
    High,
}

impl Default for UserImpact {
    fn default() -> Self {
        UserImpact::Low
    }
}

/// Context an error occurred in, threaded to escalation and telemetry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request the error occurred for, when per-request
    pub request_id: Option<RequestId>,
    /// Language pair in flight
    pub languages: Option<LanguagePair>,
    /// Content category in flight
    pub content_type: Option<ContentType>,
    /// User impact assessment
    pub user_impact: UserImpact,
    /// Free-form attributes
    pub attributes: IndexMap<String, String>,
}

impl ErrorContext {
    /// Empty context
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context scoped to a request
    #[must_use]
    pub fn for_request(
        id: RequestId,
        languages: LanguagePair,
        content_type: ContentType,
    ) -> Self {
        Self {
            request_id: Some(id),
            languages: Some(languages),
            content_type: Some(content_type),
            user_impact: UserImpact::default(),
            attributes: IndexMap::new(),
        }
    }

    /// With user impact
    #[inline]
    #[must_use]
    pub fn with_user_impact(mut self, impact: UserImpact) -> Self {
        self.user_impact = impact;
        self
    }

    /// Add attribute
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Classification returned by the telemetry collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    /// Taxonomy class
    pub class: ErrorClass,
    /// Severity assessment
    pub severity: Severity,
    /// Whether a retry is worthwhile
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_classes() {
        assert_eq!(ErrorCode::ProductionFailed.class(), ErrorClass::Production);
        assert_eq!(ErrorCode::QualityRejected.class(), ErrorClass::Validation);
        assert_eq!(ErrorCode::Timeout.class(), ErrorClass::Infrastructure);
        assert_eq!(
            ErrorCode::InvalidConfiguration.class(),
            ErrorClass::Configuration
        );
    }

    #[test]
    fn error_code_round_trip() {
        let err = TranslationError::Network("dns".to_string());
        assert_eq!(err.code(), ErrorCode::NetworkFailure);
        assert!(err.is_infrastructure());
    }

    #[test]
    fn resource_exhaustion_is_critical() {
        let err = TranslationError::ResourceExhausted("connection pool".to_string());
        assert_eq!(err.severity(), Severity::Critical);
    }

    #[test]
    fn display_messages_are_lowercase() {
        let err = TranslationError::ServiceUnavailable("gate".to_string());
        assert!(err.to_string().starts_with("service unavailable"));
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn context_builder() {
        let ctx = ErrorContext::empty()
            .with_user_impact(UserImpact::High)
            .with_attribute("stage", "validating");
        assert_eq!(ctx.user_impact, UserImpact::High);
        assert_eq!(ctx.attributes.get("stage").map(String::as_str), Some("validating"));
    }
}
