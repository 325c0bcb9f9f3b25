//! Recovery strategy catalogue
//!
//! Strategies are stateless catalogue entries registered once at startup.
//! Behavior is a tagged [`StrategyKind`] dispatched through a `match` in
//! the engine; a strategy record itself carries only applicability,
//! priority, and bounds.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tqc_domain::ErrorCode;

/// Which error codes a strategy applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicableErrors {
    /// Applies to every code
    Wildcard,
    /// Applies to exactly these codes
    Codes(HashSet<ErrorCode>),
}

impl ApplicableErrors {
    /// Build from a code list
    #[must_use]
    pub fn codes(codes: impl IntoIterator<Item = ErrorCode>) -> Self {
        Self::Codes(codes.into_iter().collect())
    }

    /// Whether the set contains `code`
    #[must_use]
    pub fn matches(&self, code: ErrorCode) -> bool {
        match self {
            ApplicableErrors::Wildcard => true,
            ApplicableErrors::Codes(codes) => codes.contains(&code),
        }
    }
}

/// Behavior variants, dispatched by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Reproduce with a different production method
    AlternateMethod,
    /// Aggressively normalize the input and retry once
    EnhancedInput,
    /// Detect intent and synthesize templated safe text
    SynthesizedFallback,
    /// Branch by system health into cached reuse, a cheaper method, or
    /// emergency content
    GracefulDegradation,
    /// Fixed pre-validated response; the backstop that cannot fail
    EmergencyContent,
}

/// One registered strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryStrategy {
    /// Strategy identifier (never re-selected within one cascade)
    pub id: String,
    /// Behavior variant
    pub kind: StrategyKind,
    /// Error codes this strategy applies to
    pub applicable: ApplicableErrors,
    /// Selection priority (lower is tried first)
    pub priority: u32,
    /// Internal retry bound for the strategy's own work
    pub max_attempts: u32,
    /// Execution deadline; exceeding it is a failed attempt
    pub timeout: Duration,
}

impl RecoveryStrategy {
    /// Create strategy
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: StrategyKind,
        applicable: ApplicableErrors,
        priority: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            applicable,
            priority,
            max_attempts: 1,
            timeout: Duration::from_secs(10),
        }
    }

    /// With internal retry bound
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// With execution deadline
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The built-in catalogue
///
/// Graceful degradation outranks the wildcard fallback so infrastructure
/// failures branch by system health before any synthesis is attempted;
/// for production and validation codes the cascade runs alternate-method,
/// enhanced-input, synthesized fallback, then emergency content.
#[must_use]
pub fn catalogue() -> Vec<RecoveryStrategy> {
    let production_and_validation = [
        ErrorCode::ProductionFailed,
        ErrorCode::LowConfidence,
        ErrorCode::QualityRejected,
        ErrorCode::PurityViolation,
    ];
    let infrastructure = [
        ErrorCode::NetworkFailure,
        ErrorCode::Timeout,
        ErrorCode::ResourceExhausted,
        ErrorCode::ServiceUnavailable,
    ];

    vec![
        RecoveryStrategy::new(
            "alternate_method",
            StrategyKind::AlternateMethod,
            ApplicableErrors::codes(production_and_validation),
            10,
        )
        .with_max_attempts(2)
        .with_timeout(Duration::from_secs(10)),
        RecoveryStrategy::new(
            "enhanced_input",
            StrategyKind::EnhancedInput,
            ApplicableErrors::codes([
                ErrorCode::LowConfidence,
                ErrorCode::QualityRejected,
                ErrorCode::PurityViolation,
            ]),
            20,
        )
        .with_timeout(Duration::from_secs(10)),
        RecoveryStrategy::new(
            "graceful_degradation",
            StrategyKind::GracefulDegradation,
            ApplicableErrors::codes(infrastructure),
            25,
        )
        .with_timeout(Duration::from_secs(5)),
        RecoveryStrategy::new(
            "synthesized_fallback",
            StrategyKind::SynthesizedFallback,
            ApplicableErrors::Wildcard,
            30,
        )
        .with_timeout(Duration::from_secs(8)),
        RecoveryStrategy::new(
            "emergency_content",
            StrategyKind::EmergencyContent,
            ApplicableErrors::Wildcard,
            100,
        )
        .with_timeout(Duration::from_secs(1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_everything() {
        assert!(ApplicableErrors::Wildcard.matches(ErrorCode::Timeout));
        assert!(ApplicableErrors::Wildcard.matches(ErrorCode::QualityRejected));
    }

    #[test]
    fn code_set_matches_members_only() {
        let set = ApplicableErrors::codes([ErrorCode::Timeout, ErrorCode::NetworkFailure]);
        assert!(set.matches(ErrorCode::Timeout));
        assert!(!set.matches(ErrorCode::QualityRejected));
    }

    #[test]
    fn catalogue_ids_are_unique() {
        let strategies = catalogue();
        let mut ids: Vec<&str> = strategies.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), strategies.len());
    }

    #[test]
    fn validation_errors_cascade_in_catalogue_order() {
        let strategies = catalogue();
        let mut applicable: Vec<(&str, u32)> = strategies
            .iter()
            .filter(|s| s.applicable.matches(ErrorCode::QualityRejected))
            .map(|s| (s.id.as_str(), s.priority))
            .collect();
        applicable.sort_by_key(|(_, priority)| *priority);

        let order: Vec<&str> = applicable.into_iter().map(|(id, _)| id).collect();
        assert_eq!(
            order,
            vec![
                "alternate_method",
                "enhanced_input",
                "synthesized_fallback",
                "emergency_content"
            ]
        );
    }

    #[test]
    fn infrastructure_errors_degrade_before_synthesis() {
        let strategies = catalogue();
        let first = strategies
            .iter()
            .filter(|s| s.applicable.matches(ErrorCode::ServiceUnavailable))
            .min_by_key(|s| s.priority)
            .unwrap();
        assert_eq!(first.id, "graceful_degradation");
    }

    #[test]
    fn emergency_is_wildcard_and_last() {
        let strategies = catalogue();
        let emergency = strategies
            .iter()
            .find(|s| s.kind == StrategyKind::EmergencyContent)
            .unwrap();
        assert!(emergency.applicable.matches(ErrorCode::InvalidConfiguration));
        assert!(strategies
            .iter()
            .all(|s| s.kind == StrategyKind::EmergencyContent || s.priority < emergency.priority));
    }
}
