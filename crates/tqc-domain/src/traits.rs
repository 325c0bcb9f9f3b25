//! External collaborator traits
//!
//! The core never implements translation, validation, or analytics itself;
//! it talks to these collaborators at declared async boundaries. Mocks are
//! generated behind the `mocks` feature for downstream test suites.

use crate::attempt::{TranslationAttempt, TranslationMethod};
use crate::error::{ErrorClassification, ErrorCode, ErrorContext, TranslationError};
use crate::quality::QualityReport;
use crate::request::ContentType;
use async_trait::async_trait;

/// Text producer, polymorphic over method variants
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Producer: Send + Sync {
    /// Produce target-language text from cleaned input
    async fn produce(
        &self,
        input: &str,
        target_language: &str,
        method: TranslationMethod,
    ) -> Result<TranslationAttempt, TranslationError>;
}

/// Quality gate scoring produced text
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait QualityGate: Send + Sync {
    /// Score text against the target language
    async fn validate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<QualityReport, TranslationError>;
}

/// Fallback collaborator: intent detection and safe-text synthesis
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait IntentSynthesizer: Send + Sync {
    /// Detect the category/intent of the input text
    async fn detect_intent(&self, text: &str) -> Result<ContentType, TranslationError>;

    /// Synthesize a templated safe response for the category
    async fn synthesize(
        &self,
        category: ContentType,
        target_language: &str,
    ) -> Result<String, TranslationError>;
}

/// Telemetry collaborator
///
/// Analytics, export, and dashboards live behind this boundary and are out
/// of scope for the core.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait Telemetry: Send + Sync {
    /// Report a system-level error
    fn report_system_error(&self, error: &TranslationError, context: &ErrorContext);

    /// Track one recovery attempt outcome
    fn track_error_recovery(&self, code: ErrorCode, action: &str, success: bool);

    /// Classify an error
    fn classify_error(&self, error: &TranslationError) -> ErrorClassification;
}

/// Telemetry sink that logs through `tracing` and classifies from the
/// built-in taxonomy
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn report_system_error(&self, error: &TranslationError, context: &ErrorContext) {
        tracing::error!(
            code = %error.code(),
            request = ?context.request_id,
            impact = ?context.user_impact,
            "system error: {error}"
        );
    }

    fn track_error_recovery(&self, code: ErrorCode, action: &str, success: bool) {
        tracing::info!(%code, action, success, "recovery attempt tracked");
    }

    fn classify_error(&self, error: &TranslationError) -> ErrorClassification {
        ErrorClassification {
            class: error.class(),
            severity: error.severity(),
            retryable: !matches!(error, TranslationError::InvalidConfiguration(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorClass, Severity};

    #[test]
    fn log_telemetry_classifies_from_taxonomy() {
        let telemetry = LogTelemetry;
        let err = TranslationError::Timeout(std::time::Duration::from_secs(5));
        let classification = telemetry.classify_error(&err);
        assert_eq!(classification.class, ErrorClass::Infrastructure);
        assert_eq!(classification.severity, Severity::Medium);
        assert!(classification.retryable);
    }

    #[test]
    fn configuration_errors_are_not_retryable() {
        let telemetry = LogTelemetry;
        let err = TranslationError::InvalidConfiguration("ttl".to_string());
        assert!(!telemetry.classify_error(&err).retryable);
    }

    #[tokio::test]
    async fn mock_producer_round_trip() {
        let mut producer = MockProducer::new();
        producer.expect_produce().returning(|_, _, method| {
            Ok(TranslationAttempt::new(method, "übersetzter Text", 0.92))
        });

        let attempt = producer
            .produce("source", "de", TranslationMethod::Primary)
            .await
            .unwrap();
        assert_eq!(attempt.method, TranslationMethod::Primary);
        assert!(attempt.confidence > 0.9);
    }
}
