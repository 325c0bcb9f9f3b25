//! TQC Domain - shared data model for the translation quality core
//!
//! Foundation crate with no dependency on the other workspace members:
//! - Requests, attempts, and quality reports
//! - The four-class error taxonomy with stable codes
//! - External collaborator traits (producer, quality gate, fallback, telemetry)
//!
//! # Example
//!
//! ```rust
//! use tqc_domain::{ContentType, LanguagePair, Priority, TranslationRequest};
//!
//! let request = TranslationRequest::new(
//!     "This agreement is governed by the laws of Delaware.",
//!     LanguagePair::new("en", "de"),
//!     ContentType::Contract,
//! )
//! .with_priority(Priority::High);
//!
//! assert_eq!(request.languages.to_string(), "en->de");
//! ```

#![warn(unreachable_pub)]

pub mod attempt;
pub mod error;
pub mod quality;
pub mod request;
pub mod traits;

// Re-exports for convenience
pub use attempt::{TranslationAttempt, TranslationMethod};
pub use error::{
    ErrorClass, ErrorClassification, ErrorCode, ErrorContext, Severity, TranslationError,
    UserImpact,
};
pub use quality::{AdmissionPolicy, ComponentScores, QualityReport};
pub use request::{ContentType, LanguagePair, Priority, RequestId, TranslationRequest};
pub use traits::{IntentSynthesizer, LogTelemetry, Producer, QualityGate, Telemetry};

#[cfg(any(test, feature = "mocks"))]
pub use traits::{MockIntentSynthesizer, MockProducer, MockQualityGate, MockTelemetry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
