//! Translation outcomes
//!
//! `handle` never fails: every request produces one of these, worst case
//! explicitly flagged emergency content.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tqc_domain::{QualityReport, RequestId, TranslationMethod};

/// Structured result returned for every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutcome {
    /// Request this outcome answers
    pub request_id: RequestId,
    /// Whether a quality-passing translation was produced
    pub success: bool,
    /// Returned text (translation, fallback, or emergency notice)
    pub text: String,
    /// Confidence in the text, 0-1
    pub confidence: f64,
    /// Action that produced the result (`cache_hit`, `translated`,
    /// `retry_with_secondary`, `emergency_content`, ...)
    pub action: String,
    /// Production method, when production was involved
    pub method: Option<TranslationMethod>,
    /// Whether the result came from the cache
    pub cache_hit: bool,
    /// Whether recovery switched production methods
    pub method_switched: bool,
    /// Whether this is explicitly flagged emergency content
    pub emergency: bool,
    /// Quality report, when the text was validated this call
    pub quality: Option<QualityReport>,
    /// Wall-clock handling time
    pub processing_time: Duration,
}

impl TranslationOutcome {
    /// Whether the outcome is well-formed (used by tests and assertions)
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.action.is_empty()
            && (0.0..=1.0).contains(&self.confidence)
            && !self.text.is_empty()
    }
}
