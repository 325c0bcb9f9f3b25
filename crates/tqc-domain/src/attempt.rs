//! Translation attempts
//!
//! One `TranslationAttempt` is produced per production call and never
//! mutated after return.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;

/// Production method variants the producer is polymorphic over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslationMethod {
    /// Primary production engine
    Primary,
    /// Secondary production engine
    Secondary,
    /// Rule-based production
    RuleBased,
    /// Dictionary lookup production
    Dictionary,
    /// Hybrid of engine and rules
    Hybrid,
    /// Template expansion (used by synthesized fallbacks)
    Template,
}

impl TranslationMethod {
    /// Stable string form (used in entry metadata and outcome actions)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationMethod::Primary => "primary",
            TranslationMethod::Secondary => "secondary",
            TranslationMethod::RuleBased => "rule_based",
            TranslationMethod::Dictionary => "dictionary",
            TranslationMethod::Hybrid => "hybrid",
            TranslationMethod::Template => "template",
        }
    }

    /// Relative production cost (lower is cheaper)
    ///
    /// Graceful degradation uses this to pick a cheaper method when the
    /// system is under stress.
    #[inline]
    #[must_use]
    pub fn cost_rank(&self) -> u8 {
        match self {
            TranslationMethod::Dictionary => 0,
            TranslationMethod::Template => 1,
            TranslationMethod::RuleBased => 2,
            TranslationMethod::Secondary => 3,
            TranslationMethod::Hybrid => 4,
            TranslationMethod::Primary => 5,
        }
    }

    /// The alternate engine to retry with after this method failed
    #[inline]
    #[must_use]
    pub fn alternate(&self) -> TranslationMethod {
        match self {
            TranslationMethod::Primary => TranslationMethod::Secondary,
            TranslationMethod::Secondary => TranslationMethod::Hybrid,
            TranslationMethod::Hybrid => TranslationMethod::RuleBased,
            TranslationMethod::RuleBased => TranslationMethod::Dictionary,
            TranslationMethod::Dictionary | TranslationMethod::Template => {
                TranslationMethod::Primary
            }
        }
    }
}

impl std::fmt::Display for TranslationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one production call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationAttempt {
    /// Method that produced the text
    pub method: TranslationMethod,
    /// Produced target-language text
    pub text: String,
    /// Producer confidence, clamped to [0, 1]
    pub confidence: f64,
    /// Errors reported during production
    pub errors: SmallVec<[String; 2]>,
    /// Warnings reported during production
    pub warnings: SmallVec<[String; 2]>,
    /// Wall-clock production time
    pub processing_time: Duration,
}

impl TranslationAttempt {
    /// Create new attempt
    #[must_use]
    pub fn new(method: TranslationMethod, text: impl Into<String>, confidence: f64) -> Self {
        Self {
            method,
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            errors: SmallVec::new(),
            warnings: SmallVec::new(),
            processing_time: Duration::ZERO,
        }
    }

    /// With processing time
    #[inline]
    #[must_use]
    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = elapsed;
        self
    }

    /// With a warning
    #[inline]
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// With an error
    #[inline]
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    /// Return a copy with the confidence discounted by `factor`
    ///
    /// Used by retries that loosen input constraints and therefore trust
    /// the result slightly less.
    #[must_use]
    pub fn discounted(mut self, factor: f64) -> Self {
        self.confidence = (self.confidence * factor).clamp(0.0, 1.0);
        self
    }

    /// Whether production reported any errors
    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
