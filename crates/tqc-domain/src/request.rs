//! Translation request types
//!
//! A request is immutable once created and owned by the caller; the
//! pipeline only ever borrows it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique request identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Ulid);

impl RequestId {
    /// Generate new request ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source/target language pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Source language code (e.g. "en")
    pub source: String,
    /// Target language code (e.g. "de")
    pub target: String,
}

impl LanguagePair {
    /// Create new language pair
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Legal document content categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Contracts and agreements
    Contract,
    /// Court filings and pleadings
    CourtFiling,
    /// Statutes and regulations
    Statute,
    /// Legal correspondence
    Correspondence,
    /// Uncategorized legal text
    General,
}

impl ContentType {
    /// Stable string form (used in cache keys and index buckets)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Contract => "contract",
            ContentType::CourtFiling => "court_filing",
            ContentType::Statute => "statute",
            ContentType::Correspondence => "correspondence",
            ContentType::General => "general",
        }
    }
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::General
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Background work
    Low,
    /// Default priority
    Normal,
    /// Expedited handling
    High,
    /// Court-deadline class work
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// A single translation request
///
/// Immutable once constructed; the pipeline threads `&TranslationRequest`
/// through production, validation, caching and recovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Request ID
    pub id: RequestId,
    /// Source text to translate
    pub text: String,
    /// Source/target languages
    pub languages: LanguagePair,
    /// Content category
    pub content_type: ContentType,
    /// Priority
    pub priority: Priority,
    /// Caller-supplied context attributes (client, matter number, ...)
    pub context: IndexMap<String, String>,
}

impl TranslationRequest {
    /// Create new request with defaults for priority and context
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        languages: LanguagePair,
        content_type: ContentType,
    ) -> Self {
        Self {
            id: RequestId::new(),
            text: text.into(),
            languages,
            content_type,
            priority: Priority::default(),
            context: IndexMap::new(),
        }
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// With a context attribute
    #[inline]
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_unique_and_sortable() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert!(a <= b);
    }

    #[test]
    fn language_pair_display() {
        let pair = LanguagePair::new("en", "de");
        assert_eq!(pair.to_string(), "en->de");
    }

    #[test]
    fn content_type_as_str_is_stable() {
        assert_eq!(ContentType::Contract.as_str(), "contract");
        assert_eq!(ContentType::CourtFiling.as_str(), "court_filing");
        assert_eq!(ContentType::General.to_string(), "general");
    }

    #[test]
    fn request_builder() {
        let req = TranslationRequest::new(
            "The parties agree as follows.",
            LanguagePair::new("en", "fr"),
            ContentType::Contract,
        )
        .with_priority(Priority::High)
        .with_context("matter", "2024-381");

        assert_eq!(req.priority, Priority::High);
        assert_eq!(req.context.get("matter").map(String::as_str), Some("2024-381"));
        assert_eq!(req.content_type, ContentType::Contract);
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::High < Priority::Critical);
    }
}
