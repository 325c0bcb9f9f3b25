//! Cache entries
//!
//! Entries are owned exclusively by the store. Readers receive clones of
//! the cached translation; only the store mutates access bookkeeping.

use crate::key::CacheKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tqc_domain::{ContentType, LanguagePair, QualityReport, TranslationMethod};

/// The value stored for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedTranslation {
    /// Translated text
    pub text: String,
    /// Method that produced it
    pub method: TranslationMethod,
    /// Producer confidence at admission time
    pub confidence: f64,
    /// Quality report the admission decision was made on
    pub quality: QualityReport,
}

impl CachedTranslation {
    /// Create new cached translation
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        method: TranslationMethod,
        confidence: f64,
        quality: QualityReport,
    ) -> Self {
        Self {
            text: text.into(),
            method,
            confidence: confidence.clamp(0.0, 1.0),
            quality,
        }
    }
}

/// Descriptive metadata kept alongside an entry, mirrored into the
/// secondary indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Language pair
    pub languages: LanguagePair,
    /// Content category
    pub content_type: ContentType,
    /// Translated text length in bytes
    pub length: usize,
    /// Production method
    pub method: TranslationMethod,
    /// Free-form tags
    pub tags: Vec<String>,
}

/// One cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key this entry is stored under
    pub key: CacheKey,
    /// Stored result
    pub result: CachedTranslation,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last read instant
    pub last_accessed_at: DateTime<Utc>,
    /// Number of reads served
    pub access_count: u64,
    /// Time to live from creation
    pub ttl: Duration,
    /// Sha-256 over the stored text
    pub content_hash: String,
    /// Descriptive metadata
    pub metadata: EntryMetadata,
}

impl CacheEntry {
    /// Create entry admitted at `now`
    #[must_use]
    pub fn new(
        key: CacheKey,
        result: CachedTranslation,
        ttl: Duration,
        languages: LanguagePair,
        content_type: ContentType,
        now: DateTime<Utc>,
    ) -> Self {
        let content_hash = hex::encode(Sha256::digest(result.text.as_bytes()));
        let metadata = EntryMetadata {
            languages,
            content_type,
            length: result.text.len(),
            method: result.method,
            tags: Vec::new(),
        };
        Self {
            key,
            result,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            ttl,
            content_hash,
            metadata,
        }
    }

    /// Whether the entry's TTL has elapsed at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.ttl) {
            Ok(ttl) => now - self.created_at >= ttl,
            // TTL too large for chrono arithmetic: effectively no expiry
            Err(_) => false,
        }
    }

    /// Record one read at `now`
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }

    /// Rough in-memory footprint in bytes, used for the memory ceiling
    #[must_use]
    pub fn estimated_size(&self) -> usize {
        // Text dominates; the rest is a flat allowance for struct overhead,
        // metadata strings, and index slots.
        self.result.text.len() + self.key.as_str().len() + 256
    }

    /// Decile bucket of the overall quality score (0..=10)
    #[inline]
    #[must_use]
    pub fn quality_bucket(&self) -> u8 {
        (self.result.quality.overall / 10.0).floor().min(10.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tqc_domain::ComponentScores;

    fn entry(ttl_secs: u64) -> CacheEntry {
        let languages = LanguagePair::new("en", "de");
        let key = CacheKey::compute("text", &languages, ContentType::General);
        let result = CachedTranslation::new(
            "Text",
            TranslationMethod::Primary,
            0.95,
            QualityReport::new(92.0, ComponentScores::uniform(92.0)),
        );
        CacheEntry::new(
            key,
            result,
            Duration::from_secs(ttl_secs),
            languages,
            ContentType::General,
            Utc::now(),
        )
    }

    #[test]
    fn fresh_entry_is_not_expired() {
        let e = entry(3600);
        assert!(!e.is_expired(Utc::now()));
    }

    #[test]
    fn entry_expires_after_ttl() {
        let e = entry(60);
        let later = e.created_at + chrono::Duration::seconds(61);
        assert!(e.is_expired(later));
    }

    #[test]
    fn touch_updates_bookkeeping_only() {
        let mut e = entry(3600);
        let text_before = e.result.text.clone();
        let later = Utc::now() + chrono::Duration::seconds(5);

        e.touch(later);
        e.touch(later);

        assert_eq!(e.access_count, 2);
        assert_eq!(e.last_accessed_at, later);
        assert_eq!(e.result.text, text_before);
    }

    #[test]
    fn content_hash_covers_text() {
        let a = entry(60);
        let expected = hex::encode(Sha256::digest("Text".as_bytes()));
        assert_eq!(a.content_hash, expected);
    }

    #[test]
    fn quality_bucket_is_decile() {
        let e = entry(60);
        assert_eq!(e.quality_bucket(), 9);
    }
}
