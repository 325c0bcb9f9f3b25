//! Secondary indices
//!
//! Key-only lookup sets by quality bucket, content type, and language
//! pair. Indices are derived caches over the primary store: every
//! maintenance path must be reproducible by `SecondaryIndexes::rebuild`,
//! and the store treats them as never authoritative.

use crate::entry::CacheEntry;
use crate::key::CacheKey;
use std::collections::{HashMap, HashSet};
use tqc_domain::ContentType;

/// Key-only secondary indices over the primary store
#[derive(Debug, Default, Clone)]
pub struct SecondaryIndexes {
    by_quality_bucket: HashMap<u8, HashSet<CacheKey>>,
    by_content_type: HashMap<ContentType, HashSet<CacheKey>>,
    by_language_pair: HashMap<String, HashSet<CacheKey>>,
}

impl SecondaryIndexes {
    /// Create empty indices
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an entry
    pub fn insert(&mut self, entry: &CacheEntry) {
        let key = entry.key.clone();
        self.by_quality_bucket
            .entry(entry.quality_bucket())
            .or_default()
            .insert(key.clone());
        self.by_content_type
            .entry(entry.metadata.content_type)
            .or_default()
            .insert(key.clone());
        self.by_language_pair
            .entry(entry.metadata.languages.to_string())
            .or_default()
            .insert(key);
    }

    /// Remove an entry from all indices
    pub fn remove(&mut self, entry: &CacheEntry) {
        if let Some(set) = self.by_quality_bucket.get_mut(&entry.quality_bucket()) {
            set.remove(&entry.key);
            if set.is_empty() {
                self.by_quality_bucket.remove(&entry.quality_bucket());
            }
        }
        if let Some(set) = self.by_content_type.get_mut(&entry.metadata.content_type) {
            set.remove(&entry.key);
            if set.is_empty() {
                self.by_content_type.remove(&entry.metadata.content_type);
            }
        }
        let pair = entry.metadata.languages.to_string();
        if let Some(set) = self.by_language_pair.get_mut(&pair) {
            set.remove(&entry.key);
            if set.is_empty() {
                self.by_language_pair.remove(&pair);
            }
        }
    }

    /// Rebuild all indices from the primary store
    #[must_use]
    pub fn rebuild<'a, I>(entries: I) -> Self
    where
        I: Iterator<Item = &'a CacheEntry>,
    {
        let mut indexes = Self::new();
        for entry in entries {
            indexes.insert(entry);
        }
        indexes
    }

    /// Keys in a quality decile bucket
    #[must_use]
    pub fn keys_in_quality_bucket(&self, bucket: u8) -> Vec<CacheKey> {
        self.by_quality_bucket
            .get(&bucket)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Keys for a content type
    #[must_use]
    pub fn keys_for_content_type(&self, content_type: ContentType) -> Vec<CacheKey> {
        self.by_content_type
            .get(&content_type)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Keys for a language pair (rendered as `source->target`)
    #[must_use]
    pub fn keys_for_language_pair(&self, pair: &str) -> Vec<CacheKey> {
        self.by_language_pair
            .get(pair)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of indexed keys per dimension, for consistency checks
    #[must_use]
    pub fn indexed_counts(&self) -> (usize, usize, usize) {
        (
            self.by_quality_bucket.values().map(HashSet::len).sum(),
            self.by_content_type.values().map(HashSet::len).sum(),
            self.by_language_pair.values().map(HashSet::len).sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::CachedTranslation;
    use chrono::Utc;
    use std::time::Duration;
    use tqc_domain::{ComponentScores, LanguagePair, QualityReport, TranslationMethod};

    fn entry(text: &str, overall: f64, content_type: ContentType, target: &str) -> CacheEntry {
        let languages = LanguagePair::new("en", target);
        let key = CacheKey::compute(text, &languages, content_type);
        CacheEntry::new(
            key,
            CachedTranslation::new(
                text,
                TranslationMethod::Primary,
                0.9,
                QualityReport::new(overall, ComponentScores::uniform(overall)),
            ),
            Duration::from_secs(3600),
            languages,
            content_type,
            Utc::now(),
        )
    }

    #[test]
    fn insert_and_lookup() {
        let mut indexes = SecondaryIndexes::new();
        let e = entry("text", 92.0, ContentType::Contract, "de");
        indexes.insert(&e);

        assert_eq!(indexes.keys_in_quality_bucket(9), vec![e.key.clone()]);
        assert_eq!(
            indexes.keys_for_content_type(ContentType::Contract),
            vec![e.key.clone()]
        );
        assert_eq!(indexes.keys_for_language_pair("en->de"), vec![e.key]);
    }

    #[test]
    fn remove_clears_empty_buckets() {
        let mut indexes = SecondaryIndexes::new();
        let e = entry("text", 92.0, ContentType::Contract, "de");
        indexes.insert(&e);
        indexes.remove(&e);

        assert!(indexes.keys_in_quality_bucket(9).is_empty());
        assert_eq!(indexes.indexed_counts(), (0, 0, 0));
    }

    #[test]
    fn rebuild_matches_incremental_maintenance() {
        let entries = vec![
            entry("one", 95.0, ContentType::Contract, "de"),
            entry("two", 88.0, ContentType::Statute, "fr"),
            entry("three", 71.0, ContentType::Contract, "de"),
        ];

        let mut incremental = SecondaryIndexes::new();
        for e in &entries {
            incremental.insert(e);
        }
        let rebuilt = SecondaryIndexes::rebuild(entries.iter());

        assert_eq!(incremental.indexed_counts(), rebuilt.indexed_counts());
        for e in &entries {
            let bucket = e.quality_bucket();
            assert_eq!(
                {
                    let mut keys = incremental.keys_in_quality_bucket(bucket);
                    keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                    keys
                },
                {
                    let mut keys = rebuilt.keys_in_quality_bucket(bucket);
                    keys.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                    keys
                }
            );
        }
    }

    #[test]
    fn language_pairs_are_disjoint() {
        let mut indexes = SecondaryIndexes::new();
        indexes.insert(&entry("one", 90.0, ContentType::General, "de"));
        indexes.insert(&entry("two", 90.0, ContentType::General, "fr"));

        assert_eq!(indexes.keys_for_language_pair("en->de").len(), 1);
        assert_eq!(indexes.keys_for_language_pair("en->fr").len(), 1);
        assert!(indexes.keys_for_language_pair("en->es").is_empty());
    }
}
