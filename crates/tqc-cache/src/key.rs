//! Deterministic cache keys
//!
//! A key is derived from normalized text plus the language pair and content
//! type, so the same legal text asked for twice lands on the same entry.
//! The rendered form embeds the pair and category before the digest, which
//! is what makes pattern invalidation by language or category possible.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tqc_domain::{ContentType, LanguagePair};

/// Number of digest hex characters kept in the rendered key
const DIGEST_PREFIX_LEN: usize = 16;

/// Cache key identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Compute the key for a request's text, languages, and category
    #[must_use]
    pub fn compute(text: &str, languages: &LanguagePair, content_type: ContentType) -> Self {
        let normalized = normalize(text);

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hasher.update([0]);
        hasher.update(languages.source.as_bytes());
        hasher.update([0]);
        hasher.update(languages.target.as_bytes());
        hasher.update([0]);
        hasher.update(content_type.as_str().as_bytes());
        let digest = hex::encode(hasher.finalize());

        Self(format!(
            "{}:{}:{}",
            languages,
            content_type.as_str(),
            &digest[..DIGEST_PREFIX_LEN]
        ))
    }

    /// Rendered key identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapse whitespace runs and case so trivially reformatted inputs share
/// a key
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> LanguagePair {
        LanguagePair::new("en", "de")
    }

    #[test]
    fn key_is_deterministic() {
        let a = CacheKey::compute("The parties agree.", &pair(), ContentType::Contract);
        let b = CacheKey::compute("The parties agree.", &pair(), ContentType::Contract);
        assert_eq!(a, b);
    }

    #[test]
    fn whitespace_and_case_are_normalized() {
        let a = CacheKey::compute("The  parties\n agree.", &pair(), ContentType::Contract);
        let b = CacheKey::compute("the parties agree.", &pair(), ContentType::Contract);
        assert_eq!(a, b);
    }

    #[test]
    fn languages_and_category_separate_keys() {
        let base = CacheKey::compute("text", &pair(), ContentType::Contract);
        let other_pair = CacheKey::compute(
            "text",
            &LanguagePair::new("en", "fr"),
            ContentType::Contract,
        );
        let other_type = CacheKey::compute("text", &pair(), ContentType::Statute);
        assert_ne!(base, other_pair);
        assert_ne!(base, other_type);
    }

    #[test]
    fn rendered_key_embeds_pair_and_category() {
        let key = CacheKey::compute("text", &pair(), ContentType::CourtFiling);
        assert!(key.as_str().starts_with("en->de:court_filing:"));
    }

    #[test]
    fn distinct_texts_do_not_collide() {
        let a = CacheKey::compute("clause one", &pair(), ContentType::General);
        let b = CacheKey::compute("clause two", &pair(), ContentType::General);
        assert_ne!(a, b);
    }
}
