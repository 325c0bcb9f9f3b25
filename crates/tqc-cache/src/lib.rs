//! TQC Cache - quality-gated result cache
//!
//! A key-value store that refuses results below the configured quality
//! bar, re-checks stored entries against the current policy on read, and
//! bounds its growth with scored eviction:
//! - Admission control (zero-tolerance purity or threshold-based)
//! - Scored eviction (`quality + frequency + recency - age`, weights
//!   configurable), bounded per pass
//! - Secondary indices by quality bucket, content type, and language
//!   pair, fully rebuildable from the primary store
//! - Pattern invalidation over rendered key identifiers
//!
//! # Example
//!
//! ```rust
//! use tqc_cache::{CacheConfig, CacheKey, CachedTranslation, QualityGatedCache};
//! use tqc_domain::{ComponentScores, ContentType, LanguagePair, QualityReport, TranslationMethod};
//!
//! let cache = QualityGatedCache::new(CacheConfig::default());
//! let languages = LanguagePair::new("en", "de");
//! let key = CacheKey::compute("The parties agree.", &languages, ContentType::Contract);
//!
//! let result = CachedTranslation::new(
//!     "Die Parteien vereinbaren.",
//!     TranslationMethod::Primary,
//!     0.95,
//!     QualityReport::new(100.0, ComponentScores::uniform(100.0)),
//! );
//! assert!(cache.set(key.clone(), result, languages, ContentType::Contract, None));
//! assert!(cache.get(&key).is_some());
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod entry;
pub mod eviction;
pub mod index;
pub mod key;
pub mod stats;
pub mod store;

// Re-exports for convenience
pub use config::{AdmissionPolicy, CacheConfig, EvictionWeights};
pub use entry::{CacheEntry, CachedTranslation, EntryMetadata};
pub use eviction::eviction_score;
pub use index::SecondaryIndexes;
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{OptimizeReport, QualityGatedCache};

/// Error type returned for invalid invalidation patterns
pub use regex::Error as PatternError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
