//! Quality-gated cache store
//!
//! A single lock-guarded owner of the primary map and the derived indices.
//! Admission is compute-then-insert under one write guard, so an eviction
//! sweep can never interleave with a conflicting insert for the same key.
//! Producer and gate calls happen entirely outside this lock; a slow
//! collaborator for one key never blocks cache operations on another.

use crate::config::{AdmissionPolicy, CacheConfig};
use crate::entry::{CacheEntry, CachedTranslation};
use crate::eviction::select_victims;
use crate::index::SecondaryIndexes;
use crate::key::CacheKey;
use crate::stats::{CacheStats, StatsRecorder};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tqc_domain::{ContentType, LanguagePair};

/// Outcome of one `optimize` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    /// Entries removed because their TTL elapsed
    pub expired_removed: usize,
    /// Entries removed because they no longer clear the admission policy
    pub below_threshold_removed: usize,
    /// Entries removed by the scored eviction pass
    pub evicted: usize,
}

/// Lookup disposition decided under the write guard
enum Disposition {
    Miss,
    Expired,
    BelowPolicy,
    Hit,
}

/// Lock-guarded interior: primary store plus derived state
#[derive(Debug)]
struct CacheState {
    config: CacheConfig,
    entries: HashMap<CacheKey, CacheEntry>,
    indexes: SecondaryIndexes,
    estimated_bytes: usize,
}

impl CacheState {
    fn insert_entry(&mut self, entry: CacheEntry) {
        self.estimated_bytes += entry.estimated_size();
        self.indexes.insert(&entry);
        self.entries.insert(entry.key.clone(), entry);
    }

    fn remove_entry(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.estimated_bytes = self.estimated_bytes.saturating_sub(entry.estimated_size());
        self.indexes.remove(&entry);
        Some(entry)
    }

    fn over_ceiling(&self) -> bool {
        self.entries.len() > self.config.max_entries
            || self.estimated_bytes > self.config.max_memory_bytes()
    }

    /// One scored eviction pass; removes at most
    /// `ceil(len * eviction_fraction)` entries, lowest score first
    fn evict_pass(&mut self) -> usize {
        let now = Utc::now();
        let victims = select_victims(
            self.entries.values(),
            self.entries.len(),
            self.config.eviction_fraction,
            &self.config.weights,
            now,
        );
        for key in &victims {
            self.remove_entry(key);
        }
        victims.len()
    }
}

/// The quality-gated cache
///
/// Every candidate result goes through the admission policy; entries are
/// re-checked against the current policy on read, so a tightened threshold
/// lazily flushes entries admitted under a looser one.
#[derive(Debug)]
pub struct QualityGatedCache {
    state: RwLock<CacheState>,
    stats: StatsRecorder,
}

impl QualityGatedCache {
    /// Create cache with the given configuration (clamped to safe values)
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            state: RwLock::new(CacheState {
                config: config.sanitized(),
                entries: HashMap::new(),
                indexes: SecondaryIndexes::new(),
                estimated_bytes: 0,
            }),
            stats: StatsRecorder::default(),
        }
    }

    /// Look up a key
    ///
    /// Expired or no-longer-qualifying entries are lazily deleted and
    /// reported as misses. A hit bumps access bookkeeping only.
    pub fn get(&self, key: &CacheKey) -> Option<CachedTranslation> {
        let now = Utc::now();
        let mut state = self.state.write();

        let disposition = match state.entries.get(key) {
            None => Disposition::Miss,
            Some(entry) if entry.is_expired(now) => Disposition::Expired,
            Some(entry) if !state.config.admission.admits(&entry.result.quality) => {
                Disposition::BelowPolicy
            }
            Some(_) => Disposition::Hit,
        };

        match disposition {
            Disposition::Miss => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Disposition::Expired => {
                tracing::debug!(%key, "lazily removing expired entry");
                state.remove_entry(key);
                self.stats.expired_removals.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Disposition::BelowPolicy => {
                tracing::debug!(%key, "lazily removing entry below current policy");
                state.remove_entry(key);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Disposition::Hit => {
                let entry = state.entries.get_mut(key)?;
                entry.touch(now);
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.result.clone())
            }
        }
    }

    /// Offer a result for admission
    ///
    /// Returns `true` if the result was admitted. A result failing the
    /// admission policy makes this a strict no-op apart from the rejection
    /// counter: no mutation, no eviction, no index churn.
    pub fn set(
        &self,
        key: CacheKey,
        result: CachedTranslation,
        languages: LanguagePair,
        content_type: ContentType,
        ttl: Option<Duration>,
    ) -> bool {
        let mut state = self.state.write();

        if !state.config.admission.admits(&result.quality) {
            tracing::debug!(%key, overall = result.quality.overall, "admission refused");
            self.stats.rejected_admissions.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let ttl = ttl.unwrap_or(state.config.default_ttl);
        let entry = CacheEntry::new(key.clone(), result, ttl, languages, content_type, Utc::now());

        // Replace-in-place keeps indices and the memory estimate coherent
        state.remove_entry(&key);
        state.insert_entry(entry);

        let evicted = Self::enforce_ceiling(&mut state);
        if evicted > 0 {
            self.stats
                .evictions
                .fetch_add(evicted as u64, Ordering::Relaxed);
        }
        true
    }

    /// Degraded read path: return the stored result even when its TTL has
    /// elapsed
    ///
    /// Used under graceful degradation, where a stale result beats the
    /// emergency backstop. No bookkeeping, no lazy deletion.
    #[must_use]
    pub fn get_stale(&self, key: &CacheKey) -> Option<CachedTranslation> {
        self.state.read().entries.get(key).map(|e| e.result.clone())
    }

    /// Swap the admission policy; existing entries are re-checked lazily
    /// on read or during `optimize`
    pub fn update_policy(&self, policy: AdmissionPolicy) {
        let mut state = self.state.write();
        tracing::info!(
            threshold = policy.threshold,
            zero_tolerance = policy.zero_tolerance,
            "admission policy updated"
        );
        state.config.admission = policy;
    }

    /// Remove all keys whose identifier matches the pattern
    ///
    /// # Errors
    /// Returns the regex error for an invalid pattern; the store is
    /// untouched in that case.
    pub fn invalidate(&self, pattern: &str) -> Result<usize, regex::Error> {
        let matcher = regex::Regex::new(pattern)?;
        let mut state = self.state.write();

        let victims: Vec<CacheKey> = state
            .entries
            .keys()
            .filter(|key| matcher.is_match(key.as_str()))
            .cloned()
            .collect();
        for key in &victims {
            state.remove_entry(key);
        }

        self.stats
            .invalidated
            .fetch_add(victims.len() as u64, Ordering::Relaxed);
        tracing::info!(pattern, removed = victims.len(), "pattern invalidation");
        Ok(victims.len())
    }

    /// Sweep expired and now-sub-threshold entries, then run a scored
    /// eviction pass if the store is still over its ceiling
    pub fn optimize(&self) -> OptimizeReport {
        let now = Utc::now();
        let mut state = self.state.write();
        let mut report = OptimizeReport::default();

        let expired: Vec<CacheKey> = state
            .entries
            .values()
            .filter(|e| e.is_expired(now))
            .map(|e| e.key.clone())
            .collect();
        for key in &expired {
            state.remove_entry(key);
        }
        report.expired_removed = expired.len();

        let below: Vec<CacheKey> = state
            .entries
            .values()
            .filter(|e| !state.config.admission.admits(&e.result.quality))
            .map(|e| e.key.clone())
            .collect();
        for key in &below {
            state.remove_entry(key);
        }
        report.below_threshold_removed = below.len();

        if state.over_ceiling() {
            report.evicted = Self::enforce_ceiling(&mut state);
        }

        self.stats
            .expired_removals
            .fetch_add(report.expired_removed as u64, Ordering::Relaxed);
        self.stats
            .evictions
            .fetch_add(report.evicted as u64, Ordering::Relaxed);
        tracing::info!(?report, "cache optimize pass");
        report
    }

    /// Rebuild the secondary indices from the primary store
    ///
    /// Indices are derived caches; this restores them from scratch and is
    /// always safe to call.
    pub fn rebuild_indexes(&self) {
        let mut state = self.state.write();
        state.indexes = SecondaryIndexes::rebuild(state.entries.values());
    }

    /// Keys currently indexed for a language pair (`source->target`)
    #[must_use]
    pub fn keys_for_language_pair(&self, pair: &str) -> Vec<CacheKey> {
        self.state.read().indexes.keys_for_language_pair(pair)
    }

    /// Keys currently indexed for a content type
    #[must_use]
    pub fn keys_for_content_type(&self, content_type: ContentType) -> Vec<CacheKey> {
        self.state.read().indexes.keys_for_content_type(content_type)
    }

    /// Point-in-time statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        self.stats
            .snapshot(state.entries.len(), state.estimated_bytes)
    }

    /// Live entry count
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.indexes = SecondaryIndexes::new();
        state.estimated_bytes = 0;
    }

    /// Evict passes until the store is back under its ceiling
    fn enforce_ceiling(state: &mut CacheState) -> usize {
        let mut total = 0;
        while state.over_ceiling() && !state.entries.is_empty() {
            let evicted = state.evict_pass();
            if evicted == 0 {
                break;
            }
            total += evicted;
        }
        total
    }
}

impl Default for QualityGatedCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
