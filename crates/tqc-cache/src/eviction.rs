//! Scored eviction
//!
//! Under memory pressure entries are ranked by a weighted sum of quality,
//! access frequency, recency, and age; the lowest-scoring configurable
//! fraction is removed per pass.

use crate::config::EvictionWeights;
use crate::entry::CacheEntry;
use crate::key::CacheKey;
use chrono::{DateTime, Utc};

/// Hours after which the recency bonus decays to zero
const RECENCY_HORIZON_HOURS: f64 = 24.0;

/// Eviction score for one entry at `now`; lower scores are evicted first
#[must_use]
pub fn eviction_score(entry: &CacheEntry, weights: &EvictionWeights, now: DateTime<Utc>) -> f64 {
    let quality = entry.result.quality.overall;
    let frequency = (1.0 + entry.access_count as f64).ln();

    let hours_since_access =
        (now - entry.last_accessed_at).num_seconds().max(0) as f64 / 3600.0;
    let recency_bonus = (1.0 - hours_since_access / RECENCY_HORIZON_HOURS).max(0.0);

    let age_days = (now - entry.created_at).num_seconds().max(0) as f64 / 86_400.0;

    weights.quality * quality + weights.frequency * frequency + weights.recency * recency_bonus
        - weights.age * age_days
}

/// Select up to `ceil(len * fraction)` victims, lowest score first
#[must_use]
pub fn select_victims<'a, I>(
    entries: I,
    len: usize,
    fraction: f64,
    weights: &EvictionWeights,
    now: DateTime<Utc>,
) -> Vec<CacheKey>
where
    I: Iterator<Item = &'a CacheEntry>,
{
    if len == 0 {
        return Vec::new();
    }
    let quota = ((len as f64) * fraction).ceil() as usize;

    let mut scored: Vec<(f64, CacheKey)> = entries
        .map(|e| (eviction_score(e, weights, now), e.key.clone()))
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(quota.min(len));
    scored.into_iter().map(|(_, key)| key).collect()
}
