//! Cache configuration
//!
//! Invalid values are clamped to safe defaults at construction time and
//! logged; a bad configuration never reaches the store or the caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use tqc_domain::AdmissionPolicy;

/// Weights of the eviction score
///
/// `w1*quality + w2*ln(1+access_count) + w3*recency_bonus - w4*age_days`;
/// entries are removed lowest score first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvictionWeights {
    /// Weight on the overall quality score
    pub quality: f64,
    /// Weight on log-scaled access count
    pub frequency: f64,
    /// Weight on the recency bonus
    pub recency: f64,
    /// Weight on entry age in days (subtractive)
    pub age: f64,
}

impl Default for EvictionWeights {
    fn default() -> Self {
        Self {
            quality: 1.0,
            frequency: 8.0,
            recency: 10.0,
            age: 2.0,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry-count ceiling
    pub max_entries: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Admission policy
    pub admission: AdmissionPolicy,
    /// Fraction of entries removed per eviction pass
    pub eviction_fraction: f64,
    /// Estimated-memory ceiling in megabytes
    pub max_memory_mb: usize,
    /// Eviction score weights
    pub weights: EvictionWeights,
}

impl CacheConfig {
    /// Clamp out-of-range values to safe defaults, logging each correction
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.max_entries == 0 {
            tracing::warn!(
                invalid = self.max_entries,
                fallback = defaults.max_entries,
                "max_entries clamped"
            );
            self.max_entries = defaults.max_entries;
        }
        if !(0.0..=100.0).contains(&self.admission.threshold) {
            tracing::warn!(
                invalid = self.admission.threshold,
                fallback = defaults.admission.threshold,
                "admission threshold clamped"
            );
            self.admission.threshold = defaults.admission.threshold;
        }
        if !(0.0..=1.0).contains(&self.eviction_fraction) || self.eviction_fraction == 0.0 {
            tracing::warn!(
                invalid = self.eviction_fraction,
                fallback = defaults.eviction_fraction,
                "eviction fraction clamped"
            );
            self.eviction_fraction = defaults.eviction_fraction;
        }
        if self.max_memory_mb == 0 {
            tracing::warn!(
                invalid = self.max_memory_mb,
                fallback = defaults.max_memory_mb,
                "max_memory_mb clamped"
            );
            self.max_memory_mb = defaults.max_memory_mb;
        }
        self
    }

    /// Memory ceiling in bytes
    #[inline]
    #[must_use]
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_mb * 1024 * 1024
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: Duration::from_secs(24 * 3600),
            admission: AdmissionPolicy::default(),
            eviction_fraction: 0.1,
            max_memory_mb: 256,
            weights: EvictionWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_clamps_invalid_values() {
        let config = CacheConfig {
            max_entries: 0,
            eviction_fraction: 1.5,
            max_memory_mb: 0,
            admission: AdmissionPolicy {
                threshold: 250.0,
                zero_tolerance: false,
            },
            ..CacheConfig::default()
        }
        .sanitized();

        let defaults = CacheConfig::default();
        assert_eq!(config.max_entries, defaults.max_entries);
        assert_eq!(config.eviction_fraction, defaults.eviction_fraction);
        assert_eq!(config.max_memory_mb, defaults.max_memory_mb);
        assert_eq!(config.admission.threshold, defaults.admission.threshold);
    }

    #[test]
    fn sanitized_keeps_valid_values() {
        let config = CacheConfig {
            max_entries: 50,
            eviction_fraction: 0.25,
            ..CacheConfig::default()
        }
        .sanitized();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.eviction_fraction, 0.25);
    }
}
