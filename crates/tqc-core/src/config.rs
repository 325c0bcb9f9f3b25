//! Core configuration
//!
//! One serde-friendly record covering all recognized options, mapped into
//! the per-subsystem configurations at construction time. Out-of-range
//! values are clamped to safe defaults and logged; a configuration error
//! is never surfaced to callers.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tqc_cache::{CacheConfig, EvictionWeights};
use tqc_domain::AdmissionPolicy;
use tqc_escalation::EscalationConfig;
use tqc_recovery::RecoveryConfig;

/// Configuration for the whole translation core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Cache entry-count ceiling
    pub max_cache_entries: usize,
    /// Cache TTL in milliseconds applied when none is given
    pub default_ttl_ms: u64,
    /// Minimum overall quality score for admission
    pub quality_admission_threshold: f64,
    /// Whether any purity below 100 is a hard rejection
    pub zero_tolerance_enabled: bool,
    /// Fraction of entries removed per eviction pass
    pub eviction_fraction: f64,
    /// Cache memory ceiling in megabytes
    pub max_memory_mb: usize,
    /// Escalation cooldown in minutes applied to default rules
    pub default_cooldown_minutes: u64,
    /// Rolling-hour firing cap applied to default rules
    pub default_max_executions_per_hour: u32,
    /// Eviction score weights
    pub eviction_weights: EvictionWeights,
    /// Producer confidence floor below which production counts as failed
    pub confidence_floor: f64,
    /// Overall per-request recovery budget in milliseconds
    pub recovery_budget_ms: u64,
}

impl CoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With zero-tolerance mode
    #[inline]
    #[must_use]
    pub fn with_zero_tolerance(mut self, enabled: bool) -> Self {
        self.zero_tolerance_enabled = enabled;
        self
    }

    /// With admission threshold
    #[inline]
    #[must_use]
    pub fn with_admission_threshold(mut self, threshold: f64) -> Self {
        self.quality_admission_threshold = threshold;
        self
    }

    /// With cache entry ceiling
    #[inline]
    #[must_use]
    pub fn with_max_cache_entries(mut self, max: usize) -> Self {
        self.max_cache_entries = max;
        self
    }

    /// Clamp out-of-range values to safe defaults, logging each correction
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            tracing::warn!(
                invalid = self.confidence_floor,
                fallback = defaults.confidence_floor,
                "confidence floor clamped"
            );
            self.confidence_floor = defaults.confidence_floor;
        }
        if self.recovery_budget_ms == 0 {
            tracing::warn!(
                invalid = self.recovery_budget_ms,
                fallback = defaults.recovery_budget_ms,
                "recovery budget clamped"
            );
            self.recovery_budget_ms = defaults.recovery_budget_ms;
        }
        self
    }

    /// The shared admission policy
    #[must_use]
    pub fn admission_policy(&self) -> AdmissionPolicy {
        AdmissionPolicy {
            threshold: self.quality_admission_threshold,
            zero_tolerance: self.zero_tolerance_enabled,
        }
    }

    /// Cache configuration derived from this record
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.max_cache_entries,
            default_ttl: Duration::from_millis(self.default_ttl_ms),
            admission: self.admission_policy(),
            eviction_fraction: self.eviction_fraction,
            max_memory_mb: self.max_memory_mb,
            weights: self.eviction_weights,
        }
    }

    /// Escalation configuration derived from this record
    #[must_use]
    pub fn escalation_config(&self) -> EscalationConfig {
        EscalationConfig {
            default_cooldown: Duration::from_secs(self.default_cooldown_minutes * 60),
            default_max_executions_per_hour: self.default_max_executions_per_hour,
            ..EscalationConfig::default()
        }
    }

    /// Recovery configuration derived from this record
    #[must_use]
    pub fn recovery_config(&self) -> RecoveryConfig {
        RecoveryConfig {
            admission: self.admission_policy(),
            overall_budget: Duration::from_millis(self.recovery_budget_ms),
            ..RecoveryConfig::default()
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_cache_entries: 10_000,
            default_ttl_ms: 24 * 3600 * 1000,
            quality_admission_threshold: 85.0,
            zero_tolerance_enabled: true,
            eviction_fraction: 0.1,
            max_memory_mb: 256,
            default_cooldown_minutes: 15,
            default_max_executions_per_hour: 4,
            eviction_weights: EvictionWeights::default(),
            confidence_floor: 0.5,
            recovery_budget_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_configs_carry_the_shared_policy() {
        let config = CoreConfig::new()
            .with_admission_threshold(92.0)
            .with_zero_tolerance(false);

        assert_eq!(config.cache_config().admission.threshold, 92.0);
        assert_eq!(config.recovery_config().admission.threshold, 92.0);
        assert!(!config.cache_config().admission.zero_tolerance);
    }

    #[test]
    fn escalation_defaults_follow_minutes_and_cap() {
        let config = CoreConfig {
            default_cooldown_minutes: 10,
            default_max_executions_per_hour: 2,
            ..CoreConfig::default()
        };
        let escalation = config.escalation_config();
        assert_eq!(escalation.default_cooldown, Duration::from_secs(600));
        assert_eq!(escalation.default_max_executions_per_hour, 2);
    }

    #[test]
    fn sanitized_clamps_floor_and_budget() {
        let config = CoreConfig {
            confidence_floor: 3.0,
            recovery_budget_ms: 0,
            ..CoreConfig::default()
        }
        .sanitized();
        assert_eq!(config.confidence_floor, 0.5);
        assert_eq!(config.recovery_budget_ms, 30_000);
    }
}
