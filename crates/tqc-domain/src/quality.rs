//! Quality gate reports
//!
//! A `QualityReport` is computed fresh on every validation call and is
//! never cached independently of the attempt it scored.

use serde::{Deserialize, Serialize};

/// Named component scores, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Target-language/script purity (no contamination)
    pub purity: f64,
    /// Legal terminology accuracy
    pub terminology: f64,
    /// Contextual fidelity
    pub contextual: f64,
    /// Readability
    pub readability: f64,
    /// Professional register
    pub professionalism: f64,
}

impl ComponentScores {
    /// All components at the given score
    #[inline]
    #[must_use]
    pub fn uniform(score: f64) -> Self {
        let score = score.clamp(0.0, 100.0);
        Self {
            purity: score,
            terminology: score,
            contextual: score,
            readability: score,
            professionalism: score,
        }
    }
}

impl Default for ComponentScores {
    fn default() -> Self {
        Self::uniform(0.0)
    }
}

/// Quality gate verdict for one validated text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Overall score, 0-100
    pub overall: f64,
    /// Component scores
    pub components: ComponentScores,
    /// Violations found by the gate
    pub violations: Vec<String>,
    /// Whether the text clears the zero-tolerance purity bar
    pub passes_zero_tolerance: bool,
}

impl QualityReport {
    /// Create report from overall and component scores
    #[must_use]
    pub fn new(overall: f64, components: ComponentScores) -> Self {
        let overall = overall.clamp(0.0, 100.0);
        Self {
            overall,
            components,
            violations: Vec::new(),
            passes_zero_tolerance: components.purity >= 100.0,
        }
    }

    /// A perfect report (used by pre-validated emergency content)
    #[inline]
    #[must_use]
    pub fn perfect() -> Self {
        Self::new(100.0, ComponentScores::uniform(100.0))
    }

    /// With violations
    #[must_use]
    pub fn with_violations(mut self, violations: Vec<String>) -> Self {
        self.violations = violations;
        self
    }

    /// Whether the purity component is exactly at the ceiling
    #[inline]
    #[must_use]
    pub fn is_pure(&self) -> bool {
        self.components.purity >= 100.0
    }
}

/// The binary quality bar every candidate result is gated on
///
/// Applied uniformly: pipeline results offered to the cache and recovered
/// results alike pass through the same policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Minimum overall score
    pub threshold: f64,
    /// Whether any purity below 100 is a hard rejection
    pub zero_tolerance: bool,
}

impl AdmissionPolicy {
    /// Whether the policy admits a result with this quality report
    #[must_use]
    pub fn admits(&self, quality: &QualityReport) -> bool {
        if self.zero_tolerance && quality.components.purity < 100.0 {
            return false;
        }
        quality.overall >= self.threshold
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            threshold: 85.0,
            zero_tolerance: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_clamps_overall() {
        let report = QualityReport::new(120.0, ComponentScores::uniform(100.0));
        assert_eq!(report.overall, 100.0);
    }

    #[test]
    fn zero_tolerance_tracks_purity() {
        let pure = QualityReport::new(95.0, ComponentScores::uniform(100.0));
        assert!(pure.passes_zero_tolerance);
        assert!(pure.is_pure());

        let contaminated = QualityReport::new(
            95.0,
            ComponentScores {
                purity: 99.5,
                ..ComponentScores::uniform(100.0)
            },
        );
        assert!(!contaminated.passes_zero_tolerance);
        assert!(!contaminated.is_pure());
    }

    #[test]
    fn perfect_report() {
        let report = QualityReport::perfect();
        assert_eq!(report.overall, 100.0);
        assert!(report.violations.is_empty());
        assert!(report.passes_zero_tolerance);
    }

    #[test]
    fn violations_attach() {
        let report = QualityReport::new(60.0, ComponentScores::uniform(60.0))
            .with_violations(vec!["mixed script in clause 4".to_string()]);
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn zero_tolerance_policy_rejects_impure() {
        let policy = AdmissionPolicy {
            threshold: 80.0,
            zero_tolerance: true,
        };
        let impure = QualityReport::new(
            95.0,
            ComponentScores {
                purity: 99.0,
                ..ComponentScores::uniform(95.0)
            },
        );
        assert!(!policy.admits(&impure));
        assert!(policy.admits(&QualityReport::perfect()));
    }

    #[test]
    fn threshold_policy_ignores_purity_shortfall() {
        let policy = AdmissionPolicy {
            threshold: 80.0,
            zero_tolerance: false,
        };
        let quality = QualityReport::new(
            85.0,
            ComponentScores {
                purity: 90.0,
                ..ComponentScores::uniform(85.0)
            },
        );
        assert!(policy.admits(&quality));
        assert!(!policy.admits(&QualityReport::new(70.0, ComponentScores::uniform(70.0))));
    }
}
