//! Cascading recovery engine
//!
//! `recover` walks the strategy catalogue for one failed request: select
//! the lowest-priority applicable strategy not already in the attempt
//! log, execute it under its deadline, append a log record regardless of
//! outcome, and report the outcome to telemetry and the escalation
//! intake. The cascade terminates with a usable result in every case;
//! the emergency backstop cannot fail and stays reachable inside the
//! overall budget.

use crate::context::{DegradedResultSource, RecoveryAttempt, RecoveryResult};
use crate::emergency::{emergency_quality, emergency_text, EMERGENCY_CONFIDENCE};
use crate::health::{HealthLevel, HealthMonitor};
use crate::stats::{RecoveryStatistics, StatsRecorder};
use crate::strategy::{catalogue, RecoveryStrategy, StrategyKind};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tqc_domain::{
    AdmissionPolicy, ErrorCode, IntentSynthesizer, Producer, QualityGate, QualityReport,
    Telemetry, TranslationError, TranslationMethod, TranslationRequest,
};
use tqc_escalation::EscalationEngine;

/// Action label of the emergency backstop
pub const EMERGENCY_ACTION: &str = "emergency_content";

/// Recovery configuration
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Pass criteria applied to every re-validated result
    pub admission: AdmissionPolicy,
    /// Overall per-request cascade budget
    pub overall_budget: Duration,
    /// Confidence multiplier for enhanced-input retries
    pub confidence_discount: f64,
    /// Confidence attached to synthesized fallback text
    pub synthesized_confidence: f64,
    /// Cheaper method used under graceful degradation
    pub degraded_method: TranslationMethod,
}

impl RecoveryConfig {
    /// Clamp out-of-range values to safe defaults, logging each correction
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(0.0..=1.0).contains(&self.confidence_discount) || self.confidence_discount == 0.0 {
            tracing::warn!(
                invalid = self.confidence_discount,
                fallback = defaults.confidence_discount,
                "confidence discount clamped"
            );
            self.confidence_discount = defaults.confidence_discount;
        }
        if !(0.0..=1.0).contains(&self.synthesized_confidence) {
            tracing::warn!(
                invalid = self.synthesized_confidence,
                fallback = defaults.synthesized_confidence,
                "synthesized confidence clamped"
            );
            self.synthesized_confidence = defaults.synthesized_confidence;
        }
        self
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionPolicy::default(),
            overall_budget: Duration::from_secs(30),
            confidence_discount: 0.9,
            synthesized_confidence: 0.6,
            degraded_method: TranslationMethod::RuleBased,
        }
    }
}

/// What one successful strategy execution produced
struct StrategyOutput {
    text: String,
    confidence: f64,
    action: String,
    method: Option<TranslationMethod>,
    method_switched: bool,
    emergency: bool,
    quality: Option<QualityReport>,
}

/// One finished cascade step, ready for the log
struct StepOutcome {
    strategy_id: String,
    action: String,
    success: bool,
    timed_out: bool,
    duration: Duration,
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

/// The cascading recovery engine
pub struct RecoveryEngine {
    strategies: Vec<RecoveryStrategy>,
    producer: Arc<dyn Producer>,
    gate: Arc<dyn QualityGate>,
    synthesizer: Arc<dyn IntentSynthesizer>,
    telemetry: Arc<dyn Telemetry>,
    escalation: Arc<EscalationEngine>,
    degraded_source: Option<Arc<dyn DegradedResultSource>>,
    config: RecoveryConfig,
    stats: StatsRecorder,
    health: HealthMonitor,
}

impl std::fmt::Debug for RecoveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryEngine")
            .field("strategies", &self.strategies.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecoveryEngine {
    /// Create engine with the built-in catalogue
    #[must_use]
    pub fn new(
        producer: Arc<dyn Producer>,
        gate: Arc<dyn QualityGate>,
        synthesizer: Arc<dyn IntentSynthesizer>,
        telemetry: Arc<dyn Telemetry>,
        escalation: Arc<EscalationEngine>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            strategies: catalogue(),
            producer,
            gate,
            synthesizer,
            telemetry,
            escalation,
            degraded_source: None,
            config: config.sanitized(),
            stats: StatsRecorder::default(),
            health: HealthMonitor::default(),
        }
    }

    /// Replace the catalogue (registration happens once at startup)
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<RecoveryStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Wire a source of cached results for degraded reuse
    #[must_use]
    pub fn with_degraded_source(mut self, source: Arc<dyn DegradedResultSource>) -> Self {
        self.degraded_source = Some(source);
        self
    }

    /// Replace the health monitor
    #[must_use]
    pub fn with_health_monitor(mut self, health: HealthMonitor) -> Self {
        self.health = health;
        self
    }

    /// Run the cascade for one failed request
    ///
    /// `failed_method` is the production method in flight when the error
    /// occurred; `previous_attempts` carries any earlier cascade steps for
    /// this request, whose strategy ids are never re-selected.
    pub async fn recover(
        &self,
        request: &TranslationRequest,
        error: &TranslationError,
        failed_method: TranslationMethod,
        previous_attempts: Vec<RecoveryAttempt>,
    ) -> RecoveryResult {
        let cascade_started = Instant::now();
        let code = error.code();
        self.stats.total_cascades.fetch_add(1, Ordering::Relaxed);
        if error.is_infrastructure() {
            self.health.record_failure();
        }
        tracing::info!(request = %request.id, %code, "recovery cascade started");

        let mut attempts = previous_attempts;
        loop {
            if cascade_started.elapsed() >= self.config.overall_budget {
                tracing::warn!(
                    request = %request.id,
                    "cascade budget exhausted, emitting emergency content"
                );
                return self.terminal_emergency(request, code, attempts);
            }

            let Some(strategy) = self.select_strategy(code, &attempts).cloned() else {
                tracing::warn!(
                    request = %request.id,
                    "no applicable strategies remain, emitting emergency content"
                );
                return self.terminal_emergency(request, code, attempts);
            };

            let started = Instant::now();
            let timestamp = Utc::now();
            let outcome = tokio::time::timeout(
                strategy.timeout,
                self.execute(&strategy, request, failed_method),
            )
            .await;
            let duration = started.elapsed();

            match outcome {
                Ok(Ok(output)) => {
                    self.record_step(
                        &mut attempts,
                        code,
                        StepOutcome {
                            strategy_id: strategy.id.clone(),
                            action: output.action.clone(),
                            success: true,
                            timed_out: false,
                            duration,
                            error: None,
                            timestamp,
                        },
                    );
                    if output.emergency {
                        self.stats
                            .emergency_terminations
                            .fetch_add(1, Ordering::Relaxed);
                    }
                    tracing::info!(
                        request = %request.id,
                        strategy = %strategy.id,
                        action = %output.action,
                        "recovery produced a usable result"
                    );
                    return RecoveryResult {
                        success: true,
                        text: output.text,
                        confidence: output.confidence,
                        action: output.action,
                        method: output.method,
                        method_switched: output.method_switched,
                        emergency: output.emergency,
                        quality: output.quality,
                        attempts,
                    };
                }
                Ok(Err(step_error)) => {
                    tracing::warn!(
                        request = %request.id,
                        strategy = %strategy.id,
                        "strategy failed: {step_error}"
                    );
                    self.record_step(
                        &mut attempts,
                        code,
                        StepOutcome {
                            strategy_id: strategy.id.clone(),
                            action: strategy.id.clone(),
                            success: false,
                            timed_out: false,
                            duration,
                            error: Some(step_error.to_string()),
                            timestamp,
                        },
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        request = %request.id,
                        strategy = %strategy.id,
                        "strategy deadline of {:?} exceeded",
                        strategy.timeout
                    );
                    self.record_step(
                        &mut attempts,
                        code,
                        StepOutcome {
                            strategy_id: strategy.id.clone(),
                            action: strategy.id.clone(),
                            success: false,
                            timed_out: true,
                            duration,
                            error: Some(format!(
                                "strategy timed out after {:?}",
                                strategy.timeout
                            )),
                            timestamp,
                        },
                    );
                }
            }
        }
    }

    /// Point-in-time statistics
    #[must_use]
    pub fn statistics(&self) -> RecoveryStatistics {
        self.stats.snapshot()
    }

    /// Current health assessment
    #[must_use]
    pub fn health_level(&self) -> HealthLevel {
        self.health.assess()
    }

    /// Lowest-priority applicable strategy whose id is not in the log
    fn select_strategy(
        &self,
        code: ErrorCode,
        attempts: &[RecoveryAttempt],
    ) -> Option<&RecoveryStrategy> {
        let used: HashSet<&str> = attempts.iter().map(|a| a.strategy_id.as_str()).collect();
        self.strategies
            .iter()
            .filter(|s| s.applicable.matches(code) && !used.contains(s.id.as_str()))
            .min_by_key(|s| s.priority)
    }

    /// Dispatch on the strategy kind
    async fn execute(
        &self,
        strategy: &RecoveryStrategy,
        request: &TranslationRequest,
        failed_method: TranslationMethod,
    ) -> Result<StrategyOutput, TranslationError> {
        match strategy.kind {
            StrategyKind::AlternateMethod => {
                self.run_alternate(strategy, request, failed_method).await
            }
            StrategyKind::EnhancedInput => self.run_enhanced(request, failed_method).await,
            StrategyKind::SynthesizedFallback => self.run_synthesized(request).await,
            StrategyKind::GracefulDegradation => self.run_degraded(request).await,
            StrategyKind::EmergencyContent => Ok(Self::emergency_output(request)),
        }
    }

    /// Reproduce with different methods until one passes re-validation
    async fn run_alternate(
        &self,
        strategy: &RecoveryStrategy,
        request: &TranslationRequest,
        failed_method: TranslationMethod,
    ) -> Result<StrategyOutput, TranslationError> {
        let target = &request.languages.target;
        let mut method = failed_method.alternate();
        let mut last_error = None;

        for _ in 0..strategy.max_attempts {
            match self.producer.produce(&request.text, target, method).await {
                Ok(attempt) => {
                    let quality = self.gate.validate(&attempt.text, target).await?;
                    if self.config.admission.admits(&quality) {
                        return Ok(StrategyOutput {
                            text: attempt.text,
                            confidence: attempt.confidence,
                            action: format!("retry_with_{}", method.as_str()),
                            method: Some(method),
                            method_switched: true,
                            emergency: false,
                            quality: Some(quality),
                        });
                    }
                    last_error = Some(TranslationError::QualityRejected {
                        overall: quality.overall,
                        violations: quality.violations,
                    });
                }
                Err(err) => last_error = Some(err),
            }

            method = method.alternate();
            if method == failed_method {
                method = method.alternate();
            }
        }

        Err(last_error.unwrap_or_else(|| TranslationError::ProductionFailed {
            method: failed_method.as_str().to_string(),
            message: "no alternate method available".to_string(),
        }))
    }

    /// Aggressively normalize the input and retry once at discounted
    /// confidence
    async fn run_enhanced(
        &self,
        request: &TranslationRequest,
        failed_method: TranslationMethod,
    ) -> Result<StrategyOutput, TranslationError> {
        let target = &request.languages.target;
        let cleaned = enhance_input(&request.text);
        let attempt = self.producer.produce(&cleaned, target, failed_method).await?;
        let quality = self.gate.validate(&attempt.text, target).await?;

        if self.config.admission.admits(&quality) {
            let confidence =
                (attempt.confidence * self.config.confidence_discount).clamp(0.0, 1.0);
            Ok(StrategyOutput {
                text: attempt.text,
                confidence,
                action: "retry_enhanced_input".to_string(),
                method: Some(failed_method),
                method_switched: false,
                emergency: false,
                quality: Some(quality),
            })
        } else {
            Err(TranslationError::QualityRejected {
                overall: quality.overall,
                violations: quality.violations,
            })
        }
    }

    /// Detect the input's category and synthesize templated safe text
    async fn run_synthesized(
        &self,
        request: &TranslationRequest,
    ) -> Result<StrategyOutput, TranslationError> {
        let target = &request.languages.target;
        let category = self.synthesizer.detect_intent(&request.text).await?;
        let text = self.synthesizer.synthesize(category, target).await?;
        let quality = self.gate.validate(&text, target).await?;

        if self.config.admission.admits(&quality) {
            Ok(StrategyOutput {
                text,
                confidence: self.config.synthesized_confidence,
                action: "synthesized_fallback".to_string(),
                method: Some(TranslationMethod::Template),
                method_switched: false,
                emergency: false,
                quality: Some(quality),
            })
        } else {
            // Hand off to the emergency backstop via the normal cascade
            Err(TranslationError::QualityRejected {
                overall: quality.overall,
                violations: quality.violations,
            })
        }
    }

    /// Branch by assessed system health
    async fn run_degraded(
        &self,
        request: &TranslationRequest,
    ) -> Result<StrategyOutput, TranslationError> {
        match self.health.assess() {
            HealthLevel::Critical => {
                tracing::warn!(request = %request.id, "system critical, degrading to emergency content");
                Ok(Self::emergency_output(request))
            }
            HealthLevel::Stressed => {
                if let Some(source) = &self.degraded_source {
                    if let Some(cached) = source.lookup(request) {
                        tracing::info!(request = %request.id, "degraded to cached result reuse");
                        return Ok(StrategyOutput {
                            text: cached.text,
                            confidence: cached.confidence,
                            action: "degraded_cached_reuse".to_string(),
                            method: None,
                            method_switched: false,
                            emergency: false,
                            quality: Some(cached.quality),
                        });
                    }
                }
                self.produce_cheaper(request).await
            }
            HealthLevel::Healthy => self.produce_cheaper(request).await,
        }
    }

    /// Produce with the configured cheaper method and re-validate
    async fn produce_cheaper(
        &self,
        request: &TranslationRequest,
    ) -> Result<StrategyOutput, TranslationError> {
        let target = &request.languages.target;
        let method = self.config.degraded_method;
        let attempt = self.producer.produce(&request.text, target, method).await?;
        let quality = self.gate.validate(&attempt.text, target).await?;

        if self.config.admission.admits(&quality) {
            Ok(StrategyOutput {
                text: attempt.text,
                confidence: attempt.confidence,
                action: "degraded_cheaper_method".to_string(),
                method: Some(method),
                method_switched: true,
                emergency: false,
                quality: Some(quality),
            })
        } else {
            Err(TranslationError::QualityRejected {
                overall: quality.overall,
                violations: quality.violations,
            })
        }
    }

    /// The backstop output; pure construction, no collaborator calls
    fn emergency_output(request: &TranslationRequest) -> StrategyOutput {
        StrategyOutput {
            text: emergency_text(request),
            confidence: EMERGENCY_CONFIDENCE,
            action: EMERGENCY_ACTION.to_string(),
            method: None,
            method_switched: false,
            emergency: true,
            quality: Some(emergency_quality()),
        }
    }

    /// Terminal emergency result used when the catalogue is exhausted or
    /// the budget ran out before the emergency strategy was reached
    fn terminal_emergency(
        &self,
        request: &TranslationRequest,
        code: ErrorCode,
        mut attempts: Vec<RecoveryAttempt>,
    ) -> RecoveryResult {
        let output = Self::emergency_output(request);
        self.record_step(
            &mut attempts,
            code,
            StepOutcome {
                strategy_id: EMERGENCY_ACTION.to_string(),
                action: output.action.clone(),
                success: true,
                timed_out: false,
                duration: Duration::ZERO,
                error: None,
                timestamp: Utc::now(),
            },
        );
        self.stats
            .emergency_terminations
            .fetch_add(1, Ordering::Relaxed);

        RecoveryResult {
            success: true,
            text: output.text,
            confidence: output.confidence,
            action: output.action,
            method: output.method,
            method_switched: output.method_switched,
            emergency: output.emergency,
            quality: output.quality,
            attempts,
        }
    }

    /// Append the log record and report the outcome
    fn record_step(&self, attempts: &mut Vec<RecoveryAttempt>, code: ErrorCode, step: StepOutcome) {
        self.stats
            .record_execution(&step.strategy_id, step.success, step.timed_out, step.duration);
        self.telemetry
            .track_error_recovery(code, &step.action, step.success);
        self.escalation
            .record_recovery(code, &step.action, step.success);
        attempts.push(RecoveryAttempt {
            strategy_id: step.strategy_id,
            action: step.action,
            timestamp: step.timestamp,
            success: step.success,
            duration: step.duration,
            error: step.error,
        });
    }
}

/// Stronger input normalization for the enhanced retry
///
/// Collapses whitespace, strips control characters, and folds typographic
/// quotes and dashes that commonly derail producers on scanned legal text.
#[must_use]
pub fn enhance_input(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let mapped = match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{00A0}' => ' ',
            c if c.is_control() => ' ',
            c => c,
        };
        out.push(mapped);
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
