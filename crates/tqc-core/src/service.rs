//! Translation service orchestrator
//!
//! Composes the cache, the recovery engine, the escalation engine, and
//! the external producer/quality-gate collaborators to answer `handle`.
//! `handle` never fails: cache hit, validated production, recovered
//! result, or explicitly flagged emergency content, in that order of
//! preference. Per-request steps are strictly sequential; across requests
//! everything runs concurrently with no ordering guarantee.

use crate::config::CoreConfig;
use crate::outcome::TranslationOutcome;
use crate::state::{CancelToken, RequestJourney, RequestState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tqc_cache::{CacheKey, CacheStats, CachedTranslation, OptimizeReport, QualityGatedCache};
use tqc_domain::{
    ErrorContext, IntentSynthesizer, Producer, QualityGate, QualityReport, Severity, Telemetry,
    TranslationAttempt, TranslationError, TranslationMethod, TranslationRequest, UserImpact,
};
use tqc_escalation::{
    Condition, EscalationAction, EscalationEngine, EscalationEvent, EscalationMetrics,
    EscalationRule, Notifier,
};
use tqc_recovery::{
    emergency_text, DegradedResult, DegradedResultSource, RecoveryEngine, RecoveryStatistics,
    EMERGENCY_CONFIDENCE,
};

/// Id of the built-in sustained-infrastructure escalation rule
pub const SUSTAINED_INFRA_RULE: &str = "sustained-infrastructure-errors";

/// Degraded-reuse source backed by the quality-gated cache's stale reads
struct StaleCacheSource {
    cache: Arc<QualityGatedCache>,
}

impl DegradedResultSource for StaleCacheSource {
    fn lookup(&self, request: &TranslationRequest) -> Option<DegradedResult> {
        let key = CacheKey::compute(&request.text, &request.languages, request.content_type);
        self.cache.get_stale(&key).map(|cached| DegradedResult {
            text: cached.text,
            confidence: cached.confidence,
            quality: cached.quality,
        })
    }
}

/// The translation core's public facade
pub struct TranslationService {
    config: CoreConfig,
    producer: Arc<dyn Producer>,
    gate: Arc<dyn QualityGate>,
    telemetry: Arc<dyn Telemetry>,
    cache: Arc<QualityGatedCache>,
    escalation: Arc<EscalationEngine>,
    recovery: RecoveryEngine,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TranslationService {
    /// Assemble the core around external collaborators
    ///
    /// Registers the built-in sustained-infrastructure escalation rule;
    /// further rules can be added with [`register_escalation_rule`].
    ///
    /// [`register_escalation_rule`]: TranslationService::register_escalation_rule
    #[must_use]
    pub fn new(
        config: CoreConfig,
        producer: Arc<dyn Producer>,
        gate: Arc<dyn QualityGate>,
        synthesizer: Arc<dyn IntentSynthesizer>,
        telemetry: Arc<dyn Telemetry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let config = config.sanitized();
        let cache = Arc::new(QualityGatedCache::new(config.cache_config()));
        let escalation = Arc::new(EscalationEngine::new(config.escalation_config(), notifier));

        escalation.register_rule(
            escalation
                .default_rule(
                    SUSTAINED_INFRA_RULE,
                    vec![
                        Condition::SeverityEquals(Severity::Critical),
                        Condition::Frequency {
                            window: Duration::from_secs(600),
                            threshold: 10,
                        },
                    ],
                    vec![EscalationAction::LogCritical],
                )
                .with_priority(10)
                .with_description("sustained critical infrastructure failures"),
        );

        let recovery = RecoveryEngine::new(
            Arc::clone(&producer),
            Arc::clone(&gate),
            synthesizer,
            Arc::clone(&telemetry),
            Arc::clone(&escalation),
            config.recovery_config(),
        )
        .with_degraded_source(Arc::new(StaleCacheSource {
            cache: Arc::clone(&cache),
        }));

        Self {
            config,
            producer,
            gate,
            telemetry,
            cache,
            escalation,
            recovery,
        }
    }

    /// Handle one request; never fails
    pub async fn handle(&self, request: &TranslationRequest) -> TranslationOutcome {
        self.handle_cancellable(request, &CancelToken::new()).await
    }

    /// Handle one request with a cooperative cancellation token
    ///
    /// The token is checked at suspension boundaries only; a cancelled
    /// request still receives a structured outcome.
    pub async fn handle_cancellable(
        &self,
        request: &TranslationRequest,
        cancel: &CancelToken,
    ) -> TranslationOutcome {
        let started = Instant::now();
        let mut journey = RequestJourney::new(request.id);
        tracing::info!(
            request = %request.id,
            languages = %request.languages,
            content_type = %request.content_type,
            "handling translation request"
        );

        journey.advance(RequestState::CacheCheck);
        let key = CacheKey::compute(&request.text, &request.languages, request.content_type);
        if let Some(cached) = self.cache.get(&key) {
            journey.advance(RequestState::Returned);
            tracing::debug!(request = %request.id, "served from cache");
            return TranslationOutcome {
                request_id: request.id,
                success: true,
                text: cached.text,
                confidence: cached.confidence,
                action: "cache_hit".to_string(),
                method: Some(cached.method),
                cache_hit: true,
                method_switched: false,
                emergency: false,
                quality: Some(cached.quality),
                processing_time: started.elapsed(),
            };
        }

        if cancel.is_cancelled() {
            journey.advance(RequestState::Returned);
            return self.cancelled_outcome(request, started);
        }

        journey.advance(RequestState::Producing);
        let error = match self.produce_and_validate(request, &mut journey).await {
            Ok((attempt, quality)) => {
                journey.advance(RequestState::Admitted);
                let admitted = self.cache.set(
                    key,
                    CachedTranslation::new(
                        attempt.text.clone(),
                        attempt.method,
                        attempt.confidence,
                        quality.clone(),
                    ),
                    request.languages.clone(),
                    request.content_type,
                    None,
                );
                journey.advance(RequestState::Returned);
                tracing::info!(request = %request.id, admitted, "translation validated");
                return TranslationOutcome {
                    request_id: request.id,
                    success: true,
                    text: attempt.text,
                    confidence: attempt.confidence,
                    action: "translated".to_string(),
                    method: Some(attempt.method),
                    cache_hit: false,
                    method_switched: false,
                    emergency: false,
                    quality: Some(quality),
                    processing_time: started.elapsed(),
                };
            }
            Err(error) => error,
        };

        self.report_failure(request, &error).await;

        if cancel.is_cancelled() {
            journey.advance(RequestState::Returned);
            return self.cancelled_outcome(request, started);
        }

        journey.advance(RequestState::Recovering);
        let recovered = self
            .recovery
            .recover(request, &error, TranslationMethod::Primary, Vec::new())
            .await;

        // The admission invariant applies uniformly: recovered results go
        // through the same gate as pipeline results. Emergency notices are
        // responses, not translations, and are never offered.
        if !recovered.emergency {
            if let (Some(quality), Some(method)) = (recovered.quality.clone(), recovered.method) {
                let admitted = self.cache.set(
                    key,
                    CachedTranslation::new(
                        recovered.text.clone(),
                        method,
                        recovered.confidence,
                        quality,
                    ),
                    request.languages.clone(),
                    request.content_type,
                    None,
                );
                tracing::debug!(request = %request.id, admitted, "recovered result offered to cache");
            }
        }

        journey.advance(RequestState::Returned);
        TranslationOutcome {
            request_id: request.id,
            success: recovered.success,
            text: recovered.text,
            confidence: recovered.confidence,
            action: recovered.action,
            method: recovered.method,
            cache_hit: false,
            method_switched: recovered.method_switched,
            emergency: recovered.emergency,
            quality: recovered.quality,
            processing_time: started.elapsed(),
        }
    }

    /// Cache statistics surface
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Recovery statistics surface
    #[must_use]
    pub fn recovery_statistics(&self) -> RecoveryStatistics {
        self.recovery.statistics()
    }

    /// Escalation metrics surface
    #[must_use]
    pub fn escalation_metrics(&self) -> EscalationMetrics {
        self.escalation.metrics()
    }

    /// Retained escalation audit events
    #[must_use]
    pub fn escalation_events(&self) -> Vec<EscalationEvent> {
        self.escalation.events()
    }

    /// Register an additional escalation rule
    pub fn register_escalation_rule(&self, rule: EscalationRule) {
        self.escalation.register_rule(rule);
    }

    /// Run a cache maintenance pass
    pub fn optimize_cache(&self) -> OptimizeReport {
        self.cache.optimize()
    }

    /// Invalidate cached entries whose key matches the pattern
    ///
    /// # Errors
    /// Returns the pattern error for an invalid regex.
    pub fn invalidate_cached(&self, pattern: &str) -> Result<usize, tqc_cache::PatternError> {
        self.cache.invalidate(pattern)
    }

    /// Configuration in effect
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Produce and validate once; any shortfall becomes a typed error for
    /// the recovery cascade
    async fn produce_and_validate(
        &self,
        request: &TranslationRequest,
        journey: &mut RequestJourney,
    ) -> Result<(TranslationAttempt, QualityReport), TranslationError> {
        let attempt = self
            .producer
            .produce(
                &request.text,
                &request.languages.target,
                TranslationMethod::Primary,
            )
            .await?;

        if attempt.confidence < self.config.confidence_floor {
            return Err(TranslationError::LowConfidence {
                confidence: attempt.confidence,
                floor: self.config.confidence_floor,
            });
        }

        journey.advance(RequestState::Validating);
        let quality = self
            .gate
            .validate(&attempt.text, &request.languages.target)
            .await?;

        if self.config.admission_policy().admits(&quality) {
            Ok((attempt, quality))
        } else {
            Err(TranslationError::QualityRejected {
                overall: quality.overall,
                violations: quality.violations,
            })
        }
    }

    /// Report a pipeline failure to telemetry, and to escalation when it
    /// is an infrastructure error
    async fn report_failure(&self, request: &TranslationRequest, error: &TranslationError) {
        let context = ErrorContext::for_request(
            request.id,
            request.languages.clone(),
            request.content_type,
        )
        .with_user_impact(UserImpact::Medium);

        self.telemetry.report_system_error(error, &context);
        if error.is_infrastructure() {
            self.escalation.process_error(error, &context).await;
        }
    }

    /// Structured outcome for a cancelled request
    fn cancelled_outcome(
        &self,
        request: &TranslationRequest,
        started: Instant,
    ) -> TranslationOutcome {
        tracing::info!(request = %request.id, "request cancelled");
        TranslationOutcome {
            request_id: request.id,
            success: false,
            text: emergency_text(request),
            confidence: EMERGENCY_CONFIDENCE,
            action: "cancelled".to_string(),
            method: None,
            cache_hit: false,
            method_switched: false,
            emergency: true,
            quality: None,
            processing_time: started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tqc_domain::{
        ComponentScores, ContentType, LanguagePair, LogTelemetry, MockIntentSynthesizer,
        MockProducer, MockQualityGate,
    };
    use tqc_escalation::LogNotifier;

    fn request() -> TranslationRequest {
        TranslationRequest::new(
            "This agreement is binding.",
            LanguagePair::new("en", "de"),
            ContentType::Contract,
        )
    }

    fn report(overall: f64) -> QualityReport {
        QualityReport::new(overall, ComponentScores::uniform(overall))
    }

    fn service(producer: MockProducer, gate: MockQualityGate) -> TranslationService {
        TranslationService::new(
            CoreConfig::new()
                .with_admission_threshold(85.0)
                .with_zero_tolerance(false),
            Arc::new(producer),
            Arc::new(gate),
            Arc::new(MockIntentSynthesizer::new()),
            Arc::new(LogTelemetry),
            Arc::new(LogNotifier),
        )
    }

    #[tokio::test]
    async fn low_confidence_production_enters_recovery() {
        let mut producer = MockProducer::new();
        producer.expect_produce().returning(|_, _, method| {
            let confidence = if method == TranslationMethod::Primary {
                0.2
            } else {
                0.9
            };
            Ok(TranslationAttempt::new(method, "Vereinbarung", confidence))
        });
        let mut gate = MockQualityGate::new();
        gate.expect_validate().returning(|_, _| Ok(report(100.0)));

        let outcome = service(producer, gate).handle(&request()).await;
        assert!(outcome.success);
        assert!(outcome.method_switched);
        assert_eq!(outcome.action, "retry_with_secondary");
    }

    #[tokio::test]
    async fn cancelled_token_yields_structured_outcome() {
        let service = service(MockProducer::new(), MockQualityGate::new());
        let token = CancelToken::new();
        token.cancel();

        let outcome = service.handle_cancellable(&request(), &token).await;
        assert!(!outcome.success);
        assert!(outcome.emergency);
        assert_eq!(outcome.action, "cancelled");
        assert!(!outcome.text.is_empty());
    }

    #[tokio::test]
    async fn built_in_escalation_rule_is_registered() {
        let service = service(MockProducer::new(), MockQualityGate::new());
        // One rule registered at construction
        assert_eq!(service.escalation_metrics().total_escalations, 0);
        service.register_escalation_rule(EscalationRule::new(
            "extra",
            vec![],
            vec![EscalationAction::LogCritical],
            Duration::from_secs(60),
            1,
        ));
    }
}
