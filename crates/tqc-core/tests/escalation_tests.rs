//! Escalation rate-limit behavior driven through the full pipeline.

use std::sync::Arc;
use tqc_core::prelude::*;
use tqc_core::SUSTAINED_INFRA_RULE;
use tqc_domain::{
    ComponentScores, MockIntentSynthesizer, MockProducer, MockQualityGate, QualityReport,
    TranslationError,
};

fn failing_service() -> TranslationService {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let mut producer = MockProducer::new();
    producer
        .expect_produce()
        .returning(|_, _, _| Err(TranslationError::ServiceUnavailable("engine".to_string())));
    let mut gate = MockQualityGate::new();
    gate.expect_validate().returning(|_, _| {
        Ok(QualityReport::new(70.0, ComponentScores::uniform(70.0)))
    });
    let mut synthesizer = MockIntentSynthesizer::new();
    synthesizer
        .expect_detect_intent()
        .returning(|_| Ok(ContentType::General));
    synthesizer
        .expect_synthesize()
        .returning(|_, _| Ok("hinweis".to_string()));

    TranslationService::new(
        CoreConfig::new(),
        Arc::new(producer),
        Arc::new(gate),
        Arc::new(synthesizer),
        Arc::new(LogTelemetry),
        Arc::new(LogNotifier),
    )
}

fn request(i: usize) -> TranslationRequest {
    TranslationRequest::new(
        format!("Clause {i}."),
        LanguagePair::new("en", "de"),
        ContentType::Contract,
    )
}

#[tokio::test]
async fn sustained_critical_failures_escalate_exactly_once() {
    let service = failing_service();

    // Eleven critical infrastructure errors inside the trailing window
    // satisfy the >10-in-10-minutes rule on the eleventh occurrence.
    for i in 0..11 {
        let outcome = service.handle(&request(i)).await;
        assert!(outcome.is_well_formed());
        assert!(outcome.emergency);
    }

    let metrics = service.escalation_metrics();
    assert_eq!(metrics.total_escalations, 1);
    assert_eq!(
        metrics.escalations_by_rule.get(SUSTAINED_INFRA_RULE),
        Some(&1)
    );
    assert_eq!(metrics.escalations_by_severity.get("critical"), Some(&1));

    // A twelfth occurrence inside the cooldown window fires nothing
    service.handle(&request(11)).await;
    let metrics = service.escalation_metrics();
    assert_eq!(metrics.total_escalations, 1);
    assert!(metrics.skipped_cooldown >= 1);

    let events = service.escalation_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rule_id, SUSTAINED_INFRA_RULE);
    assert!(events[0].actions.iter().all(|a| a.success));
}

#[tokio::test]
async fn recovery_outcomes_reach_the_escalation_intake() {
    let service = failing_service();
    service.handle(&request(0)).await;

    let metrics = service.escalation_metrics();
    // Every cascade step for the infrastructure failure was reported
    let reported: u64 = metrics
        .recovery_reports
        .values()
        .map(|tally| tally.successes + tally.failures)
        .sum();
    assert!(reported >= 1);
    assert_eq!(metrics.errors_processed, 1);
}
