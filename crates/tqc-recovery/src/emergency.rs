//! Emergency content
//!
//! The fixed, pre-validated backstop every cascade eventually reaches.
//! Templates are reviewed legal-notice text with guaranteed purity; the
//! response is low-confidence and explicitly flagged, and producing it
//! cannot fail.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tqc_domain::{ContentType, QualityReport, TranslationRequest};

/// Confidence attached to emergency content
pub const EMERGENCY_CONFIDENCE: f64 = 0.3;

static TEMPLATES: Lazy<HashMap<ContentType, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            ContentType::Contract,
            "A certified translation of this contract could not be produced \
             automatically. The source text has been preserved unchanged and \
             routed to professional review. Do not execute this document on \
             the basis of this notice.",
        ),
        (
            ContentType::CourtFiling,
            "A certified translation of this court filing could not be \
             produced automatically. The filing has been preserved unchanged \
             and routed to professional review before any submission.",
        ),
        (
            ContentType::Statute,
            "A certified translation of this statutory text could not be \
             produced automatically. Consult the authoritative source-language \
             text; this notice carries no legal effect.",
        ),
        (
            ContentType::Correspondence,
            "An assured translation of this correspondence could not be \
             produced automatically. The original message has been preserved \
             and routed to professional review.",
        ),
        (
            ContentType::General,
            "An assured translation of this document could not be produced \
             automatically. The source text has been preserved unchanged and \
             routed to professional review.",
        ),
    ])
});

/// The emergency text for a request's content category
#[must_use]
pub fn emergency_text(request: &TranslationRequest) -> String {
    TEMPLATES
        .get(&request.content_type)
        .copied()
        .unwrap_or_else(|| {
            TEMPLATES
                .get(&ContentType::General)
                .copied()
                .unwrap_or_default()
        })
        .to_string()
}

/// The quality report attached to emergency content
///
/// Templates are pre-validated; the report is fixed, not recomputed.
#[must_use]
pub fn emergency_quality() -> QualityReport {
    QualityReport::perfect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tqc_domain::LanguagePair;

    fn request(content_type: ContentType) -> TranslationRequest {
        TranslationRequest::new("text", LanguagePair::new("en", "de"), content_type)
    }

    #[test]
    fn every_content_type_has_a_template() {
        for content_type in [
            ContentType::Contract,
            ContentType::CourtFiling,
            ContentType::Statute,
            ContentType::Correspondence,
            ContentType::General,
        ] {
            let text = emergency_text(&request(content_type));
            assert!(!text.is_empty());
        }
    }

    #[test]
    fn contract_notice_warns_against_execution() {
        let text = emergency_text(&request(ContentType::Contract));
        assert!(text.contains("Do not execute"));
    }

    #[test]
    fn emergency_quality_is_prevalidated_pure() {
        let quality = emergency_quality();
        assert!(quality.passes_zero_tolerance);
        assert_eq!(quality.overall, 100.0);
    }
}
