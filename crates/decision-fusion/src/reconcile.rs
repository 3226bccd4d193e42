use analysis_core::{present_confidence, present_label, AuthoritativeDecision, Recommendation};

use crate::models::{ConfidenceDifference, Reconciliation};

/// Compare the engine's decision with the upstream one.
///
/// Returns `None` when the upstream decision has no recommendation label.
pub fn reconcile(
    engine_recommendation: Recommendation,
    engine_score: f64,
    authoritative: &AuthoritativeDecision,
    tolerance: f64,
) -> Option<Reconciliation> {
    let label = present_label(authoritative.final_recommendation.as_deref())?;

    let normalized = label.trim().to_uppercase();
    let matches = normalized == engine_recommendation.as_str();
    let direction_agrees = Recommendation::from_label(&normalized) == engine_recommendation;

    let confidence = present_confidence(authoritative.final_confidence)
        .map(|upstream| calculate_difference(engine_score, upstream, tolerance));

    if !matches {
        tracing::warn!(
            "Fused recommendation {} disagrees with authoritative '{}' (direction agrees: {})",
            engine_recommendation,
            label,
            direction_agrees
        );
    }

    Some(Reconciliation {
        engine_recommendation,
        authoritative_recommendation: label.to_string(),
        matches,
        direction_agrees,
        confidence,
    })
}

fn calculate_difference(engine_value: f64, authoritative_value: f64, tolerance: f64) -> ConfidenceDifference {
    let absolute_difference = (engine_value - authoritative_value).abs();

    ConfidenceDifference {
        engine_value,
        authoritative_value,
        absolute_difference,
        within_tolerance: absolute_difference <= tolerance,
    }
}
