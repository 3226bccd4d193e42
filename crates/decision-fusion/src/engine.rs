use analysis_core::{AnalysisError, CompositeAnalysisRecord, Recommendation, ScoredLayer};
use serde_json::Value;

use crate::config::FusionConfig;
use crate::models::{AgreementLevel, FusionReport, GradedSignal, LayerContribution, VoteTally};
use crate::reconcile::reconcile;

/// Combines independent analysis layers into one weighted recommendation.
///
/// Holds only its validated configuration, so a single engine can be shared
/// across threads and called for any number of records.
#[derive(Debug, Clone, Default)]
pub struct DecisionFusionEngine {
    config: FusionConfig,
}

impl DecisionFusionEngine {
    pub fn new(config: FusionConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn fuse(&self, record: &CompositeAnalysisRecord) -> FusionReport {
        fuse(record, &self.config)
    }

    /// Fuse a raw JSON record. `null` behaves like a record with no layers.
    pub fn fuse_value(&self, value: Value) -> Result<FusionReport, AnalysisError> {
        if value.is_null() {
            return Ok(self.fuse(&CompositeAnalysisRecord::default()));
        }
        let record = CompositeAnalysisRecord::from_value(value)?;
        Ok(self.fuse(&record))
    }
}

/// Fuse a record with the given configuration.
///
/// The configuration is used as-is; call [`FusionConfig::validate`] first (or
/// go through [`DecisionFusionEngine::new`]) when it comes from outside.
pub fn fuse(record: &CompositeAnalysisRecord, config: &FusionConfig) -> FusionReport {
    let mut votes = VoteTally::default();
    let mut contributions: Vec<LayerContribution> = Vec::new();
    let mut total_weight = 0.0;
    let mut weighted_score = 0.0;

    // Without a layer mapping there is nothing to fuse, structure phase included.
    let layers = match record.layers {
        Some(_) => Some(record.scored_layers()),
        None => {
            tracing::debug!("Record has no layer mapping; reporting HOLD");
            None
        }
    };

    // Record order, no sorting: accumulation order is part of the result.
    for layer in layers.into_iter().flatten() {
        let kind = layer.kind();
        let Some(signal) = layer.signal() else {
            tracing::debug!("Skipping {} layer: no recommendation or zero confidence", kind);
            continue;
        };

        let weight = config.weights.weight(kind);
        let direction = Recommendation::from_label(signal.label);
        let score = direction.score();
        votes.record(direction);

        // Confidence is a percentage; confidences outside [0, 100] are not clamped.
        let contribution = (score as f64 * signal.confidence * weight) / 100.0;
        total_weight += weight;
        weighted_score += contribution;

        contributions.push(LayerContribution {
            layer_name: kind,
            recommendation: signal.label.to_string(),
            confidence: signal.confidence,
            weight,
            score,
            contribution,
        });
    }

    let raw_score = if total_weight > 0.0 {
        (weighted_score / total_weight) * 100.0
    } else {
        0.0
    };
    let final_score = raw_score.abs();
    let final_recommendation = config.recommendation_for(raw_score);
    let consensus = votes.consensus();

    let directional = contributions.iter().filter(|c| c.score != 0).count() as u32;
    let agreement_level = AgreementLevel::from_counts(votes.total(), directional);
    let graded_signal = GradedSignal::from_points(weighted_score * 100.0);

    let reconciliation = record.authoritative_decision.as_ref().and_then(|decision| {
        reconcile(
            final_recommendation,
            final_score,
            decision,
            config.confidence_tolerance,
        )
    });

    tracing::info!(
        "Fused {} layers: score {:.1} ({:+.1} raw) -> {} (consensus {:?}, votes {}/{}/{})",
        contributions.len(),
        final_score,
        raw_score,
        final_recommendation,
        consensus,
        votes.buy,
        votes.sell,
        votes.hold
    );

    FusionReport {
        final_score,
        raw_score,
        final_recommendation,
        votes,
        consensus,
        contributions,
        total_weight,
        weighted_score,
        agreement_level,
        graded_signal,
        strength: graded_signal.strength(),
        matches_authoritative: reconciliation.as_ref().map(|r| r.matches),
        reconciliation,
    }
}
