//! Property tests for the fusion engine.
//!
//! Uses proptest to verify:
//! 1. Idempotence: fusing the same record twice gives identical reports
//! 2. Monotonicity: raising one layer's confidence never moves the raw
//!    score against that layer's own direction
//! 3. Dead zone: raw scores within the thresholds always map to HOLD
//! 4. Empty input: no contributing layer means HOLD / 0 / MIXED

use analysis_core::{
    AnalysisLayer, CompositeAnalysisRecord, EnsembleLayer, EnsemblePrediction, Recommendation,
    RuleBasedLayer, StructurePhaseLayer,
};
use decision_fusion::{Consensus, DecisionFusionEngine};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("BUY".to_string()),
        Just("STRONG_BUY".to_string()),
        Just("SELL".to_string()),
        Just("WEAK_SELL".to_string()),
        Just("HOLD".to_string()),
    ]
}

fn arb_confidence() -> impl Strategy<Value = f64> {
    (1.0..=100.0_f64).prop_map(|c| (c * 10.0).round() / 10.0)
}

fn arb_signal() -> impl Strategy<Value = Option<(String, f64)>> {
    prop::option::of((arb_label(), arb_confidence()))
}

fn build_record(
    technical: Option<(String, f64)>,
    simple: Option<(String, f64)>,
    advanced: Option<(String, f64)>,
    phase: Option<(String, f64)>,
) -> CompositeAnalysisRecord {
    let mut layers = Vec::new();
    if let Some((label, confidence)) = technical {
        layers.push(AnalysisLayer::Technical(RuleBasedLayer {
            recommendation: Some(label),
            confidence: Some(confidence),
            reasoning: None,
        }));
    }
    if let Some((label, confidence)) = simple {
        layers.push(AnalysisLayer::SimpleAi(RuleBasedLayer {
            recommendation: Some(label),
            confidence: Some(confidence),
            reasoning: None,
        }));
    }
    if let Some((label, confidence)) = advanced {
        layers.push(AnalysisLayer::AdvancedAi(EnsembleLayer {
            ensemble_prediction: Some(EnsemblePrediction {
                final_decision: Some(label),
                confidence: Some(confidence),
            }),
        }));
    }

    CompositeAnalysisRecord {
        layers: Some(layers),
        structure_phase: phase.map(|(label, confidence)| StructurePhaseLayer {
            current_phase: Some("ACCUMULATION".to_string()),
            recommended_action: Some(label),
            confidence: Some(confidence),
            ..Default::default()
        }),
        ..Default::default()
    }
}

// ── 1. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn fuse_is_idempotent(
        t in arb_signal(),
        s in arb_signal(),
        a in arb_signal(),
        p in arb_signal(),
    ) {
        let engine = DecisionFusionEngine::default();
        let record = build_record(t, s, a, p);
        let before = record.clone();

        let first = engine.fuse(&record);
        let second = engine.fuse(&record);

        prop_assert_eq!(first, second);
        prop_assert_eq!(record, before);
    }
}

// ── 2. Monotonicity ──────────────────────────────────────────────────

proptest! {
    /// More confidence on the technical layer never moves the raw score against its label.
    #[test]
    fn raising_confidence_follows_layer_direction(
        label in arb_label(),
        low in arb_confidence(),
        bump in 0.0..50.0_f64,
        s in arb_signal(),
        a in arb_signal(),
        p in arb_signal(),
    ) {
        let engine = DecisionFusionEngine::default();
        let high = low + bump;
        let direction = Recommendation::from_label(&label).score() as f64;

        let low_report = engine.fuse(&build_record(
            Some((label.clone(), low)), s.clone(), a.clone(), p.clone(),
        ));
        let high_report = engine.fuse(&build_record(
            Some((label, high)), s, a, p,
        ));

        let delta = (high_report.raw_score - low_report.raw_score) * direction;
        prop_assert!(delta >= -1e-9, "raw score moved against the layer: {}", delta);

        if direction > 0.0 && low_report.raw_score >= 0.0 {
            prop_assert!(high_report.raw_score >= -1e-9);
        }
        if direction < 0.0 && low_report.raw_score <= 0.0 {
            prop_assert!(high_report.raw_score <= 1e-9);
        }
    }
}

// ── 3. Dead zone ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn recommendation_respects_thresholds(
        t in arb_signal(),
        s in arb_signal(),
        a in arb_signal(),
        p in arb_signal(),
    ) {
        let engine = DecisionFusionEngine::default();
        let report = engine.fuse(&build_record(t, s, a, p));

        let expected = if report.raw_score > 20.0 {
            Recommendation::Buy
        } else if report.raw_score < -20.0 {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        };
        prop_assert_eq!(report.final_recommendation, expected);
        prop_assert!((report.final_score - report.raw_score.abs()).abs() < 1e-12);
        prop_assert_eq!(report.votes.total() as usize, report.contributions.len());
    }
}

// ── 4. Empty input ───────────────────────────────────────────────────

proptest! {
    /// Layers present but carrying zero confidence contribute nothing.
    #[test]
    fn zero_confidence_layers_are_ignored(label in arb_label()) {
        let engine = DecisionFusionEngine::default();
        let record = build_record(
            Some((label.clone(), 0.0)),
            Some((label.clone(), 0.0)),
            Some((label.clone(), 0.0)),
            Some((label, 0.0)),
        );
        let report = engine.fuse(&record);

        prop_assert_eq!(report.final_score, 0.0);
        prop_assert_eq!(report.final_recommendation, Recommendation::Hold);
        prop_assert_eq!(report.consensus, Consensus::Mixed);
        prop_assert!(report.contributions.is_empty());
    }
}

#[test]
fn absent_layer_mapping_is_hold() {
    let engine = DecisionFusionEngine::default();
    let report = engine.fuse(&CompositeAnalysisRecord {
        layers: None,
        ..Default::default()
    });

    assert_eq!(report.final_score, 0.0);
    assert_eq!(report.final_recommendation, Recommendation::Hold);
    assert_eq!(report.consensus, Consensus::Mixed);

    let with_phase = build_record(None, None, None, Some(("BUY".to_string(), 100.0)));
    let report = engine.fuse(&CompositeAnalysisRecord {
        layers: None,
        ..with_phase
    });

    assert_eq!(report.final_score, 0.0);
    assert_eq!(report.final_recommendation, Recommendation::Hold);
    assert_eq!(report.consensus, Consensus::Mixed);
    assert!(report.contributions.is_empty());
}
