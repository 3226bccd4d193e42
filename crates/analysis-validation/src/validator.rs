use analysis_core::{
    present_confidence, present_label, AnalysisError, AnalysisLayer, AuthoritativeDecision,
    CompositeAnalysisRecord, EnsembleLayer, LayerKind, RuleBasedLayer, StructurePhaseLayer,
};
use serde_json::Value;

use crate::report::{FindingKind, ValidationReport};

/// Layers checked through the generic mapping, in reporting order
const GENERIC_LAYERS: [LayerKind; 3] = [
    LayerKind::Technical,
    LayerKind::SimpleAi,
    LayerKind::AdvancedAi,
];

/// Valid confidence domain, in percent
const CONFIDENCE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Checks that every analysis layer produced a structurally complete result.
///
/// Missing optional data never fails the call; it is reported as an issue
/// (invalidates the record) or a warning (partial results, still displayable).
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordValidator;

impl RecordValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a typed record. `None` means no analysis data was produced.
    pub fn validate(&self, record: Option<&CompositeAnalysisRecord>) -> ValidationReport {
        let mut report = ValidationReport::new();

        let Some(record) = record else {
            report.issue(FindingKind::MissingData, None, "no analysis data".to_string());
            return report;
        };

        match &record.authoritative_decision {
            Some(decision) => check_decision(decision, &mut report),
            None => report.issue(
                FindingKind::MissingData,
                None,
                "authoritative decision is missing".to_string(),
            ),
        }

        if record.layers.is_some() {
            for kind in GENERIC_LAYERS {
                match record.layer(kind) {
                    Some(AnalysisLayer::Technical(technical)) => {
                        check_technical(technical, &mut report)
                    }
                    Some(AnalysisLayer::SimpleAi(simple)) => {
                        check_rule_based(LayerKind::SimpleAi, simple, &mut report)
                    }
                    Some(AnalysisLayer::AdvancedAi(advanced)) => {
                        check_ensemble(advanced, &mut report)
                    }
                    _ => report.warning(
                        FindingKind::MissingData,
                        Some(kind),
                        format!("{} layer is missing", kind.display_name()),
                    ),
                }
            }
        } else {
            report.issue(
                FindingKind::MissingData,
                None,
                "all analysis layers are missing".to_string(),
            );
        }

        match &record.structure_phase {
            Some(phase) => check_structure_phase(phase, &mut report),
            None => report.warning(
                FindingKind::MissingData,
                Some(LayerKind::StructurePhase),
                "structure phase analysis is missing or disabled".to_string(),
            ),
        }

        tracing::debug!(
            "Validated analysis record: {} issues, {} warnings",
            report.issues.len(),
            report.warnings.len()
        );

        report
    }

    /// Validate a raw JSON record. `null` is reported as missing data; any
    /// other non-object value is rejected as an invalid argument.
    pub fn validate_value(&self, value: Value) -> Result<ValidationReport, AnalysisError> {
        if value.is_null() {
            return Ok(self.validate(None));
        }
        let record = CompositeAnalysisRecord::from_value(value)?;
        Ok(self.validate(Some(&record)))
    }
}

/// Validate with the default validator.
pub fn validate(record: Option<&CompositeAnalysisRecord>) -> ValidationReport {
    RecordValidator::new().validate(record)
}

fn check_decision(decision: &AuthoritativeDecision, report: &mut ValidationReport) {
    if present_label(decision.final_recommendation.as_deref()).is_none() {
        report.issue(
            FindingKind::MissingData,
            None,
            "authoritative decision: final recommendation is missing".to_string(),
        );
    }

    match present_confidence(decision.final_confidence) {
        None => report.issue(
            FindingKind::MissingData,
            None,
            "authoritative decision: final confidence is missing".to_string(),
        ),
        Some(confidence) if !CONFIDENCE_RANGE.contains(&confidence) => report.issue(
            FindingKind::OutOfRangeValue,
            None,
            format!(
                "authoritative decision: final confidence {} is outside [0, 100]",
                confidence
            ),
        ),
        Some(_) => {}
    }

    if decision.risk_level.is_none() {
        report.warning(
            FindingKind::MissingData,
            None,
            "authoritative decision: risk level is missing".to_string(),
        );
    }
}

fn check_technical(technical: &RuleBasedLayer, report: &mut ValidationReport) {
    check_rule_based(LayerKind::Technical, technical, report);
    if technical.reasoning.as_deref().map_or(true, str::is_empty) {
        report.warning(
            FindingKind::MissingData,
            Some(LayerKind::Technical),
            "technical analysis: reasoning is missing".to_string(),
        );
    }
}

fn check_ensemble(advanced: &EnsembleLayer, report: &mut ValidationReport) {
    match &advanced.ensemble_prediction {
        Some(prediction) => check_fields(
            LayerKind::AdvancedAi,
            prediction.final_decision.as_deref(),
            prediction.confidence,
            "final decision",
            report,
        ),
        None => report.issue(
            FindingKind::MissingData,
            Some(LayerKind::AdvancedAi),
            "advanced AI: ensemble prediction is missing".to_string(),
        ),
    }
}

fn check_rule_based(kind: LayerKind, layer: &RuleBasedLayer, report: &mut ValidationReport) {
    check_fields(
        kind,
        layer.recommendation.as_deref(),
        layer.confidence,
        "recommendation",
        report,
    );
}

fn check_structure_phase(phase: &StructurePhaseLayer, report: &mut ValidationReport) {
    let kind = LayerKind::StructurePhase;

    if phase.current_phase.as_deref().map_or(true, str::is_empty) {
        report.issue(
            FindingKind::MissingData,
            Some(kind),
            "structure phase: current phase is missing".to_string(),
        );
    }

    check_fields(
        kind,
        phase.recommended_action.as_deref(),
        phase.confidence,
        "recommended action",
        report,
    );

    if let Some(error) = &phase.error {
        report.warning(
            FindingKind::MissingData,
            Some(kind),
            format!("structure phase: upstream reported an error: {}", error),
        );
    }
}

fn check_fields(
    kind: LayerKind,
    label: Option<&str>,
    confidence: Option<f64>,
    label_name: &str,
    report: &mut ValidationReport,
) {
    if present_label(label).is_none() {
        report.issue(
            FindingKind::MissingData,
            Some(kind),
            format!("{}: {} is missing", kind.display_name(), label_name),
        );
    }

    match present_confidence(confidence) {
        None => report.issue(
            FindingKind::MissingData,
            Some(kind),
            format!("{}: confidence is missing", kind.display_name()),
        ),
        Some(value) if !CONFIDENCE_RANGE.contains(&value) => report.issue(
            FindingKind::OutOfRangeValue,
            Some(kind),
            format!("{}: confidence {} is outside [0, 100]", kind.display_name(), value),
        ),
        Some(_) => {}
    }
}
