//! Lenient decoding of composite records from the pipeline's JSON.
//!
//! Partial results are the normal case: a layer whose model is untrained
//! may be missing, null, or carry fields of the wrong type. None of that is
//! an error here. A wrongly typed field is read as absent and left for the
//! validator to report. Only a top-level value that is not an object is
//! rejected.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    AnalysisError, AnalysisLayer, AuthoritativeDecision, CompositeAnalysisRecord, EnsembleLayer,
    EnsemblePrediction, LayerKind, RiskLevel, RuleBasedLayer, ScoredLayer, StructurePhaseLayer,
};

const LAYERS_KEYS: [&str; 2] = ["layers", "analysis_layers"];
const STRUCTURE_PHASE_KEYS: [&str; 2] = ["structure_phase", "wyckoff_analysis"];
const DECISION_KEYS: [&str; 2] = ["authoritative_decision", "ultimate_decision"];

impl CompositeAnalysisRecord {
    /// Decode a record from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Decode a record from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, AnalysisError> {
        let root = match value {
            Value::Object(root) => root,
            other => {
                return Err(AnalysisError::InvalidArgument(format!(
                    "expected an analysis record object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut layers = first_present(&root, &LAYERS_KEYS).map(decode_layers);

        let mut structure_phase =
            first_present(&root, &STRUCTURE_PHASE_KEYS).map(decode_structure_phase);

        // A structure-phase entry inside the mapping only fills the dedicated slot
        // when the record has no top-level one.
        if let Some(entries) = layers.as_mut() {
            if let Some(pos) = entries
                .iter()
                .position(|l| matches!(l, AnalysisLayer::StructurePhase(_)))
            {
                if let AnalysisLayer::StructurePhase(inner) = entries.remove(pos) {
                    if structure_phase.is_none() {
                        structure_phase = Some(inner);
                    } else {
                        tracing::debug!("Ignoring structure phase inside layer mapping, top-level entry wins");
                    }
                }
            }
        }

        let authoritative_decision = first_present(&root, &DECISION_KEYS).map(decode_decision);

        Ok(CompositeAnalysisRecord {
            symbol: root.get("symbol").and_then(label),
            current_price: root.get("current_price").and_then(number),
            timestamp: root.get("timestamp").and_then(timestamp),
            layers,
            structure_phase,
            authoritative_decision,
        })
    }
}

/// First key whose value is present and not null.
fn first_present<'a>(root: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| root.get(*key))
        .find(|value| !value.is_null())
}

fn decode_layers(value: &Value) -> Vec<AnalysisLayer> {
    let Some(entries) = value.as_object() else {
        tracing::debug!("Layer mapping is a {}, reading it as empty", json_type_name(value));
        return Vec::new();
    };

    let mut layers: Vec<AnalysisLayer> = Vec::with_capacity(entries.len());
    for (key, body) in entries {
        let Some(kind) = LayerKind::from_key(key) else {
            tracing::debug!("Ignoring unknown analysis layer '{}'", key);
            continue;
        };
        if body.is_null() {
            continue;
        }
        if layers.iter().any(|l| l.kind() == kind) {
            tracing::debug!("Ignoring duplicate entry '{}' for layer {}", key, kind);
            continue;
        }
        layers.push(decode_layer(kind, body));
    }
    layers
}

fn decode_layer(kind: LayerKind, body: &Value) -> AnalysisLayer {
    match kind {
        LayerKind::Technical => AnalysisLayer::Technical(decode_rule_based(body)),
        LayerKind::SimpleAi => AnalysisLayer::SimpleAi(decode_rule_based(body)),
        LayerKind::AdvancedAi => AnalysisLayer::AdvancedAi(EnsembleLayer {
            ensemble_prediction: body
                .get("ensemble_prediction")
                .filter(|p| !p.is_null())
                .map(|p| EnsemblePrediction {
                    final_decision: p.get("final_decision").and_then(label),
                    confidence: p.get("confidence").and_then(number),
                }),
        }),
        LayerKind::StructurePhase => AnalysisLayer::StructurePhase(decode_structure_phase(body)),
    }
}

fn decode_rule_based(body: &Value) -> RuleBasedLayer {
    RuleBasedLayer {
        recommendation: body.get("recommendation").and_then(label),
        confidence: body.get("confidence").and_then(number),
        reasoning: body.get("reasoning").and_then(text),
    }
}

fn decode_structure_phase(body: &Value) -> StructurePhaseLayer {
    StructurePhaseLayer {
        current_phase: body.get("current_phase").and_then(text),
        recommended_action: body.get("recommended_action").and_then(label),
        confidence: body.get("confidence").and_then(number),
        phase_strength: body.get("phase_strength").and_then(number),
        interpretation: body.get("interpretation").and_then(text),
        error: body.get("error").and_then(text),
    }
}

fn decode_decision(body: &Value) -> AuthoritativeDecision {
    let risk_level = body.get("risk_level").and_then(label).and_then(|raw| {
        let level = RiskLevel::from_label(&raw);
        if level.is_none() {
            tracing::debug!("Unrecognized risk level '{}'", raw);
        }
        level
    });

    AuthoritativeDecision {
        final_recommendation: body.get("final_recommendation").and_then(label),
        final_confidence: body.get("final_confidence").and_then(number),
        risk_level,
        reasoning: body.get("reasoning").and_then(text),
        agreement_level: body.get("agreement_level").and_then(label),
        strength: body.get("strength").and_then(label),
    }
}

/// Recommendation-style labels must be strings.
fn label(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Free text: strings as-is, other non-null scalars and structures rendered
/// as JSON so their presence is still visible.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numbers, or strings holding a number.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S UTC")
                .ok()
                .map(|naive| naive.and_utc())
        });
    if parsed.is_none() {
        tracing::debug!("Unparseable record timestamp '{}'", raw);
    }
    parsed
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
