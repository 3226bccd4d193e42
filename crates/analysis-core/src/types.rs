use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::traits::ScoredLayer;

/// Normalized direction of a recommendation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// Classify an open-ended label. Anything mentioning BUY is bullish,
    /// then anything mentioning SELL is bearish, everything else is neutral.
    /// Matching is case-sensitive: `"buy"` is neutral.
    pub fn from_label(label: &str) -> Self {
        if label.contains("BUY") {
            Recommendation::Buy
        } else if label.contains("SELL") {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }

    /// Signed score: +1 / -1 / 0
    pub fn score(&self) -> i32 {
        match self {
            Recommendation::Buy => 1,
            Recommendation::Sell => -1,
            Recommendation::Hold => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Sell => "SELL",
            Recommendation::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The independent analysis layers that feed a composite record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Technical,
    SimpleAi,
    AdvancedAi,
    StructurePhase,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Technical,
        LayerKind::SimpleAi,
        LayerKind::AdvancedAi,
        LayerKind::StructurePhase,
    ];

    /// Canonical key used in records and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Technical => "technical",
            LayerKind::SimpleAi => "simple_ai",
            LayerKind::AdvancedAi => "advanced_ai",
            LayerKind::StructurePhase => "structure_phase",
        }
    }

    /// Human-readable name used in validation messages
    pub fn display_name(&self) -> &'static str {
        match self {
            LayerKind::Technical => "technical analysis",
            LayerKind::SimpleAi => "simple AI",
            LayerKind::AdvancedAi => "advanced AI",
            LayerKind::StructurePhase => "structure phase",
        }
    }

    /// Resolve a layer key, accepting the numbered keys the upstream pipeline emits.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "technical" | "1_technical_analysis" => Some(LayerKind::Technical),
            "simple_ai" | "2_simple_ai" => Some(LayerKind::SimpleAi),
            "advanced_ai" | "3_advanced_ai" => Some(LayerKind::AdvancedAi),
            "structure_phase" | "4_wyckoff_analysis" | "wyckoff_analysis" | "wyckoff" => {
                Some(LayerKind::StructurePhase)
            }
            _ => None,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layer whose recommendation and confidence sit at the top level
/// (rule-based technical analysis and the simple predictive model).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBasedLayer {
    pub recommendation: Option<String>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
}

/// Output of the ensemble model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePrediction {
    pub final_decision: Option<String>,
    pub confidence: Option<f64>,
}

/// Ensemble layer: everything decodable lives under `ensemble_prediction`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnsembleLayer {
    pub ensemble_prediction: Option<EnsemblePrediction>,
}

/// Phase-based market-structure analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructurePhaseLayer {
    pub current_phase: Option<String>,
    pub recommended_action: Option<String>,
    pub confidence: Option<f64>,
    pub phase_strength: Option<f64>,
    pub interpretation: Option<String>,
    /// Set upstream when the phase analysis was disabled or failed
    pub error: Option<String>,
}

/// One entry of the record's layer mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisLayer {
    Technical(RuleBasedLayer),
    SimpleAi(RuleBasedLayer),
    AdvancedAi(EnsembleLayer),
    StructurePhase(StructurePhaseLayer),
}

/// Upstream risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Parse a label; the pipeline's `MODERATE` is read as `MEDIUM`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "LOW" => Some(RiskLevel::Low),
            "MEDIUM" | "MODERATE" => Some(RiskLevel::Medium),
            "HIGH" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

/// Final decision computed upstream and embedded in the record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthoritativeDecision {
    pub final_recommendation: Option<String>,
    pub final_confidence: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub reasoning: Option<String>,
    pub agreement_level: Option<String>,
    pub strength: Option<String>,
}

/// Immutable snapshot handed to the validator and the fusion engine.
///
/// `layers` keeps the insertion order of the upstream mapping; each kind
/// appears at most once. The structure-phase analysis has its own slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompositeAnalysisRecord {
    pub symbol: Option<String>,
    pub current_price: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    /// `None` when the record carried no layer mapping at all
    #[serde(serialize_with = "serialize_layers")]
    pub layers: Option<Vec<AnalysisLayer>>,
    pub structure_phase: Option<StructurePhaseLayer>,
    pub authoritative_decision: Option<AuthoritativeDecision>,
}

impl CompositeAnalysisRecord {
    /// Look up a generic layer by kind.
    pub fn layer(&self, kind: LayerKind) -> Option<&AnalysisLayer> {
        self.layers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|layer| layer.kind() == kind)
    }

    /// Every scoreable layer in record order, structure phase last.
    pub fn scored_layers(&self) -> impl Iterator<Item = &dyn ScoredLayer> + '_ {
        let generic = self
            .layers
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|layer| layer as &dyn ScoredLayer);
        let phase = self
            .structure_phase
            .iter()
            .map(|layer| layer as &dyn ScoredLayer);
        generic.chain(phase)
    }
}

fn serialize_layers<S>(layers: &Option<Vec<AnalysisLayer>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match layers {
        None => serializer.serialize_none(),
        Some(layers) => {
            let mut map = serializer.serialize_map(Some(layers.len()))?;
            for layer in layers {
                map.serialize_entry(layer.kind().as_str(), layer)?;
            }
            map.end()
        }
    }
}

impl<'de> Deserialize<'de> for CompositeAnalysisRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        CompositeAnalysisRecord::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_from_label() {
        assert_eq!(Recommendation::from_label("BUY"), Recommendation::Buy);
        assert_eq!(Recommendation::from_label("STRONG_BUY"), Recommendation::Buy);
        assert_eq!(Recommendation::from_label("WEAK_SELL"), Recommendation::Sell);
        assert_eq!(Recommendation::from_label("HOLD"), Recommendation::Hold);
        assert_eq!(Recommendation::from_label("WAIT"), Recommendation::Hold);
    }

    #[test]
    fn test_lowercase_label_is_neutral() {
        assert_eq!(Recommendation::from_label("buy"), Recommendation::Hold);
        assert_eq!(Recommendation::from_label("Strong_Sell"), Recommendation::Hold);
    }

    #[test]
    fn test_buy_checked_before_sell() {
        assert_eq!(Recommendation::from_label("BUY_OR_SELL"), Recommendation::Buy);
        assert_eq!(Recommendation::from_label("SELL_THEN_BUY"), Recommendation::Buy);
    }

    #[test]
    fn test_layer_kind_aliases() {
        assert_eq!(LayerKind::from_key("1_technical_analysis"), Some(LayerKind::Technical));
        assert_eq!(LayerKind::from_key("3_advanced_ai"), Some(LayerKind::AdvancedAi));
        assert_eq!(LayerKind::from_key("wyckoff_analysis"), Some(LayerKind::StructurePhase));
        assert_eq!(LayerKind::from_key("sentiment"), None);
    }

    #[test]
    fn test_risk_level_accepts_moderate() {
        assert_eq!(RiskLevel::from_label("moderate"), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_label("HIGH"), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_label("EXTREME"), None);
    }

    #[test]
    fn test_serialize_layers_as_mapping() {
        let record = CompositeAnalysisRecord {
            layers: Some(vec![AnalysisLayer::SimpleAi(RuleBasedLayer {
                recommendation: Some("SELL".to_string()),
                confidence: Some(55.0),
                reasoning: None,
            })]),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["layers"]["simple_ai"]["recommendation"], "SELL");
    }
}
