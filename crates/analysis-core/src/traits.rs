use crate::{AnalysisLayer, LayerKind, StructurePhaseLayer};

/// A usable opinion extracted from one layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSignal<'a> {
    pub label: &'a str,
    pub confidence: f64,
}

/// Uniform access to a layer's recommendation, wherever the layer keeps it.
pub trait ScoredLayer {
    fn kind(&self) -> LayerKind;

    /// Raw recommendation label, if the layer carries one
    fn recommendation(&self) -> Option<&str>;

    /// Raw confidence, if the layer carries one
    fn confidence(&self) -> Option<f64>;

    /// Both fields, only when both are present. An empty label or a zero
    /// confidence counts as no opinion.
    fn signal(&self) -> Option<LayerSignal<'_>> {
        let label = present_label(self.recommendation())?;
        let confidence = present_confidence(self.confidence())?;
        Some(LayerSignal { label, confidence })
    }
}

/// A label is present when it is a non-empty string.
pub fn present_label(label: Option<&str>) -> Option<&str> {
    label.filter(|l| !l.is_empty())
}

/// A confidence is present when it is neither zero nor NaN.
pub fn present_confidence(confidence: Option<f64>) -> Option<f64> {
    confidence.filter(|c| *c != 0.0 && !c.is_nan())
}

impl ScoredLayer for AnalysisLayer {
    fn kind(&self) -> LayerKind {
        match self {
            AnalysisLayer::Technical(_) => LayerKind::Technical,
            AnalysisLayer::SimpleAi(_) => LayerKind::SimpleAi,
            AnalysisLayer::AdvancedAi(_) => LayerKind::AdvancedAi,
            AnalysisLayer::StructurePhase(_) => LayerKind::StructurePhase,
        }
    }

    fn recommendation(&self) -> Option<&str> {
        match self {
            AnalysisLayer::Technical(layer) | AnalysisLayer::SimpleAi(layer) => {
                layer.recommendation.as_deref()
            }
            AnalysisLayer::AdvancedAi(layer) => layer
                .ensemble_prediction
                .as_ref()
                .and_then(|p| p.final_decision.as_deref()),
            AnalysisLayer::StructurePhase(layer) => layer.recommendation(),
        }
    }

    fn confidence(&self) -> Option<f64> {
        match self {
            AnalysisLayer::Technical(layer) | AnalysisLayer::SimpleAi(layer) => layer.confidence,
            AnalysisLayer::AdvancedAi(layer) => {
                layer.ensemble_prediction.as_ref().and_then(|p| p.confidence)
            }
            AnalysisLayer::StructurePhase(layer) => ScoredLayer::confidence(layer),
        }
    }
}

impl ScoredLayer for StructurePhaseLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::StructurePhase
    }

    fn recommendation(&self) -> Option<&str> {
        self.recommended_action.as_deref()
    }

    fn confidence(&self) -> Option<f64> {
        self.confidence
    }
}
