use analysis_core::{LayerKind, Recommendation};
use serde::{Deserialize, Serialize};

/// Count of contributing layers per normalized direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub buy: u32,
    pub sell: u32,
    pub hold: u32,
}

impl VoteTally {
    pub fn record(&mut self, recommendation: Recommendation) {
        match recommendation {
            Recommendation::Buy => self.buy += 1,
            Recommendation::Sell => self.sell += 1,
            Recommendation::Hold => self.hold += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.buy + self.sell + self.hold
    }

    /// Majority vote: a counter wins only by strictly exceeding both others.
    pub fn consensus(&self) -> Consensus {
        let VoteTally { buy, sell, hold } = *self;
        if buy > sell && buy > hold {
            Consensus::Buy
        } else if sell > buy && sell > hold {
            Consensus::Sell
        } else if hold > buy && hold > sell {
            Consensus::Hold
        } else {
            Consensus::Mixed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consensus {
    Buy,
    Sell,
    Hold,
    Mixed,
}

/// How many contributing layers took a directional stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgreementLevel {
    StrongConsensus,
    ModerateConsensus,
    SingleSignal,
    MixedSignals,
    NoSignals,
}

impl AgreementLevel {
    pub fn from_counts(contributing: u32, directional: u32) -> Self {
        if contributing == 0 {
            return AgreementLevel::NoSignals;
        }
        match directional {
            d if d >= 3 => AgreementLevel::StrongConsensus,
            2 => AgreementLevel::ModerateConsensus,
            1 => AgreementLevel::SingleSignal,
            _ => AgreementLevel::MixedSignals,
        }
    }
}

/// Five-grade reading of the un-normalized weighted sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradedSignal {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStrength {
    Strong,
    Moderate,
    Weak,
}

impl GradedSignal {
    /// `points` is the weighted sum with weights read as percentages
    /// (i.e. `weighted_score * 100`), range roughly -100..=100.
    pub fn from_points(points: f64) -> Self {
        match points {
            p if p > 15.0 => GradedSignal::StrongBuy,
            p if p > 5.0 => GradedSignal::Buy,
            p if p > -5.0 => GradedSignal::Hold,
            p if p > -15.0 => GradedSignal::Sell,
            _ => GradedSignal::StrongSell,
        }
    }

    pub fn strength(&self) -> SignalStrength {
        match self {
            GradedSignal::StrongBuy | GradedSignal::StrongSell => SignalStrength::Strong,
            GradedSignal::Buy | GradedSignal::Sell => SignalStrength::Moderate,
            GradedSignal::Hold => SignalStrength::Weak,
        }
    }
}

/// One layer's share of the fused score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerContribution {
    pub layer_name: LayerKind,
    /// Label exactly as the layer reported it
    pub recommendation: String,
    pub confidence: f64,
    pub weight: f64,
    /// Normalized direction: +1 / -1 / 0
    pub score: i32,
    /// `score * confidence * weight / 100`
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDifference {
    pub engine_value: f64,
    pub authoritative_value: f64,
    pub absolute_difference: f64,
    pub within_tolerance: bool,
}

/// Side-by-side view of the engine's decision and the upstream one.
/// Informational only: the engine never adopts the authoritative value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub engine_recommendation: Recommendation,
    pub authoritative_recommendation: String,
    /// Labels equal after trimming and upper-casing
    pub matches: bool,
    /// Labels normalize to the same BUY/SELL/HOLD direction
    pub direction_agrees: bool,
    pub confidence: Option<ConfidenceDifference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionReport {
    /// Magnitude of the normalized score; the direction lives in `final_recommendation`
    pub final_score: f64,
    /// Signed normalized score the thresholds are applied to
    pub raw_score: f64,
    pub final_recommendation: Recommendation,
    pub votes: VoteTally,
    pub consensus: Consensus,
    pub contributions: Vec<LayerContribution>,
    pub total_weight: f64,
    pub weighted_score: f64,
    pub agreement_level: AgreementLevel,
    pub graded_signal: GradedSignal,
    pub strength: SignalStrength,
    /// `None` when the record has no authoritative recommendation to compare with
    pub matches_authoritative: Option<bool>,
    pub reconciliation: Option<Reconciliation>,
}

impl FusionReport {
    /// Contribution of one layer, if it took part in the fusion
    pub fn contribution(&self, kind: LayerKind) -> Option<&LayerContribution> {
        self.contributions.iter().find(|c| c.layer_name == kind)
    }
}
