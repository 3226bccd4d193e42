use analysis_core::{AnalysisError, LayerKind, Recommendation};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Allowed drift of the weight sum away from 1.0
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Fixed per-layer weights. Must total 1.0 so that the normalized score
/// stays on the same scale whichever layers contribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub technical: f64,
    pub simple_ai: f64,
    pub advanced_ai: f64,
    pub structure_phase: f64,
}

impl Default for LayerWeights {
    fn default() -> Self {
        Self {
            technical: 0.30,
            simple_ai: 0.20,
            advanced_ai: 0.40,
            structure_phase: 0.10,
        }
    }
}

impl LayerWeights {
    pub fn weight(&self, kind: LayerKind) -> f64 {
        match kind {
            LayerKind::Technical => self.technical,
            LayerKind::SimpleAi => self.simple_ai,
            LayerKind::AdvancedAi => self.advanced_ai,
            LayerKind::StructurePhase => self.structure_phase,
        }
    }

    pub fn sum(&self) -> f64 {
        self.technical + self.simple_ai + self.advanced_ai + self.structure_phase
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    pub weights: LayerWeights,
    /// Signed raw score must be strictly above this for BUY
    pub buy_threshold: f64,
    /// Signed raw score must be strictly below this for SELL
    pub sell_threshold: f64,
    /// Max points between the fused score and the authoritative confidence
    /// before the two are reported as disagreeing
    pub confidence_tolerance: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: LayerWeights::default(),
            buy_threshold: 20.0,
            sell_threshold: -20.0,
            confidence_tolerance: 15.0,
        }
    }
}

impl FusionConfig {
    /// Load overrides from the environment (and `.env`), falling back to defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: f64| -> Result<f64> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .with_context(|| format!("{} is not a number: '{}'", key, raw)),
                None => Ok(default),
            }
        };

        let config = Self {
            weights: LayerWeights {
                technical: read("FUSION_WEIGHT_TECHNICAL", defaults.weights.technical)?,
                simple_ai: read("FUSION_WEIGHT_SIMPLE_AI", defaults.weights.simple_ai)?,
                advanced_ai: read("FUSION_WEIGHT_ADVANCED_AI", defaults.weights.advanced_ai)?,
                structure_phase: read(
                    "FUSION_WEIGHT_STRUCTURE_PHASE",
                    defaults.weights.structure_phase,
                )?,
            },
            buy_threshold: read("FUSION_BUY_THRESHOLD", defaults.buy_threshold)?,
            sell_threshold: read("FUSION_SELL_THRESHOLD", defaults.sell_threshold)?,
            confidence_tolerance: read(
                "FUSION_CONFIDENCE_TOLERANCE",
                defaults.confidence_tolerance,
            )?,
        };

        config
            .validate()
            .context("Invalid fusion configuration from environment")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for kind in LayerKind::ALL {
            let weight = self.weights.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "weight for {} must be a non-negative number, got {}",
                    kind, weight
                )));
            }
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(AnalysisError::InvalidConfig(format!(
                "layer weights must sum to 1.0, got {:.4}",
                sum
            )));
        }

        if !self.buy_threshold.is_finite() || !self.sell_threshold.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "thresholds must be finite".to_string(),
            ));
        }
        if self.sell_threshold > self.buy_threshold {
            return Err(AnalysisError::InvalidConfig(format!(
                "sell threshold {} is above buy threshold {}",
                self.sell_threshold, self.buy_threshold
            )));
        }

        if !self.confidence_tolerance.is_finite() || self.confidence_tolerance < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "confidence tolerance must be non-negative, got {}",
                self.confidence_tolerance
            )));
        }

        Ok(())
    }

    /// Map a signed raw score to a recommendation. Both bounds are strict,
    /// so a score sitting exactly on a threshold stays HOLD.
    pub fn recommendation_for(&self, raw_score: f64) -> Recommendation {
        if raw_score > self.buy_threshold {
            Recommendation::Buy
        } else if raw_score < self.sell_threshold {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        }
    }
}
