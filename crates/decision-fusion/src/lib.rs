//! Weighted decision fusion over independent analysis layers.
//!
//! Each layer's label is normalized to +1 / -1 / 0, scaled by its confidence
//! and configured weight, and the sum is renormalized by the weight of the
//! layers that actually reported. The result is thresholded into
//! BUY / SELL / HOLD and checked against the upstream decision.

pub mod config;
pub mod engine;
pub mod models;
pub mod reconcile;


pub use config::{FusionConfig, LayerWeights};
pub use engine::{fuse, DecisionFusionEngine};
pub use models::{
    AgreementLevel, Consensus, ConfidenceDifference, FusionReport, GradedSignal,
    LayerContribution, Reconciliation, SignalStrength, VoteTally,
};
pub use reconcile::reconcile;
