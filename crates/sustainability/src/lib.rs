//! # Sustainability Crate
//!
//! Everything eco: the composite sustainability scorer and the
//! explainability layer.
//!
//! ## Components
//!
//! ### Scorer
//! Weighted aggregate of the five sub-metrics (carbon footprint, water
//! consumption, waste management, biodiversity impact, local economy
//! support) into one 0-10 score. Missing readings are imputed with the
//! dataset mean so incomplete records are not penalized.
//!
//! ### Explainer
//! Per-destination sustainability profiles with country and global
//! comparisons plus strengths/weaknesses, and counterfactual explanations
//! ("this comparable destination does better, here is where").

pub mod counterfactual;
pub mod explain;
pub mod scorer;

// Re-export commonly used types
pub use counterfactual::{Counterfactual, CounterfactualReport, MetricDelta};
pub use explain::{
    ExplainerConfig, MetricReading, RecommendationExplainer, SustainabilityProfile,
    explain_sources,
};
pub use scorer::{ScoringWeights, SustainabilityScorer, blend_scores};
