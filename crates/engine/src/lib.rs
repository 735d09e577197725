//! # Engine Crate
//!
//! The hybrid recommendation engine: blends the collaborative,
//! content-based, and neural strategies into one ranking, weighted by a
//! tunable sustainability knob, and enriches results with catalog metadata
//! and source attribution.

pub mod hybrid;

// Re-export commonly used types
pub use hybrid::{
    FixedWeightHybrid, HybridConfig, HybridRecommender, Recommendation, Strategy,
};
