//! # Evaluation Crate
//!
//! Offline evaluation of recommenders: ranking metrics (precision@k,
//! recall@k, NDCG@k), list quality metrics (country diversity, mean
//! sustainability), and a leave-out harness that hides a share of each test
//! user's interactions behind a masked matrix snapshot, scores the
//! recommendations against the hidden ground truth, and averages per-user
//! results.
//!
//! Multiple recommenders, or multiple sustainability-weight settings of the
//! same hybrid, can be compared side by side; each configuration produces
//! one labelled result row.

pub mod harness;
pub mod metrics;

// Re-export commonly used types
pub use harness::{
    ComparisonRow, EvalMetrics, EvalOptions, compare, compare_sustainability_weights, evaluate,
};
pub use metrics::{diversity_score, mean_sustainability, ndcg_at_k, precision_at_k, recall_at_k};
