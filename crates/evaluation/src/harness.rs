//! Offline leave-out evaluation harness.
//!
//! For each test user: hide a random share of their positive interactions,
//! score recommendations against the hidden ground truth, and average the
//! metrics over all evaluable users.
//!
//! The hold-out never mutates the recommender's matrix. Each fold builds a
//! masked snapshot via [`InteractionMatrix::masked`] and passes it to
//! `score_destinations`, so the live matrix is bit-identical before, during,
//! and after an evaluation run, on every exit path.
//!
//! [`InteractionMatrix::masked`]: data_loader::InteractionMatrix::masked

use crate::metrics;
use data_loader::UserId;
use engine::HybridRecommender;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use recommenders::{Recommender, Result, rank_destinations};
use serde::Serialize;
use sustainability::SustainabilityScorer;
use tracing::{info, warn};

/// Knobs for an evaluation run.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Share of a user's positive interactions to hide (default 0.2,
    /// always at least one cell)
    pub holdout_fraction: f32,
    /// Users with fewer positives than this are skipped with a warning
    pub min_interactions: usize,
    /// Seed for the hold-out sampling, so runs are reproducible
    pub seed: u64,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.2,
            min_interactions: 1,
            seed: 42,
        }
    }
}

/// Aggregated metrics over all evaluated users.
#[derive(Debug, Clone, Serialize)]
pub struct EvalMetrics {
    pub k: usize,
    pub precision: f32,
    pub recall: f32,
    pub ndcg: f32,
    /// Mean composite sustainability score (0-10) of recommended lists
    pub avg_sustainability: f32,
    /// Mean fraction of distinct countries in recommended lists
    pub avg_diversity: f32,
    pub users_evaluated: usize,
    pub users_skipped: usize,
}

/// One labelled result row in a multi-configuration comparison.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub metrics: EvalMetrics,
}

/// Number of interactions to hide for a user with `num_positives` positives.
fn holdout_size(num_positives: usize, fraction: f32) -> usize {
    ((num_positives as f32 * fraction).round() as usize).max(1)
}

/// Evaluate one recommender over the given test users.
pub fn evaluate(
    recommender: &dyn Recommender,
    test_users: &[UserId],
    k: usize,
    options: &EvalOptions,
) -> Result<EvalMetrics> {
    let index = recommender.index().clone();
    let scorer = SustainabilityScorer::new(index.clone());
    let interactions = index.interactions();
    let num_destinations = interactions.num_destinations();

    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut precision_scores = Vec::new();
    let mut recall_scores = Vec::new();
    let mut ndcg_scores = Vec::new();
    let mut sustainability_scores = Vec::new();
    let mut diversity_scores = Vec::new();
    let mut users_skipped = 0usize;

    for &user_id in test_users {
        let Some(user_idx) = index.user_index(user_id) else {
            warn!("Skipping unknown test user {}", user_id);
            users_skipped += 1;
            continue;
        };

        let mut positives = interactions.visited_indices(user_idx);
        if positives.is_empty() || positives.len() < options.min_interactions {
            warn!(
                "Skipping user {}: only {} positive interactions",
                user_id,
                positives.len()
            );
            users_skipped += 1;
            continue;
        }

        // Pick the held-out cells and hide them behind a masked snapshot
        positives.shuffle(&mut rng);
        let n_test = holdout_size(positives.len(), options.holdout_fraction);
        let held_out: Vec<(usize, usize)> = positives[..n_test]
            .iter()
            .map(|&dest_idx| (user_idx, dest_idx))
            .collect();
        let masked = interactions.masked(&held_out);

        // Exclusion disabled: the held-out destinations must be rankable
        let scores = recommender.score_destinations(user_idx, &masked)?;
        let recommended = rank_destinations(&index, &scores, None, k);

        // Ground truth: the hidden cells, binary relevance
        let mut y_true = vec![0.0f32; num_destinations];
        for &(_, dest_idx) in &held_out {
            y_true[dest_idx] = 1.0;
        }

        // Rank-derived prediction vector: higher rank, higher score
        let mut y_score = vec![0.0f32; num_destinations];
        for (rank, scored) in recommended.iter().enumerate() {
            if let Some(dest_idx) = index.destination_index(scored.destination_id) {
                y_score[dest_idx] = (num_destinations - rank) as f32;
            }
        }

        precision_scores.push(metrics::precision_at_k(&y_true, &y_score, k));
        recall_scores.push(metrics::recall_at_k(&y_true, &y_score, k));
        ndcg_scores.push(metrics::ndcg_at_k(&y_true, &y_score, k));

        let list_sustainability: Vec<f32> = recommended
            .iter()
            .filter_map(|scored| index.destination(scored.destination_id))
            .map(|d| scorer.score_destination(d))
            .collect();
        sustainability_scores.push(metrics::mean_sustainability(&list_sustainability));

        let countries: Vec<&str> = recommended
            .iter()
            .filter_map(|scored| index.destination(scored.destination_id))
            .map(|d| d.country.as_str())
            .collect();
        diversity_scores.push(metrics::diversity_score(&countries));
    }

    let mean = |values: &[f32]| {
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f32>() / values.len() as f32
        }
    };

    let result = EvalMetrics {
        k,
        precision: mean(&precision_scores),
        recall: mean(&recall_scores),
        ndcg: mean(&ndcg_scores),
        avg_sustainability: mean(&sustainability_scores),
        avg_diversity: mean(&diversity_scores),
        users_evaluated: precision_scores.len(),
        users_skipped,
    };
    info!(
        "Evaluated {} ({} users, {} skipped): p@{}={:.3} r@{}={:.3} ndcg@{}={:.3}",
        recommender.name(),
        result.users_evaluated,
        result.users_skipped,
        k,
        result.precision,
        k,
        result.recall,
        k,
        result.ndcg
    );
    Ok(result)
}

/// Evaluate several labelled recommender configurations; one row each.
pub fn compare(
    entries: &[(&str, &dyn Recommender)],
    test_users: &[UserId],
    k: usize,
    options: &EvalOptions,
) -> Result<Vec<ComparisonRow>> {
    entries
        .iter()
        .map(|(label, recommender)| {
            info!("Evaluating {}...", label);
            Ok(ComparisonRow {
                label: label.to_string(),
                metrics: evaluate(*recommender, test_users, k, options)?,
            })
        })
        .collect()
}

/// Evaluate the same hybrid at several sustainability weights; rows are
/// labelled `weight_<w>`.
pub fn compare_sustainability_weights(
    hybrid: &HybridRecommender,
    weights: &[f32],
    test_users: &[UserId],
    k: usize,
    options: &EvalOptions,
) -> Result<Vec<ComparisonRow>> {
    let views: Vec<_> = weights.iter().map(|&w| hybrid.at_weight(w)).collect();
    views
        .iter()
        .map(|view| {
            info!("Evaluating {}...", view.name());
            Ok(ComparisonRow {
                label: view.name().to_string(),
                metrics: evaluate(view, test_users, k, options)?,
            })
        })
        .collect()
}
