//! The common recommender contract.
//!
//! Every strategy (collaborative, content-based, neural) and the hybrid
//! combiner implement [`Recommender`]. The seam is explicit so strategies
//! compose statically; there is no runtime capability probing.
//!
//! ## Design Note
//!
//! `score_destinations` receives the interaction matrix to read as an
//! argument instead of reaching into shared state. The evaluation harness
//! exploits this to pass a masked snapshot with held-out cells zeroed: the
//! live matrix is never mutated, so there is no restore invariant to uphold
//! and concurrent scoring stays safe.

use crate::error::{RecommendError, Result};
use data_loader::{DestinationId, InteractionMatrix, TravelIndex, UserId};
use std::collections::HashSet;
use std::sync::Arc;

/// One ranked candidate: a destination and its strategy score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDestination {
    pub destination_id: DestinationId,
    pub score: f32,
}

/// Core trait implemented by every recommendation strategy.
pub trait Recommender: Send + Sync {
    /// Short strategy name (for logging and source attribution)
    fn name(&self) -> &str;

    /// The catalog this recommender scores against
    fn index(&self) -> &Arc<TravelIndex>;

    /// Train or precompute whatever the strategy needs. Must be called
    /// before `score_destinations` for strategies with learned state.
    fn fit(&mut self) -> Result<()>;

    /// Raw affinity score for every destination, by dense destination index.
    ///
    /// `interactions` is the engagement matrix to read; callers that need
    /// hold-out semantics pass a masked copy.
    fn score_destinations(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<f32>>;

    /// Top-n recommendations for a user.
    ///
    /// Ordering contract: descending score, ties broken by destination id
    /// ascending, so repeated calls with unchanged inputs return identical
    /// output.
    fn recommend(
        &self,
        user_id: UserId,
        n: usize,
        exclude_visited: bool,
    ) -> Result<Vec<ScoredDestination>> {
        let index = self.index();
        let user_idx = index
            .user_index(user_id)
            .ok_or(RecommendError::UnknownUser(user_id))?;
        let interactions = index.interactions();
        let scores = self.score_destinations(user_idx, interactions)?;

        let visited: Option<HashSet<usize>> = if exclude_visited {
            Some(interactions.visited_indices(user_idx).into_iter().collect())
        } else {
            None
        };

        Ok(rank_destinations(index, &scores, visited.as_ref(), n))
    }
}

/// Shared ranking helper: descending score, ties by destination id
/// ascending, optional visited-exclusion, truncated to n.
pub fn rank_destinations(
    index: &TravelIndex,
    scores: &[f32],
    exclude: Option<&HashSet<usize>>,
    n: usize,
) -> Vec<ScoredDestination> {
    let mut ranked: Vec<ScoredDestination> = scores
        .iter()
        .enumerate()
        .filter(|(dest_idx, _)| exclude.is_none_or(|set| !set.contains(dest_idx)))
        .map(|(dest_idx, &score)| ScoredDestination {
            destination_id: index.destinations()[dest_idx].id,
            score,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.destination_id.cmp(&b.destination_id))
    });
    ranked.truncate(n);
    ranked
}

/// Cosine similarity between two equal-length vectors; 0.0 when either has
/// no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Destination, SustainabilityMetrics};

    fn build_index(ids: &[u32]) -> TravelIndex {
        let mut index = TravelIndex::new();
        for &id in ids {
            index.insert_destination(Destination {
                id,
                name: format!("Destination {}", id),
                country: "Spain".to_string(),
                region: String::new(),
                climate: "Mediterranean".to_string(),
                landscape_type: "Beach".to_string(),
                category: "Nature".to_string(),
                metrics: SustainabilityMetrics::default(),
                overall_sustainability_score: None,
                transportation_options: vec![],
                eco_certifications: vec![],
            });
        }
        index.build_secondary_indices();
        index.build_interactions();
        index
    }

    #[test]
    fn test_rank_destinations_sorts_descending() {
        let index = build_index(&[10, 20, 30]);
        let ranked = rank_destinations(&index, &[0.2, 0.9, 0.5], None, 10);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].destination_id, 20);
        assert_eq!(ranked[1].destination_id, 30);
        assert_eq!(ranked[2].destination_id, 10);
    }

    #[test]
    fn test_rank_destinations_breaks_ties_by_id() {
        let index = build_index(&[30, 10, 20]);
        let ranked = rank_destinations(&index, &[0.5, 0.5, 0.5], None, 10);

        let ids: Vec<u32> = ranked.iter().map(|r| r.destination_id).collect();
        assert_eq!(ids, vec![10, 20, 30], "equal scores order by id ascending");
    }

    #[test]
    fn test_rank_destinations_excludes_and_truncates() {
        let index = build_index(&[1, 2, 3, 4]);
        let exclude: HashSet<usize> = [1].into_iter().collect();

        let ranked = rank_destinations(&index, &[0.1, 0.9, 0.5, 0.3], Some(&exclude), 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].destination_id, 3, "excluded index 1 is gone");
        assert_eq!(ranked[1].destination_id, 4);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
