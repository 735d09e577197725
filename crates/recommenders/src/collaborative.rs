//! Collaborative filtering over the interaction matrix.
//!
//! "Travelers like you also went to..."
//!
//! ## Algorithm (user-based, the default)
//! 1. Compare the target user's interaction row against every other row
//!    with cosine similarity
//! 2. Keep the top-K most similar users with positive similarity
//! 3. Predicted affinity per destination = similarity-weighted average of
//!    those users' interaction values
//!
//! Cold start (a user with no interactions at all) falls back to the
//! population-average interaction per destination.
//!
//! An item-based variant is also available: destinations are scored by how
//! similar their interaction columns are to the ones the user already
//! visited.

use crate::error::Result;
use crate::traits::{Recommender, cosine_similarity};
use data_loader::{InteractionMatrix, TravelIndex};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Default number of similar users consulted per prediction
pub const DEFAULT_TOP_K_USERS: usize = 20;

/// Which axis of the interaction matrix similarity is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfMethod {
    /// Similar users vote for destinations
    UserBased,
    /// Destinations similar to already-visited ones score higher
    ItemBased,
}

/// Collaborative-filtering recommendation strategy.
///
/// Holds no learned state: similarities are computed against whatever matrix
/// is passed to `score_destinations`, which is what lets hold-out evaluation
/// hand in a masked snapshot.
pub struct CollaborativeFilteringRecommender {
    index: Arc<TravelIndex>,
    method: CfMethod,
    top_k_users: usize,
}

impl CollaborativeFilteringRecommender {
    pub fn new(index: Arc<TravelIndex>) -> Self {
        Self {
            index,
            method: CfMethod::UserBased,
            top_k_users: DEFAULT_TOP_K_USERS,
        }
    }

    /// Select user-based or item-based similarity (default: user-based)
    pub fn with_method(mut self, method: CfMethod) -> Self {
        self.method = method;
        self
    }

    /// Configure how many similar users are consulted (default: 20)
    pub fn with_top_k_users(mut self, k: usize) -> Self {
        self.top_k_users = k;
        self
    }

    /// Similarity-weighted average of the top-K most similar users' rows.
    fn score_user_based(&self, user_idx: usize, interactions: &InteractionMatrix) -> Vec<f32> {
        let target_row = interactions.row(user_idx);

        // Similarity of every other user to the target
        let mut similarities: Vec<(usize, f32)> = (0..interactions.num_users())
            .into_par_iter()
            .filter(|&other| other != user_idx)
            .map(|other| (other, cosine_similarity(target_row, interactions.row(other))))
            .filter(|&(_, sim)| sim > 0.0)
            .collect();

        // Top-K, ties broken by user index for determinism
        similarities.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        similarities.truncate(self.top_k_users);
        debug!(
            "Scoring user {} against {} similar users",
            user_idx,
            similarities.len()
        );

        let total_similarity: f32 = similarities.iter().map(|&(_, sim)| sim).sum();
        if total_similarity == 0.0 {
            return vec![0.0; interactions.num_destinations()];
        }

        let mut scores = vec![0.0f32; interactions.num_destinations()];
        for &(other, sim) in &similarities {
            for (dest_idx, &value) in interactions.row(other).iter().enumerate() {
                scores[dest_idx] += sim * value;
            }
        }
        for score in &mut scores {
            *score /= total_similarity;
        }
        scores
    }

    /// Sum of item-item similarities between each destination and the ones
    /// the user already visited.
    fn score_item_based(&self, user_idx: usize, interactions: &InteractionMatrix) -> Vec<f32> {
        let num_destinations = interactions.num_destinations();
        let num_users = interactions.num_users();

        // Materialize columns once per call
        let columns: Vec<Vec<f32>> = (0..num_destinations)
            .map(|dest_idx| {
                (0..num_users)
                    .map(|u| interactions.get(u, dest_idx))
                    .collect()
            })
            .collect();

        let visited = interactions.visited_indices(user_idx);
        (0..num_destinations)
            .into_par_iter()
            .map(|dest_idx| {
                visited
                    .iter()
                    .map(|&v| cosine_similarity(&columns[v], &columns[dest_idx]))
                    .sum()
            })
            .collect()
    }
}

impl Recommender for CollaborativeFilteringRecommender {
    fn name(&self) -> &str {
        match self.method {
            CfMethod::UserBased => "collaborative",
            CfMethod::ItemBased => "collaborative-item",
        }
    }

    fn index(&self) -> &Arc<TravelIndex> {
        &self.index
    }

    fn fit(&mut self) -> Result<()> {
        // Similarities are computed per call against the supplied matrix, so
        // there is nothing to precompute.
        Ok(())
    }

    fn score_destinations(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<f32>> {
        if !interactions.has_interactions(user_idx) {
            debug!("User index {} has no history; using population averages", user_idx);
            return Ok(interactions.column_means());
        }

        Ok(match self.method {
            CfMethod::UserBased => self.score_user_based(user_idx, interactions),
            CfMethod::ItemBased => self.score_item_based(user_idx, interactions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecommendError;
    use data_loader::{Destination, SustainabilityMetrics, User};

    /// 3 users x 4 destinations. Users 1 and 2 overlap on destinations 1 and
    /// 2; user 2 additionally visited 3 and 4. User 3 has no history.
    fn build_index() -> Arc<TravelIndex> {
        let mut index = TravelIndex::new();
        for id in 1..=4u32 {
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
        let user = |id: u32, history: Vec<u32>| User {
            id,
            age_group: "25-34".to_string(),
            interests: vec![],
            sustainability_preference: 5.0,
            travel_style: "Budget".to_string(),
            budget_level: 3,
            travel_history: history,
        };
        index.insert_user(user(1, vec![1, 2]));
        index.insert_user(user(2, vec![1, 2, 3, 4]));
        index.insert_user(user(3, vec![]));
        index.build_secondary_indices();
        index.build_interactions();
        Arc::new(index)
    }

    #[test]
    fn test_similar_user_drives_scores() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index.clone());

        let scores = cf.score_destinations(0, index.interactions()).unwrap();

        // User 2 is similar to user 1 and visited destinations 3 and 4, so
        // those must receive positive predicted affinity.
        assert!(scores[2] > 0.0);
        assert!(scores[3] > 0.0);
    }

    #[test]
    fn test_exclude_visited_removes_history() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index);

        let recs = cf.recommend(1, 2, true).unwrap();

        let ids: Vec<u32> = recs.iter().map(|r| r.destination_id).collect();
        assert!(!ids.contains(&1), "visited destination 1 must not appear");
        assert!(!ids.contains(&2), "visited destination 2 must not appear");
    }

    #[test]
    fn test_cold_start_falls_back_to_popularity() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index.clone());

        let scores = cf.score_destinations(2, index.interactions()).unwrap();

        // Destinations 1 and 2 were visited by two users, 3 and 4 by one
        assert!(scores[0] > scores[2]);
        assert_eq!(scores, index.interactions().column_means());
    }

    #[test]
    fn test_unknown_user_is_an_error() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index);

        let result = cf.recommend(99, 5, true);
        assert!(matches!(result, Err(RecommendError::UnknownUser(99))));
    }

    #[test]
    fn test_recommend_is_deterministic() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index);

        let first = cf.recommend(1, 4, false).unwrap();
        let second = cf.recommend(1, 4, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_item_based_scores_similar_destinations() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index.clone())
            .with_method(CfMethod::ItemBased);

        let scores = cf.score_destinations(0, index.interactions()).unwrap();

        // Destinations 1 and 2 share both visitors, 3 and 4 share one; all
        // should relate to user 1's history, visited ones most strongly.
        assert!(scores[0] > scores[2]);
        assert!(scores[2] > 0.0);
    }

    #[test]
    fn test_masked_matrix_changes_scores_without_touching_original() {
        let index = build_index();
        let cf = CollaborativeFilteringRecommender::new(index.clone());
        let original = index.interactions().clone();

        let user_idx = index.user_index(2).unwrap();
        let masked = index.interactions().masked(&[(user_idx, 3)]);
        let _ = cf.score_destinations(user_idx, &masked).unwrap();

        assert_eq!(index.interactions(), &original);
    }
}
