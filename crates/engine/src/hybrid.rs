//! # Hybrid Recommender
//!
//! The central combiner. One call runs the whole pipeline:
//! 1. Score every destination with each strategy (collaborative, content,
//!    neural)
//! 2. Min-max normalize each strategy's scores to [0, 1] so no strategy
//!    dominates on scale alone
//! 3. Blend with the configured strategy weights
//! 4. Mix in the normalized sustainability score with the caller's
//!    sustainability weight
//! 5. Rank (descending score, ties by destination id), apply the visited
//!    exclusion once, centrally, and truncate
//! 6. Attribute each result to the strategies that actually scored it
//!
//! The sustainability weight is a pure parameter: no state is mutated, so a
//! later call with the default weight reproduces the default ranking
//! exactly.

use data_loader::{DestinationId, InteractionMatrix, TravelIndex, UserId};
use recommenders::{
    CollaborativeFilteringRecommender, ContentBasedRecommender, NeuralCfConfig,
    NeuralCfRecommender, RecommendError, Recommender, Result, rank_destinations,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use sustainability::{SustainabilityScorer, blend_scores};
use tracing::{debug, info, instrument};

/// The strategies blended by the hybrid recommender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Strategy {
    Collaborative,
    Content,
    Neural,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Collaborative => "collaborative",
            Strategy::Content => "content",
            Strategy::Neural => "neural",
        }
    }
}

/// Tuning knobs for the hybrid blend.
///
/// Strategy weights are expected to sum to 1.0 so the blended score stays in
/// [0, 1] alongside the normalized sustainability score.
#[derive(Debug, Clone)]
pub struct HybridConfig {
    pub collaborative_weight: f32,
    pub content_weight: f32,
    pub neural_weight: f32,
    /// Sustainability weight used when the caller does not supply one
    pub default_sustainability_weight: f32,
    /// A strategy is credited as a source when its raw score exceeds this
    pub attribution_threshold: f32,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            collaborative_weight: 0.35,
            content_weight: 0.35,
            neural_weight: 0.30,
            default_sustainability_weight: 0.3,
            attribution_threshold: 1e-4,
        }
    }
}

/// A fully enriched recommendation returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub destination_id: DestinationId,
    pub name: String,
    pub country: String,
    /// Strategy mix before sustainability weighting, in [0, 1]
    pub blended_score: f32,
    /// Score the ranking is based on, in [0, 1]
    pub final_score: f32,
    /// Composite eco score on its native 0-10 scale
    pub sustainability_score: f32,
    /// Strategies whose raw score contributed to this destination
    pub sources: Vec<Strategy>,
}

/// Hybrid recommendation engine combining all three strategies with
/// sustainability weighting.
pub struct HybridRecommender {
    index: Arc<TravelIndex>,
    collaborative: CollaborativeFilteringRecommender,
    content: ContentBasedRecommender,
    neural: NeuralCfRecommender,
    scorer: SustainabilityScorer,
    config: HybridConfig,
}

impl HybridRecommender {
    pub fn new(index: Arc<TravelIndex>) -> Self {
        Self::with_configs(index, HybridConfig::default(), NeuralCfConfig::default())
    }

    pub fn with_configs(
        index: Arc<TravelIndex>,
        config: HybridConfig,
        neural_config: NeuralCfConfig,
    ) -> Self {
        Self {
            collaborative: CollaborativeFilteringRecommender::new(index.clone()),
            content: ContentBasedRecommender::new(index.clone()),
            neural: NeuralCfRecommender::with_config(index.clone(), neural_config),
            scorer: SustainabilityScorer::new(index.clone()),
            index,
            config,
        }
    }

    pub fn config(&self) -> &HybridConfig {
        &self.config
    }

    /// Main entry point: top-n recommendations with an explicit
    /// sustainability weight in [0, 1] (clamped).
    #[instrument(skip(self))]
    pub fn recommend_weighted(
        &self,
        user_id: UserId,
        n: usize,
        exclude_visited: bool,
        sustainability_weight: f32,
    ) -> Result<Vec<Recommendation>> {
        let user_idx = self
            .index
            .user_index(user_id)
            .ok_or(RecommendError::UnknownUser(user_id))?;
        self.recommend_against(
            user_idx,
            n,
            exclude_visited,
            sustainability_weight,
            self.index.interactions(),
        )
    }

    /// Same as [`recommend_weighted`](Self::recommend_weighted) but reading
    /// an explicit matrix; the evaluation harness passes a masked snapshot.
    pub fn recommend_against(
        &self,
        user_idx: usize,
        n: usize,
        exclude_visited: bool,
        sustainability_weight: f32,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<Recommendation>> {
        let weight = sustainability_weight.clamp(0.0, 1.0);

        let (blended, sources) = self.blended_scores(user_idx, interactions)?;
        let sustainability: Vec<f32> = self
            .index
            .destinations()
            .iter()
            .map(|d| self.scorer.score_destination(d) / 10.0)
            .collect();

        let final_scores: Vec<f32> = blended
            .iter()
            .zip(&sustainability)
            .map(|(&base, &eco)| blend_scores(base, eco, weight))
            .collect();

        let visited: Option<HashSet<usize>> = if exclude_visited {
            Some(interactions.visited_indices(user_idx).into_iter().collect())
        } else {
            None
        };
        let ranked = rank_destinations(&self.index, &final_scores, visited.as_ref(), n);
        debug!(
            "Ranked {} candidates for user index {} at sustainability weight {:.2}",
            ranked.len(),
            user_idx,
            weight
        );

        ranked
            .into_iter()
            .map(|scored| {
                let dest_idx = self
                    .index
                    .destination_index(scored.destination_id)
                    .ok_or(RecommendError::UnknownDestination(scored.destination_id))?;
                let destination = &self.index.destinations()[dest_idx];
                Ok(Recommendation {
                    destination_id: scored.destination_id,
                    name: destination.name.clone(),
                    country: destination.country.clone(),
                    blended_score: blended[dest_idx],
                    final_score: scored.score,
                    sustainability_score: sustainability[dest_idx] * 10.0,
                    sources: sources[dest_idx].clone(),
                })
            })
            .collect()
    }

    /// Final scores per dense destination index at an arbitrary
    /// sustainability weight. Used by the fixed-weight evaluation adapter.
    pub fn scores_at_weight(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
        sustainability_weight: f32,
    ) -> Result<Vec<f32>> {
        let weight = sustainability_weight.clamp(0.0, 1.0);
        let (blended, _) = self.blended_scores(user_idx, interactions)?;
        Ok(blended
            .iter()
            .enumerate()
            .map(|(dest_idx, &base)| {
                let eco = self.scorer.score_destination(&self.index.destinations()[dest_idx]) / 10.0;
                blend_scores(base, eco, weight)
            })
            .collect())
    }

    /// A borrowed view of this hybrid pinned to one sustainability weight,
    /// for evaluating several weight settings side by side.
    pub fn at_weight(&self, sustainability_weight: f32) -> FixedWeightHybrid<'_> {
        FixedWeightHybrid {
            hybrid: self,
            weight: sustainability_weight,
            label: format!("weight_{}", sustainability_weight),
        }
    }

    /// Normalized, weight-blended strategy scores plus per-destination source
    /// attribution.
    fn blended_scores(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
    ) -> Result<(Vec<f32>, Vec<Vec<Strategy>>)> {
        let strategies: [(Strategy, &dyn Recommender, f32); 3] = [
            (
                Strategy::Collaborative,
                &self.collaborative,
                self.config.collaborative_weight,
            ),
            (Strategy::Content, &self.content, self.config.content_weight),
            (Strategy::Neural, &self.neural, self.config.neural_weight),
        ];

        let num_destinations = interactions.num_destinations();
        let mut blended = vec![0.0f32; num_destinations];
        let mut sources: Vec<Vec<Strategy>> = vec![Vec::new(); num_destinations];
        let mut any_candidates = false;

        for (strategy, recommender, strategy_weight) in strategies {
            let raw = recommender.score_destinations(user_idx, interactions)?;
            if raw.is_empty() {
                continue;
            }
            any_candidates = true;

            let normalized = min_max_normalize(&raw);
            for dest_idx in 0..num_destinations {
                blended[dest_idx] += strategy_weight * normalized[dest_idx];
                if raw[dest_idx] > self.config.attribution_threshold {
                    sources[dest_idx].push(strategy);
                }
            }
        }

        if !any_candidates {
            return Err(RecommendError::NoRecommendations);
        }
        Ok((blended, sources))
    }
}

impl Recommender for HybridRecommender {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn index(&self) -> &Arc<TravelIndex> {
        &self.index
    }

    fn fit(&mut self) -> Result<()> {
        for (label, recommender) in [
            ("collaborative", &mut self.collaborative as &mut dyn Recommender),
            ("content", &mut self.content),
            ("neural", &mut self.neural),
        ] {
            info!("Training {} strategy", label);
            recommender.fit()?;
        }
        Ok(())
    }

    fn score_destinations(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<f32>> {
        self.scores_at_weight(
            user_idx,
            interactions,
            self.config.default_sustainability_weight,
        )
    }
}

/// A hybrid recommender pinned to one sustainability weight.
///
/// Zero-cost adapter so that several weight settings of the same hybrid can
/// be evaluated as independent configurations.
pub struct FixedWeightHybrid<'a> {
    hybrid: &'a HybridRecommender,
    weight: f32,
    label: String,
}

impl Recommender for FixedWeightHybrid<'_> {
    fn name(&self) -> &str {
        &self.label
    }

    fn index(&self) -> &Arc<TravelIndex> {
        self.hybrid.index()
    }

    fn fit(&mut self) -> Result<()> {
        // A view over an already-fitted hybrid
        Ok(())
    }

    fn score_destinations(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<f32>> {
        self.hybrid
            .scores_at_weight(user_idx, interactions, self.weight)
    }
}

/// Min-max normalization to [0, 1]. A degenerate score set (all values
/// equal) normalizes to all zeros: it carries no ranking signal.
fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max - min <= f32::EPSILON {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|&s| (s - min) / (max - min)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Destination, SustainabilityMetrics, User};

    fn destination(id: u32, country: &str, eco: f32) -> Destination {
        Destination {
            id,
            name: format!("Destination {}", id),
            country: country.to_string(),
            region: String::new(),
            climate: "Temperate".to_string(),
            landscape_type: "Beach".to_string(),
            category: "Nature".to_string(),
            metrics: SustainabilityMetrics {
                carbon_footprint: Some(eco),
                water_consumption: Some(eco),
                waste_management: Some(eco),
                biodiversity_impact: Some(eco),
                local_economy_support: Some(eco),
            },
            overall_sustainability_score: None,
            transportation_options: vec![],
            eco_certifications: vec![],
        }
    }

    fn user(id: u32, history: Vec<u32>) -> User {
        User {
            id,
            age_group: "25-34".to_string(),
            interests: vec!["Nature".to_string()],
            sustainability_preference: 6.0,
            travel_style: "Eco-conscious".to_string(),
            budget_level: 3,
            travel_history: history,
        }
    }

    fn build_index() -> Arc<TravelIndex> {
        let mut index = TravelIndex::new();
        index.insert_destination(destination(1, "Spain", 3.0));
        index.insert_destination(destination(2, "Portugal", 9.0));
        index.insert_destination(destination(3, "Japan", 5.0));
        index.insert_destination(destination(4, "Norway", 7.0));
        index.insert_user(user(1, vec![2, 4]));
        index.insert_user(user(2, vec![2, 3]));
        index.insert_user(user(3, vec![1]));
        index.build_secondary_indices();
        index.build_interactions();
        Arc::new(index)
    }

    fn fast_neural_config() -> NeuralCfConfig {
        NeuralCfConfig {
            embedding_dim: 4,
            hidden_layers: vec![8],
            epochs: 30,
            learning_rate: 0.05,
            seed: 11,
        }
    }

    fn fitted_hybrid(index: Arc<TravelIndex>) -> HybridRecommender {
        let mut hybrid =
            HybridRecommender::with_configs(index, HybridConfig::default(), fast_neural_config());
        hybrid.fit().unwrap();
        hybrid
    }

    #[test]
    fn test_recommend_before_fit_fails() {
        let hybrid = HybridRecommender::with_configs(
            build_index(),
            HybridConfig::default(),
            fast_neural_config(),
        );
        // The neural strategy has not been trained yet
        let result = hybrid.recommend_weighted(1, 3, true, 0.3);
        assert!(matches!(result, Err(RecommendError::ModelNotTrained)));
    }

    #[test]
    fn test_ranking_is_valid_and_deterministic() {
        let hybrid = fitted_hybrid(build_index());

        let first = hybrid.recommend_weighted(1, 4, false, 0.3).unwrap();
        let second = hybrid.recommend_weighted(1, 4, false, 0.3).unwrap();

        // Determinism
        let ids = |recs: &[Recommendation]| {
            recs.iter().map(|r| r.destination_id).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));

        // Scores monotonically non-increasing, no repeated ids
        for pair in first.windows(2) {
            assert!(pair[0].final_score >= pair[1].final_score);
        }
        let mut unique = ids(&first);
        unique.dedup();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn test_exclude_visited_is_applied_centrally() {
        let hybrid = fitted_hybrid(build_index());

        let recs = hybrid.recommend_weighted(1, 4, true, 0.3).unwrap();
        let ids: Vec<u32> = recs.iter().map(|r| r.destination_id).collect();
        assert!(!ids.contains(&2), "visited destination must be excluded");
        assert!(!ids.contains(&4), "visited destination must be excluded");
    }

    #[test]
    fn test_full_sustainability_weight_ranks_by_eco_score() {
        let hybrid = fitted_hybrid(build_index());

        let recs = hybrid.recommend_weighted(1, 4, false, 1.0).unwrap();
        let ids: Vec<u32> = recs.iter().map(|r| r.destination_id).collect();
        // Eco scores: 2 (9.0) > 4 (7.0) > 3 (5.0) > 1 (3.0)
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_weight_is_a_pure_parameter() {
        let hybrid = fitted_hybrid(build_index());
        let default_weight = hybrid.config().default_sustainability_weight;

        let before = hybrid.recommend_weighted(1, 4, false, default_weight).unwrap();
        // An extreme weight in between must not leak into later calls
        let _ = hybrid.recommend_weighted(1, 4, false, 1.0).unwrap();
        let after = hybrid.recommend_weighted(1, 4, false, default_weight).unwrap();

        let ids = |recs: &[Recommendation]| {
            recs.iter().map(|r| r.destination_id).collect::<Vec<_>>()
        };
        assert_eq!(ids(&before), ids(&after));
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.final_score, b.final_score);
        }
    }

    #[test]
    fn test_sources_are_attributed() {
        let hybrid = fitted_hybrid(build_index());

        let recs = hybrid.recommend_weighted(1, 4, false, 0.0).unwrap();
        // Every destination is scored by content and neural at minimum; at
        // least one strategy must be attributed on each result.
        for rec in &recs {
            assert!(
                !rec.sources.is_empty(),
                "destination {} has no attributed sources",
                rec.destination_id
            );
        }
    }

    #[test]
    fn test_empty_catalog_yields_no_recommendations_error() {
        let mut index = TravelIndex::new();
        index.insert_user(user(1, vec![]));
        index.build_secondary_indices();
        index.build_interactions();
        let hybrid = fitted_hybrid(Arc::new(index));

        let result = hybrid.recommend_weighted(1, 5, false, 0.3);
        assert!(matches!(result, Err(RecommendError::NoRecommendations)));
    }

    #[test]
    fn test_unknown_user_is_an_error() {
        let hybrid = fitted_hybrid(build_index());
        let result = hybrid.recommend_weighted(404, 3, false, 0.3);
        assert!(matches!(result, Err(RecommendError::UnknownUser(404))));
    }

    #[test]
    fn test_min_max_normalize() {
        assert_eq!(min_max_normalize(&[2.0, 4.0, 6.0]), vec![0.0, 0.5, 1.0]);
        assert_eq!(min_max_normalize(&[3.0, 3.0]), vec![0.0, 0.0]);
    }
}
