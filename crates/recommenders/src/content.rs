//! Content-based recommendation over destination features.
//!
//! Each destination becomes a feature vector:
//! one-hot category + one-hot landscape + one-hot climate +
//! min-max-normalized sustainability sub-metrics + a histogram of the
//! activity categories offered there.
//!
//! The user profile is the mean of the vectors of destinations they
//! interacted with positively. Users without history get a profile derived
//! from their declared interests and sustainability preference instead.
//! Scoring is cosine similarity between profile and destination vectors.

use crate::error::{RecommendError, Result};
use crate::traits::{Recommender, cosine_similarity};
use data_loader::{DataError, Destination, InteractionMatrix, MetricKind, TravelIndex, User};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed feature layout shared by all destination vectors.
///
/// Vocabularies are sorted so the layout is stable for a given catalog.
struct FeatureSpace {
    categories: Vec<String>,
    landscapes: Vec<String>,
    climates: Vec<String>,
    activity_categories: Vec<String>,
    /// One vector per dense destination index
    vectors: Vec<Vec<f32>>,
}

impl FeatureSpace {
    fn dimension(&self) -> usize {
        self.categories.len()
            + self.landscapes.len()
            + self.climates.len()
            + MetricKind::ALL.len()
            + self.activity_categories.len()
    }

    /// Offset of the normalized sustainability block
    fn metrics_offset(&self) -> usize {
        self.categories.len() + self.landscapes.len() + self.climates.len()
    }
}

/// Content-based recommendation strategy.
pub struct ContentBasedRecommender {
    index: Arc<TravelIndex>,
    features: Option<FeatureSpace>,
}

impl ContentBasedRecommender {
    pub fn new(index: Arc<TravelIndex>) -> Self {
        Self {
            index,
            features: None,
        }
    }

    fn build_feature_space(&self) -> FeatureSpace {
        let index = &self.index;

        let sorted = |values: BTreeSet<String>| values.into_iter().collect::<Vec<_>>();
        let categories = sorted(
            index
                .destinations()
                .iter()
                .map(|d| d.category.clone())
                .collect(),
        );
        let landscapes = sorted(
            index
                .destinations()
                .iter()
                .map(|d| d.landscape_type.clone())
                .collect(),
        );
        let climates = sorted(
            index
                .destinations()
                .iter()
                .filter(|d| !d.climate.is_empty())
                .map(|d| d.climate.clone())
                .collect(),
        );
        let activity_categories = sorted(
            index
                .activities()
                .iter()
                .map(|a| a.category.clone())
                .collect(),
        );

        // Min-max bounds and means per sub-metric for normalization and
        // imputation
        let mut bounds: HashMap<MetricKind, (f32, f32)> = HashMap::new();
        let mut means: HashMap<MetricKind, f32> = HashMap::new();
        for kind in MetricKind::ALL {
            let values: Vec<f32> = index
                .destinations()
                .iter()
                .filter_map(|d| d.metrics.get(kind))
                .collect();
            if values.is_empty() {
                continue;
            }
            let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
            let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            bounds.insert(kind, (lo, hi));
            means.insert(kind, values.iter().sum::<f32>() / values.len() as f32);
        }

        let mut space = FeatureSpace {
            categories,
            landscapes,
            climates,
            activity_categories,
            vectors: Vec::new(),
        };

        let vectors: Vec<Vec<f32>> = index
            .destinations()
            .iter()
            .map(|d| self.destination_vector(&space, &bounds, &means, d))
            .collect();
        space.vectors = vectors;

        space
    }

    fn destination_vector(
        &self,
        space: &FeatureSpace,
        bounds: &HashMap<MetricKind, (f32, f32)>,
        means: &HashMap<MetricKind, f32>,
        destination: &Destination,
    ) -> Vec<f32> {
        let mut vector = vec![0.0f32; space.dimension()];
        let mut offset = 0;

        if let Ok(pos) = space.categories.binary_search(&destination.category) {
            vector[offset + pos] = 1.0;
        }
        offset += space.categories.len();

        if let Ok(pos) = space.landscapes.binary_search(&destination.landscape_type) {
            vector[offset + pos] = 1.0;
        }
        offset += space.landscapes.len();

        if let Ok(pos) = space.climates.binary_search(&destination.climate) {
            vector[offset + pos] = 1.0;
        }
        offset += space.climates.len();

        for (i, kind) in MetricKind::ALL.iter().enumerate() {
            let value = destination
                .metrics
                .get(*kind)
                .or_else(|| means.get(kind).copied())
                .unwrap_or(5.0);
            vector[offset + i] = match bounds.get(kind) {
                Some(&(lo, hi)) if hi > lo => (value - lo) / (hi - lo),
                // Constant or unrecorded metric carries no signal spread
                _ => 0.5,
            };
        }
        offset += MetricKind::ALL.len();

        let activities = self.index.activities_for(destination.id);
        if !activities.is_empty() {
            let total = activities.len() as f32;
            for activity in activities {
                if let Ok(pos) = space.activity_categories.binary_search(&activity.category) {
                    vector[offset + pos] += 1.0 / total;
                }
            }
        }

        vector
    }

    /// Profile for a user with history: mean of the vectors of positively
    /// interacted destinations.
    fn profile_from_history(&self, space: &FeatureSpace, visited: &[usize]) -> Vec<f32> {
        let mut profile = vec![0.0f32; space.dimension()];
        for &dest_idx in visited {
            for (slot, value) in profile.iter_mut().zip(&space.vectors[dest_idx]) {
                *slot += value;
            }
        }
        for slot in &mut profile {
            *slot /= visited.len() as f32;
        }
        profile
    }

    /// Cold-start profile built from the user's declared interests and
    /// sustainability preference.
    fn profile_from_declared_preferences(&self, space: &FeatureSpace, user: &User) -> Vec<f32> {
        let mut profile = vec![0.0f32; space.dimension()];

        let matches = |vocab: &[String], interest: &str| {
            vocab
                .iter()
                .position(|v| v.eq_ignore_ascii_case(interest))
        };

        for interest in &user.interests {
            let mut offset = 0;
            if let Some(pos) = matches(&space.categories, interest) {
                profile[offset + pos] = 1.0;
            }
            offset += space.categories.len();
            if let Some(pos) = matches(&space.landscapes, interest) {
                profile[offset + pos] = 1.0;
            }
            offset += space.landscapes.len();
            if let Some(pos) = matches(&space.climates, interest) {
                profile[offset + pos] = 1.0;
            }
            offset += space.climates.len() + MetricKind::ALL.len();
            if let Some(pos) = matches(&space.activity_categories, interest) {
                profile[offset + pos] = 1.0;
            }
        }

        // The sustainability block mirrors how much the user cares
        let metrics_offset = space.metrics_offset();
        let preference = (user.sustainability_preference / 10.0).clamp(0.0, 1.0);
        for i in 0..MetricKind::ALL.len() {
            profile[metrics_offset + i] = preference;
        }

        profile
    }
}

impl Recommender for ContentBasedRecommender {
    fn name(&self) -> &str {
        "content"
    }

    fn index(&self) -> &Arc<TravelIndex> {
        &self.index
    }

    fn fit(&mut self) -> Result<()> {
        let space = self.build_feature_space();
        info!(
            "Built content feature space: {} destinations x {} features",
            space.vectors.len(),
            space.dimension()
        );
        self.features = Some(space);
        Ok(())
    }

    fn score_destinations(
        &self,
        user_idx: usize,
        interactions: &InteractionMatrix,
    ) -> Result<Vec<f32>> {
        let space = self.features.as_ref().ok_or(RecommendError::ModelNotTrained)?;

        let visited = interactions.visited_indices(user_idx);
        let profile = if visited.is_empty() {
            let user = self.index.user_by_index(user_idx).ok_or_else(|| {
                RecommendError::Data(DataError::Validation(format!(
                    "user index {} outside catalog ({} users)",
                    user_idx,
                    self.index.num_users()
                )))
            })?;
            debug!(
                "User {} has no history; deriving profile from declared interests",
                user.id
            );
            self.profile_from_declared_preferences(space, user)
        } else {
            self.profile_from_history(space, &visited)
        };

        Ok(space
            .vectors
            .iter()
            .map(|vector| cosine_similarity(&profile, vector))
            .collect())
    }
}
