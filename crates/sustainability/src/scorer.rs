//! Composite eco-friendliness scoring.
//!
//! The scorer turns a destination's five sustainability sub-metrics into a
//! single 0-10 score via a weighted sum. It is pure: the same catalog and
//! weights always produce the same score, and nothing is cached between
//! calls beyond the dataset means computed at construction.

use data_loader::{DataError, Destination, MetricKind, TravelIndex};
use std::collections::HashMap;
use std::sync::Arc;

/// Relative weight of each sub-metric in the composite score.
///
/// The defaults sum to 1.0, which keeps the composite on the same 0-10 scale
/// as the inputs.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub carbon_footprint: f32,
    pub water_consumption: f32,
    pub waste_management: f32,
    pub biodiversity_impact: f32,
    pub local_economy_support: f32,
}

impl ScoringWeights {
    /// Weight for a given sub-metric
    pub fn for_metric(&self, kind: MetricKind) -> f32 {
        match kind {
            MetricKind::CarbonFootprint => self.carbon_footprint,
            MetricKind::WaterConsumption => self.water_consumption,
            MetricKind::WasteManagement => self.waste_management,
            MetricKind::BiodiversityImpact => self.biodiversity_impact,
            MetricKind::LocalEconomySupport => self.local_economy_support,
        }
    }

    /// Sum of all weights; expected to be 1.0
    pub fn total(&self) -> f32 {
        MetricKind::ALL.iter().map(|&k| self.for_metric(k)).sum()
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            carbon_footprint: 0.25,
            water_consumption: 0.20,
            waste_management: 0.20,
            biodiversity_impact: 0.20,
            local_economy_support: 0.15,
        }
    }
}

/// Computes composite sustainability scores for destinations.
pub struct SustainabilityScorer {
    index: Arc<TravelIndex>,
    weights: ScoringWeights,
    /// Dataset-wide mean of each sub-metric over the destinations that
    /// record it; used to impute missing values.
    metric_means: HashMap<MetricKind, f32>,
}

impl SustainabilityScorer {
    /// Create a scorer with the default weights.
    pub fn new(index: Arc<TravelIndex>) -> Self {
        Self::with_weights(index, ScoringWeights::default())
    }

    /// Create a scorer with custom weights.
    pub fn with_weights(index: Arc<TravelIndex>, weights: ScoringWeights) -> Self {
        let metric_means = compute_metric_means(&index);
        Self {
            index,
            weights,
            metric_means,
        }
    }

    /// Composite score for a destination id, in [0, 10].
    pub fn score(&self, destination_id: data_loader::DestinationId) -> Result<f32, DataError> {
        let destination = self
            .index
            .destination(destination_id)
            .ok_or(DataError::UnknownDestination(destination_id))?;
        Ok(self.score_destination(destination))
    }

    /// Composite score for an already-resolved destination row.
    pub fn score_destination(&self, destination: &Destination) -> f32 {
        MetricKind::ALL
            .iter()
            .map(|&kind| self.weights.for_metric(kind) * self.metric_value(destination, kind))
            .sum()
    }

    /// A single sub-metric value, with missing readings imputed to the
    /// dataset mean so incomplete records are not treated as worst-case.
    pub fn metric_value(&self, destination: &Destination, kind: MetricKind) -> f32 {
        destination
            .metrics
            .get(kind)
            .unwrap_or_else(|| self.dataset_mean(kind))
    }

    /// Dataset-wide mean for a sub-metric. Mid-scale when no destination
    /// records the metric at all.
    pub fn dataset_mean(&self, kind: MetricKind) -> f32 {
        self.metric_means.get(&kind).copied().unwrap_or(5.0)
    }

    /// Per-metric breakdown plus the composite, for a destination id.
    pub fn detailed_scores(
        &self,
        destination_id: data_loader::DestinationId,
    ) -> Result<(Vec<(MetricKind, f32)>, f32), DataError> {
        let destination = self
            .index
            .destination(destination_id)
            .ok_or(DataError::UnknownDestination(destination_id))?;
        let per_metric = MetricKind::ALL
            .iter()
            .map(|&kind| (kind, self.metric_value(destination, kind)))
            .collect();
        Ok((per_metric, self.score_destination(destination)))
    }

    /// Composite score per dense destination index, catalog order.
    pub fn scores_by_index(&self) -> Vec<f32> {
        self.index
            .destinations()
            .iter()
            .map(|d| self.score_destination(d))
            .collect()
    }

    /// The catalog this scorer reads from
    pub fn index(&self) -> &Arc<TravelIndex> {
        &self.index
    }
}

/// Linear sustainability weighting of a relevance score.
///
/// Both inputs are expected in [0, 1]; `weight` = 0 keeps pure relevance,
/// `weight` = 1 ranks on sustainability alone.
pub fn blend_scores(base_score: f32, sustainability_normalized: f32, weight: f32) -> f32 {
    (1.0 - weight) * base_score + weight * sustainability_normalized
}

fn compute_metric_means(index: &TravelIndex) -> HashMap<MetricKind, f32> {
    let mut means = HashMap::new();
    for kind in MetricKind::ALL {
        let values: Vec<f32> = index
            .destinations()
            .iter()
            .filter_map(|d| d.metrics.get(kind))
            .collect();
        if !values.is_empty() {
            means.insert(kind, values.iter().sum::<f32>() / values.len() as f32);
        }
    }
    means
}
