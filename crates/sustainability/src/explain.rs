//! Human-readable sustainability explanations.
//!
//! Produces a per-destination profile: the five sub-metric readings, how the
//! destination compares against its country and the whole catalog, and which
//! metrics count as strengths or weaknesses under configurable thresholds.

use crate::scorer::SustainabilityScorer;
use data_loader::{DataError, DestinationId, MetricKind, TravelIndex};
use serde::Serialize;
use std::sync::Arc;

/// Thresholds used when classifying metrics in explanations.
///
/// These are tuning knobs, not fixed behavior: a metric at or above
/// `strength_threshold` is reported as a strength, at or below
/// `weakness_threshold` as a weakness, and a counterfactual delta of at
/// least `improvement_threshold` marks an improvement area.
#[derive(Debug, Clone, Copy)]
pub struct ExplainerConfig {
    pub strength_threshold: f32,
    pub weakness_threshold: f32,
    pub improvement_threshold: f32,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            strength_threshold: 7.0,
            weakness_threshold: 4.0,
            improvement_threshold: 2.0,
        }
    }
}

/// One sub-metric reading inside a profile.
#[derive(Debug, Clone, Serialize)]
pub struct MetricReading {
    pub kind: MetricKind,
    pub value: f32,
    /// True when the destination did not record this metric and the value is
    /// the dataset mean.
    pub imputed: bool,
}

/// Full sustainability profile for one destination.
#[derive(Debug, Clone, Serialize)]
pub struct SustainabilityProfile {
    pub destination_id: DestinationId,
    pub name: String,
    pub country: String,
    pub overall_score: f32,
    pub metrics: Vec<MetricReading>,
    /// Country averages; `None` when the destination is the only one in its
    /// country and a comparison would be vacuous.
    pub country_metrics: Option<Vec<MetricReading>>,
    pub global_metrics: Vec<MetricReading>,
    pub transportation_options: Vec<String>,
    pub certifications: Vec<String>,
    pub strengths: Vec<MetricKind>,
    pub weaknesses: Vec<MetricKind>,
}

/// Generates sustainability rationale for recommended destinations.
pub struct RecommendationExplainer {
    pub(crate) index: Arc<TravelIndex>,
    pub(crate) scorer: SustainabilityScorer,
    pub(crate) config: ExplainerConfig,
}

impl RecommendationExplainer {
    pub fn new(index: Arc<TravelIndex>) -> Self {
        Self {
            scorer: SustainabilityScorer::new(index.clone()),
            index,
            config: ExplainerConfig::default(),
        }
    }

    pub fn with_config(index: Arc<TravelIndex>, config: ExplainerConfig) -> Self {
        Self {
            scorer: SustainabilityScorer::new(index.clone()),
            index,
            config,
        }
    }

    /// Build the sustainability profile for a destination.
    pub fn explain_sustainability(
        &self,
        destination_id: DestinationId,
    ) -> Result<SustainabilityProfile, DataError> {
        let destination = self
            .index
            .destination(destination_id)
            .ok_or(DataError::UnknownDestination(destination_id))?;

        let metrics: Vec<MetricReading> = MetricKind::ALL
            .iter()
            .map(|&kind| MetricReading {
                kind,
                value: self.scorer.metric_value(destination, kind),
                imputed: destination.metrics.get(kind).is_none(),
            })
            .collect();

        let strengths = metrics
            .iter()
            .filter(|m| m.value >= self.config.strength_threshold)
            .map(|m| m.kind)
            .collect();
        let weaknesses = metrics
            .iter()
            .filter(|m| m.value <= self.config.weakness_threshold)
            .map(|m| m.kind)
            .collect();

        Ok(SustainabilityProfile {
            destination_id,
            name: destination.name.clone(),
            country: destination.country.clone(),
            overall_score: self.scorer.score_destination(destination),
            metrics,
            country_metrics: self.country_averages(&destination.country),
            global_metrics: self.global_averages(),
            transportation_options: destination.transportation_options.clone(),
            certifications: destination.eco_certifications.clone(),
            strengths,
            weaknesses,
        })
    }

    /// Per-metric averages over destinations in a country. Only meaningful
    /// when the country has more than one destination.
    fn country_averages(&self, country: &str) -> Option<Vec<MetricReading>> {
        let indices = self.index.destinations_in_country(country);
        if indices.len() <= 1 {
            return None;
        }

        Some(
            MetricKind::ALL
                .iter()
                .map(|&kind| {
                    let values: Vec<f32> = indices
                        .iter()
                        .filter_map(|&i| self.index.destination_by_index(i))
                        .filter_map(|d| d.metrics.get(kind))
                        .collect();
                    let value = if values.is_empty() {
                        self.scorer.dataset_mean(kind)
                    } else {
                        values.iter().sum::<f32>() / values.len() as f32
                    };
                    MetricReading {
                        kind,
                        value,
                        imputed: false,
                    }
                })
                .collect(),
        )
    }

    /// Catalog-wide per-metric averages.
    fn global_averages(&self) -> Vec<MetricReading> {
        MetricKind::ALL
            .iter()
            .map(|&kind| MetricReading {
                kind,
                value: self.scorer.dataset_mean(kind),
                imputed: false,
            })
            .collect()
    }

    /// The scorer backing this explainer
    pub fn scorer(&self) -> &SustainabilityScorer {
        &self.scorer
    }
}

/// Describe which recommendation strategies contributed to a recommendation.
pub fn explain_sources(source_names: &[String]) -> String {
    if source_names.is_empty() {
        return "No source information available for this recommendation.".to_string();
    }
    format!(
        "This recommendation comes from the following recommendation methods: {}",
        source_names.join(", ")
    )
}
