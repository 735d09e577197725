//! TravelIndex building and validation.
//!
//! This module assembles the catalog from the three persisted tables:
//! parse everything, build the id maps and secondary indices, derive the
//! interaction matrix from travel histories, then validate referential
//! integrity. Any failure here is fatal; the system never serves from a
//! partial catalog.

use crate::error::{DataError, Result};
use crate::matrix::InteractionMatrix;
use crate::parser;
use crate::types::{MetricKind, TravelIndex};
use std::path::Path;
use tracing::info;

impl TravelIndex {
    /// Load the full catalog from a directory containing `users.json`,
    /// `destinations.json`, and `activities.json`.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading travel catalog from {:?}", data_dir);

        let users_path = data_dir.join("users.json");
        let destinations_path = data_dir.join("destinations.json");
        let activities_path = data_dir.join("activities.json");

        // Parse all three files in parallel; nested joins give three-way
        // parallelism.
        let ((users, destinations), activities) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_destinations(&destinations_path),
                )
            },
            || parser::parse_activities(&activities_path),
        );

        let users = users?;
        let destinations = destinations?;
        let activities = activities?;

        info!(
            "Loaded {} users, {} destinations, {} activities",
            users.len(),
            destinations.len(),
            activities.len()
        );

        let mut index = TravelIndex::new();
        for destination in destinations {
            index.insert_destination(destination);
        }
        for user in users {
            index.insert_user(user);
        }
        for activity in activities {
            index.insert_activity(activity);
        }

        index.build_secondary_indices();
        index.build_interactions();
        index.validate()?;

        info!("TravelIndex built and validated");
        Ok(index)
    }

    /// Build the country index after primary data is loaded.
    pub fn build_secondary_indices(&mut self) {
        self.country_index.clear();
        for (dest_idx, destination) in self.destinations.iter().enumerate() {
            self.country_index
                .entry(destination.country.clone())
                .or_default()
                .push(dest_idx);
        }
    }

    /// Derive the interaction matrix from user travel histories.
    ///
    /// Each visited destination becomes a 1.0 engagement signal. Ingestion
    /// pipelines with richer signals can upgrade individual cells afterwards
    /// via [`TravelIndex::record_interaction`].
    pub fn build_interactions(&mut self) {
        let mut matrix = InteractionMatrix::zeros(self.users.len(), self.destinations.len());
        for (user_idx, user) in self.users.iter().enumerate() {
            for destination_id in &user.travel_history {
                if let Some(&dest_idx) = self.destination_positions.get(destination_id) {
                    matrix.set(user_idx, dest_idx, 1.0);
                }
            }
        }
        self.interactions = matrix;
    }

    /// Validate catalog integrity.
    ///
    /// Checks:
    /// - ids are unique within each table
    /// - travel histories and activities reference existing destinations
    /// - every score-like field is inside its documented range
    pub fn validate(&self) -> Result<()> {
        if self.user_positions.len() != self.users.len() {
            return Err(DataError::Validation("duplicate user ids".to_string()));
        }
        if self.destination_positions.len() != self.destinations.len() {
            return Err(DataError::Validation(
                "duplicate destination ids".to_string(),
            ));
        }

        for user in &self.users {
            if !(0.0..=10.0).contains(&user.sustainability_preference) {
                return Err(DataError::InvalidValue {
                    field: "sustainability_preference".to_string(),
                    value: user.sustainability_preference.to_string(),
                });
            }
            if !(1..=5).contains(&user.budget_level) {
                return Err(DataError::InvalidValue {
                    field: "budget_level".to_string(),
                    value: user.budget_level.to_string(),
                });
            }
            for destination_id in &user.travel_history {
                if !self.destination_positions.contains_key(destination_id) {
                    return Err(DataError::MissingReference {
                        entity: "Destination".to_string(),
                        id: *destination_id,
                    });
                }
            }
        }

        for destination in &self.destinations {
            for kind in MetricKind::ALL {
                if let Some(value) = destination.metrics.get(kind) {
                    if !(0.0..=10.0).contains(&value) {
                        return Err(DataError::InvalidValue {
                            field: kind.label().to_string(),
                            value: value.to_string(),
                        });
                    }
                }
            }
            if let Some(overall) = destination.overall_sustainability_score {
                if !(0.0..=10.0).contains(&overall) {
                    return Err(DataError::InvalidValue {
                        field: "overall_sustainability_score".to_string(),
                        value: overall.to_string(),
                    });
                }
            }
        }

        for activity in &self.activities {
            if !self
                .destination_positions
                .contains_key(&activity.destination_id)
            {
                return Err(DataError::MissingReference {
                    entity: "Destination".to_string(),
                    id: activity.destination_id,
                });
            }
            if !(0.0..=10.0).contains(&activity.eco_friendliness) {
                return Err(DataError::InvalidValue {
                    field: "eco_friendliness".to_string(),
                    value: activity.eco_friendliness.to_string(),
                });
            }
        }

        Ok(())
    }
}
