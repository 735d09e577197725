//! Core domain types for the travel catalog.
//!
//! This module defines the three immutable tables (users, destinations,
//! activities) and the `TravelIndex` that holds them together with the
//! user–destination interaction matrix. Row order in each table doubles as
//! the dense integer index used for matrix alignment.

use crate::matrix::InteractionMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with
// destination IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a destination
pub type DestinationId = u32;

/// Unique identifier for an activity
pub type ActivityId = u32;

// =============================================================================
// User-related Types
// =============================================================================

/// Represents a traveler profile.
///
/// `travel_history` holds the ids of destinations the user has visited and is
/// the source of the interaction matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Age bracket label, e.g. "25-34"
    pub age_group: String,
    /// Declared interest tags, e.g. "Nature", "Culture"
    pub interests: Vec<String>,
    /// How much the user cares about eco-friendly travel (0-10)
    pub sustainability_preference: f32,
    /// Travel style label, e.g. "Eco-conscious", "Budget"
    pub travel_style: String,
    /// Budget tier from 1 (thrifty) to 5 (luxury)
    pub budget_level: u8,
    /// Destinations previously visited
    pub travel_history: Vec<DestinationId>,
}

// =============================================================================
// Destination-related Types
// =============================================================================

/// The five sustainability sub-metrics tracked per destination, each 0-10.
///
/// A `None` means the metric was not recorded for this destination. Consumers
/// impute the dataset-wide mean rather than zero, so incomplete records are
/// not penalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SustainabilityMetrics {
    pub carbon_footprint: Option<f32>,
    pub water_consumption: Option<f32>,
    pub waste_management: Option<f32>,
    pub biodiversity_impact: Option<f32>,
    pub local_economy_support: Option<f32>,
}

impl SustainabilityMetrics {
    /// Look up a sub-metric by kind.
    pub fn get(&self, kind: MetricKind) -> Option<f32> {
        match kind {
            MetricKind::CarbonFootprint => self.carbon_footprint,
            MetricKind::WaterConsumption => self.water_consumption,
            MetricKind::WasteManagement => self.waste_management,
            MetricKind::BiodiversityImpact => self.biodiversity_impact,
            MetricKind::LocalEconomySupport => self.local_economy_support,
        }
    }
}

/// The fixed set of sustainability sub-metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    CarbonFootprint,
    WaterConsumption,
    WasteManagement,
    BiodiversityImpact,
    LocalEconomySupport,
}

impl MetricKind {
    /// All sub-metrics, in canonical order.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::CarbonFootprint,
        MetricKind::WaterConsumption,
        MetricKind::WasteManagement,
        MetricKind::BiodiversityImpact,
        MetricKind::LocalEconomySupport,
    ];

    /// Human-readable label used in explanations.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::CarbonFootprint => "Carbon Footprint",
            MetricKind::WaterConsumption => "Water Management",
            MetricKind::WasteManagement => "Waste Management",
            MetricKind::BiodiversityImpact => "Biodiversity Impact",
            MetricKind::LocalEconomySupport => "Local Economy Support",
        }
    }
}

/// Represents a travel destination and its sustainability record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    pub country: String,
    pub region: String,
    /// Climate label, e.g. "Mediterranean"
    pub climate: String,
    /// Landscape label, e.g. "Beach", "Mountain"
    pub landscape_type: String,
    /// Primary activity category, e.g. "Nature", "Cultural"
    pub category: String,
    pub metrics: SustainabilityMetrics,
    /// Aggregate score as stored in the dataset (0-10). The scorer's weighted
    /// aggregate of `metrics` is the authoritative value; this field is only
    /// range-checked at load.
    pub overall_sustainability_score: Option<f32>,
    /// Low-impact ways of getting around, e.g. "Public Transit"
    pub transportation_options: Vec<String>,
    /// Certifications held, e.g. "Green Globe". Normalized to a list at the
    /// parse boundary regardless of how the source encoded it.
    pub eco_certifications: Vec<String>,
}

// =============================================================================
// Activity Type
// =============================================================================

/// An activity offered at a destination. Many activities per destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub description: String,
    /// Activity category, e.g. "Adventure", "Cultural"
    pub category: String,
    /// Destination this activity belongs to
    pub destination_id: DestinationId,
    /// How eco-friendly the activity is (0-10)
    pub eco_friendliness: f32,
}

// =============================================================================
// TravelIndex - The Core In-Memory Catalog
// =============================================================================

/// Main data structure that holds all tables and indices.
///
/// This is the heart of the data-loader crate. It is constructed once at
/// startup, then shared read-only (typically behind an `Arc`) by every
/// recommender and by the explainability and evaluation layers. Vec position
/// in `users`/`destinations` is the dense index used by the interaction
/// matrix.
#[derive(Debug)]
pub struct TravelIndex {
    // Primary data stores, in dense-index order
    pub(crate) users: Vec<User>,
    pub(crate) destinations: Vec<Destination>,
    pub(crate) activities: Vec<Activity>,

    // Id -> dense index maps
    pub(crate) user_positions: HashMap<UserId, usize>,
    pub(crate) destination_positions: HashMap<DestinationId, usize>,

    // Secondary indices for specialized queries
    /// Activity positions grouped by destination
    pub(crate) activities_by_destination: HashMap<DestinationId, Vec<usize>>,
    /// Destination dense indices grouped by country
    pub(crate) country_index: HashMap<String, Vec<usize>>,

    /// Dense users x destinations engagement matrix
    pub(crate) interactions: InteractionMatrix,
}

impl TravelIndex {
    /// Creates a new, empty TravelIndex
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            destinations: Vec::new(),
            activities: Vec::new(),
            user_positions: HashMap::new(),
            destination_positions: HashMap::new(),
            activities_by_destination: HashMap::new(),
            country_index: HashMap::new(),
            interactions: InteractionMatrix::zeros(0, 0),
        }
    }

    // Getters - these return references, never owned copies of table rows

    /// Get a user by id
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.user_positions.get(&id).map(|&i| &self.users[i])
    }

    /// Dense matrix row index for a user id
    pub fn user_index(&self, id: UserId) -> Option<usize> {
        self.user_positions.get(&id).copied()
    }

    /// User at a dense index
    pub fn user_by_index(&self, index: usize) -> Option<&User> {
        self.users.get(index)
    }

    /// Get a destination by id
    pub fn destination(&self, id: DestinationId) -> Option<&Destination> {
        self.destination_positions.get(&id).map(|&i| &self.destinations[i])
    }

    /// Dense matrix column index for a destination id
    pub fn destination_index(&self, id: DestinationId) -> Option<usize> {
        self.destination_positions.get(&id).copied()
    }

    /// Destination at a dense index
    pub fn destination_by_index(&self, index: usize) -> Option<&Destination> {
        self.destinations.get(index)
    }

    /// All users in dense-index order
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// All destinations in dense-index order
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// All activities
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// All activities offered at a destination
    pub fn activities_for(&self, destination_id: DestinationId) -> Vec<&Activity> {
        self.activities_by_destination
            .get(&destination_id)
            .map(|positions| positions.iter().map(|&i| &self.activities[i]).collect())
            .unwrap_or_default()
    }

    /// Dense indices of all destinations in a country
    pub fn destinations_in_country(&self, country: &str) -> &[usize] {
        self.country_index
            .get(country)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The user-destination interaction matrix
    pub fn interactions(&self) -> &InteractionMatrix {
        &self.interactions
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_destinations(&self) -> usize {
        self.destinations.len()
    }

    // Mutators - used during loading and by test fixtures

    /// Insert a user into the index
    pub fn insert_user(&mut self, user: User) {
        self.user_positions.insert(user.id, self.users.len());
        self.users.push(user);
    }

    /// Insert a destination into the index
    pub fn insert_destination(&mut self, destination: Destination) {
        self.destination_positions
            .insert(destination.id, self.destinations.len());
        self.destinations.push(destination);
    }

    /// Insert an activity into the index
    pub fn insert_activity(&mut self, activity: Activity) {
        self.activities_by_destination
            .entry(activity.destination_id)
            .or_default()
            .push(self.activities.len());
        self.activities.push(activity);
    }

    /// Record an engagement signal, overriding the default visit strength.
    ///
    /// Call after `build_interactions`. Unknown ids are ignored with a reason
    /// to prefer loud failure at the load boundary instead: this method is a
    /// fixture/ingestion convenience, so it returns whether the cell existed.
    pub fn record_interaction(
        &mut self,
        user_id: UserId,
        destination_id: DestinationId,
        strength: f32,
    ) -> bool {
        match (
            self.user_positions.get(&user_id).copied(),
            self.destination_positions.get(&destination_id).copied(),
        ) {
            (Some(u), Some(d)) => {
                self.interactions.set(u, d, strength);
                true
            }
            _ => false,
        }
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.destinations.len(), self.activities.len())
    }
}

impl Default for TravelIndex {
    fn default() -> Self {
        Self::new()
    }
}
