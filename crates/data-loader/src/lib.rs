//! # Data Loader Crate
//!
//! Loads and indexes the travel catalog: the Users, Destinations, and
//! Activities tables plus the user-destination interaction matrix derived
//! from travel histories.
//!
//! The central type is [`TravelIndex`], the context object every other
//! component receives at construction (typically behind an `Arc`). Tables
//! are immutable after load; the interaction matrix is only ever read during
//! scoring, and hold-out evaluation works on masked copies rather than
//! mutating shared state.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::TravelIndex;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let index = Arc::new(TravelIndex::load_from_files(Path::new("data/processed"))?);
//! let user = index.user(42).expect("user exists");
//! let matrix = index.interactions();
//! ```

pub mod error;
pub mod index;
pub mod matrix;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use error::{DataError, Result};
pub use matrix::InteractionMatrix;
pub use types::{
    Activity, ActivityId, Destination, DestinationId, MetricKind, SustainabilityMetrics,
    TravelIndex, User, UserId,
};
