//! Error types shared by all recommendation strategies.

use data_loader::{DataError, DestinationId, UserId};
use thiserror::Error;

/// Errors a recommender can produce.
///
/// "Zero eligible destinations after exclusion" is NOT an error; it is a
/// valid empty result. `NoRecommendations` is reserved for the case where no
/// strategy can produce candidates at all (e.g., an empty destination table).
#[derive(Error, Debug)]
pub enum RecommendError {
    /// User id is absent from the Users table
    #[error("Unknown user id {0}")]
    UnknownUser(UserId),

    /// Destination id is absent from the Destinations table
    #[error("Unknown destination id {0}")]
    UnknownDestination(DestinationId),

    /// recommend() was invoked before fit()
    #[error("Model has not been trained; call fit() first")]
    ModelNotTrained,

    /// Every strategy returned an empty candidate set
    #[error("No strategy produced any candidates")]
    NoRecommendations,

    /// Underlying catalog problem
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
