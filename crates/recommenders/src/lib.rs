//! # Recommenders Crate
//!
//! The three recommendation strategies and the contract they share.
//!
//! ## Components
//!
//! ### Collaborative Filtering
//! "Travelers like you also went to..." — cosine similarity over interaction
//! matrix rows (or columns, for the item-based variant), with a
//! population-average fallback for users without history.
//!
//! ### Content-Based
//! Destination feature vectors (category, landscape, climate, normalized
//! sustainability metrics, activity-category histogram) matched against a
//! user profile averaged from their history, or derived from declared
//! interests on cold start.
//!
//! ### Neural CF
//! Learned user/destination embeddings through a small feed-forward network
//! with a sigmoid affinity output, trained in-process on implicit labels.
//!
//! ## The contract
//!
//! Every strategy implements [`Recommender`]; scores come back per dense
//! destination index and ranking is shared, so all strategies obey the same
//! ordering rules (descending score, ties by destination id). The hybrid
//! combiner in the `engine` crate composes them statically.
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommenders::{CollaborativeFilteringRecommender, Recommender};
//!
//! let mut cf = CollaborativeFilteringRecommender::new(index.clone());
//! cf.fit()?;
//! let top5 = cf.recommend(user_id, 5, true)?;
//! ```

pub mod collaborative;
pub mod content;
pub mod error;
pub mod neural;
pub mod traits;

// Re-export commonly used types
pub use collaborative::{CfMethod, CollaborativeFilteringRecommender, DEFAULT_TOP_K_USERS};
pub use content::ContentBasedRecommender;
pub use error::{RecommendError, Result};
pub use neural::{NeuralCfArtifact, NeuralCfConfig, NeuralCfRecommender};
pub use traits::{Recommender, ScoredDestination, cosine_similarity, rank_destinations};
