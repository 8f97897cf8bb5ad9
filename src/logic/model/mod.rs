//! Model Module - MLlib model engines
//!
//! Loading saved model directories, hot reload through `ModelHost`, and the
//! models the operators score against.

pub mod clustering;
pub mod host;
pub mod loader;
pub mod recommendation;
pub mod regression;
pub mod scoring;


// Re-export common types
pub use clustering::KMeansModel;
pub use host::{LoadedModel, ModelHandle, ModelHost};
pub use loader::{load_model, save_model, MllibModel, ModelMetadata};
pub use recommendation::{FactorRow, MatrixFactorizationData, MatrixFactorizationModel};
pub use regression::{LinearRegressionModel, LogisticRegressionModel};
pub use scoring::{Rating, Recommender, VectorScorer};
