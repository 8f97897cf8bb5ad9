//! Scoring traits implemented by the models

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::logic::error::ScoringError;

/// Rating triple returned by recommendations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user: i32,
    pub product: i32,
    pub rating: f64,
}

/// list<float64> -> float64 analytics
pub trait VectorScorer {
    fn score(&self, features: &Array1<f64>) -> Result<f64, ScoringError>;
}

/// Collaborative filtering operations
pub trait Recommender {
    fn predict(&self, user: i32, product: i32) -> Result<f64, ScoringError>;

    /// Top `num` products for `user`, best first
    fn recommend_products(&self, user: i32, num: i32) -> Result<Vec<Rating>, ScoringError>;

    /// Top `num` users for `product`, best first
    fn recommend_users(&self, product: i32, num: i32) -> Result<Vec<Rating>, ScoringError>;
}

pub(crate) fn check_dimension(expected: usize, features: &Array1<f64>) -> Result<(), ScoringError> {
    if features.len() != expected {
        return Err(ScoringError::DimensionMismatch {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}
