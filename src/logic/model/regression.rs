//! Linear models - linear regression and binary logistic regression

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::loader::MllibModel;
use super::scoring::{check_dimension, VectorScorer};
use crate::logic::error::ScoringError;

/// Default decision threshold for logistic regression
pub const DEFAULT_LOGISTIC_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelData {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

fn validate_weights(weights: &[f64]) -> Result<(), String> {
    if weights.is_empty() {
        return Err("model has no weights".to_string());
    }
    if weights.iter().any(|w| !w.is_finite()) {
        return Err("weights must be finite".to_string());
    }
    Ok(())
}

// ============================================================================
// LINEAR REGRESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct LinearRegressionModel {
    weights: Array1<f64>,
    intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            weights: Array1::from(weights),
            intercept,
        }
    }
}

impl MllibModel for LinearRegressionModel {
    const CLASS_NAME: &'static str = "org.apache.spark.mllib.regression.LinearRegressionModel";
    type Data = LinearModelData;

    fn from_data(data: Self::Data) -> Result<Self, String> {
        validate_weights(&data.weights)?;
        Ok(Self::new(data.weights, data.intercept))
    }

    fn to_data(&self) -> Self::Data {
        LinearModelData {
            weights: self.weights.to_vec(),
            intercept: self.intercept,
        }
    }
}

impl VectorScorer for LinearRegressionModel {
    fn score(&self, features: &Array1<f64>) -> Result<f64, ScoringError> {
        check_dimension(self.weights.len(), features)?;
        Ok(self.weights.dot(features) + self.intercept)
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModelData {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    /// `null` means "return raw probabilities"
    #[serde(default = "default_threshold")]
    pub threshold: Option<f64>,
}

fn default_threshold() -> Option<f64> {
    Some(DEFAULT_LOGISTIC_THRESHOLD)
}

#[derive(Debug, Clone)]
pub struct LogisticRegressionModel {
    weights: Array1<f64>,
    intercept: f64,
    threshold: Option<f64>,
}

impl LogisticRegressionModel {
    pub fn new(weights: Vec<f64>, intercept: f64, threshold: Option<f64>) -> Self {
        Self {
            weights: Array1::from(weights),
            intercept,
            threshold,
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Return raw probabilities instead of class labels
    pub fn clear_threshold(&mut self) {
        self.threshold = None;
    }
}

impl MllibModel for LogisticRegressionModel {
    const CLASS_NAME: &'static str = "org.apache.spark.mllib.classification.LogisticRegressionModel";
    type Data = LogisticModelData;

    fn from_data(data: Self::Data) -> Result<Self, String> {
        validate_weights(&data.weights)?;
        if let Some(t) = data.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("threshold {} outside [0, 1]", t));
            }
        }
        Ok(Self::new(data.weights, data.intercept, data.threshold))
    }

    fn to_data(&self) -> Self::Data {
        LogisticModelData {
            weights: self.weights.to_vec(),
            intercept: self.intercept,
            threshold: self.threshold,
        }
    }
}

impl VectorScorer for LogisticRegressionModel {
    fn score(&self, features: &Array1<f64>) -> Result<f64, ScoringError> {
        check_dimension(self.weights.len(), features)?;

        let margin = self.weights.dot(features) + self.intercept;
        let probability = 1.0 / (1.0 + (-margin).exp());

        Ok(match self.threshold {
            Some(t) if probability > t => 1.0,
            Some(_) => 0.0,
            None => probability,
        })
    }
}
