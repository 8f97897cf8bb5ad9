//! KMeans Model - nearest cluster center

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::loader::MllibModel;
use super::scoring::{check_dimension, VectorScorer};
use crate::logic::error::ScoringError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KMeansData {
    pub cluster_centers: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
pub struct KMeansModel {
    centers: Array2<f64>,
}

impl KMeansModel {
    pub fn k(&self) -> usize {
        self.centers.nrows()
    }

    /// Index of the closest center (squared euclidean distance)
    pub fn closest(&self, point: &Array1<f64>) -> Result<usize, ScoringError> {
        check_dimension(self.centers.ncols(), point)?;

        let mut best = (0, f64::INFINITY);
        for (i, center) in self.centers.rows().into_iter().enumerate() {
            let distance = (&center - point).mapv(|d| d * d).sum();
            if distance < best.1 {
                best = (i, distance);
            }
        }
        Ok(best.0)
    }
}

impl MllibModel for KMeansModel {
    const CLASS_NAME: &'static str = "org.apache.spark.mllib.clustering.KMeansModel";
    type Data = KMeansData;

    fn from_data(data: Self::Data) -> Result<Self, String> {
        let dims = data
            .cluster_centers
            .first()
            .map(Vec::len)
            .ok_or_else(|| "model has no cluster centers".to_string())?;

        if dims == 0 {
            return Err("cluster centers are empty".to_string());
        }
        if data.cluster_centers.iter().any(|c| c.len() != dims) {
            return Err("cluster centers differ in dimension".to_string());
        }

        let k = data.cluster_centers.len();
        let flat: Vec<f64> = data.cluster_centers.into_iter().flatten().collect();
        let centers = Array2::from_shape_vec((k, dims), flat).map_err(|e| e.to_string())?;

        Ok(Self { centers })
    }

    fn to_data(&self) -> Self::Data {
        KMeansData {
            cluster_centers: self.centers.rows().into_iter().map(|r| r.to_vec()).collect(),
        }
    }
}

impl VectorScorer for KMeansModel {
    fn score(&self, features: &Array1<f64>) -> Result<f64, ScoringError> {
        Ok(self.closest(features)? as f64)
    }
}
