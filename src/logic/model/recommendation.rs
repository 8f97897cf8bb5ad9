//! Matrix Factorization Model (ALS)
//!
//! Users and products are rows of two factor matrices of the same rank.
//! A predicted rating is the dot product of a user row and a product row.

use std::cmp::Ordering;
use std::collections::HashMap;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::loader::MllibModel;
use super::scoring::{Rating, Recommender};
use crate::logic::error::ScoringError;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One row of a factor table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRow {
    pub id: i32,
    pub features: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixFactorizationData {
    pub rank: usize,
    pub user_features: Vec<FactorRow>,
    pub product_features: Vec<FactorRow>,
}

/// Factor table: ids in stored order plus an index for lookups
#[derive(Debug, Clone)]
struct FactorTable {
    ids: Vec<i32>,
    index: HashMap<i32, usize>,
    factors: Array2<f64>,
}

impl FactorTable {
    fn build(kind: &str, rank: usize, rows: Vec<FactorRow>) -> Result<Self, String> {
        let mut ids = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());
        let mut flat = Vec::with_capacity(rows.len() * rank);

        for row in rows {
            if row.features.len() != rank {
                return Err(format!(
                    "{} {} has {} factors, rank is {}",
                    kind,
                    row.id,
                    row.features.len(),
                    rank
                ));
            }
            if index.insert(row.id, ids.len()).is_some() {
                return Err(format!("duplicate {} {}", kind, row.id));
            }
            ids.push(row.id);
            flat.extend(row.features);
        }

        let factors = Array2::from_shape_vec((ids.len(), rank), flat)
            .map_err(|e| format!("{} factors: {}", kind, e))?;

        Ok(Self { ids, index, factors })
    }

    fn row(&self, id: i32) -> Option<ArrayView1<'_, f64>> {
        self.index.get(&id).map(|&i| self.factors.row(i))
    }

    fn to_rows(&self) -> Vec<FactorRow> {
        self.ids
            .iter()
            .zip(self.factors.rows())
            .map(|(&id, row)| FactorRow {
                id,
                features: row.to_vec(),
            })
            .collect()
    }

    /// Score every row against `query`; best first, ties keep stored order,
    /// NaN scores last
    fn top(&self, query: ArrayView1<'_, f64>, num: usize) -> Vec<(i32, f64)> {
        let scores = self.factors.dot(&query);
        let mut ranked: Vec<(i32, f64)> = self.ids.iter().copied().zip(scores.iter().copied()).collect();
        ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
            (false, false) => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        ranked.truncate(num);
        ranked
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct MatrixFactorizationModel {
    rank: usize,
    users: FactorTable,
    products: FactorTable,
}

impl MatrixFactorizationModel {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn user_count(&self) -> usize {
        self.users.ids.len()
    }

    pub fn product_count(&self) -> usize {
        self.products.ids.len()
    }
}

impl MllibModel for MatrixFactorizationModel {
    const CLASS_NAME: &'static str = "org.apache.spark.mllib.recommendation.MatrixFactorizationModel";
    type Data = MatrixFactorizationData;

    fn from_data(data: Self::Data) -> Result<Self, String> {
        if data.rank == 0 {
            return Err("rank must be positive".to_string());
        }

        Ok(Self {
            rank: data.rank,
            users: FactorTable::build("user", data.rank, data.user_features)?,
            products: FactorTable::build("product", data.rank, data.product_features)?,
        })
    }

    fn to_data(&self) -> Self::Data {
        MatrixFactorizationData {
            rank: self.rank,
            user_features: self.users.to_rows(),
            product_features: self.products.to_rows(),
        }
    }
}

fn positive_count(num: i32) -> Result<usize, ScoringError> {
    if num < 1 {
        return Err(ScoringError::InvalidCount(num));
    }
    Ok(num as usize)
}

impl Recommender for MatrixFactorizationModel {
    fn predict(&self, user: i32, product: i32) -> Result<f64, ScoringError> {
        let u = self.users.row(user).ok_or(ScoringError::UnknownUser(user))?;
        let p = self.products.row(product).ok_or(ScoringError::UnknownProduct(product))?;
        Ok(u.dot(&p))
    }

    fn recommend_products(&self, user: i32, num: i32) -> Result<Vec<Rating>, ScoringError> {
        let num = positive_count(num)?;
        let u = self.users.row(user).ok_or(ScoringError::UnknownUser(user))?;

        Ok(self
            .products
            .top(u, num)
            .into_iter()
            .map(|(product, rating)| Rating { user, product, rating })
            .collect())
    }

    fn recommend_users(&self, product: i32, num: i32) -> Result<Vec<Rating>, ScoringError> {
        let num = positive_count(num)?;
        let p = self.products.row(product).ok_or(ScoringError::UnknownProduct(product))?;

        Ok(self
            .users
            .top(p, num)
            .into_iter()
            .map(|(user, rating)| Rating { user, product, rating })
            .collect())
    }
}
