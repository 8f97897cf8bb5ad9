use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::logic::error::ConfigError;
use crate::logic::tuple::MetaType;

/// Which collaborative filtering operation an operator performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum AnalysisType {
    Prediction,
    RecommendProducts,
    RecommendUsers,
}

impl AnalysisType {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisType::Prediction => "Prediction",
            AnalysisType::RecommendProducts => "RecommendProducts",
            AnalysisType::RecommendUsers => "RecommendUsers",
        }
    }

    /// Type the `analysisResult` attribute must have
    pub fn result_type(&self) -> MetaType {
        match self {
            AnalysisType::Prediction => MetaType::Float64,
            AnalysisType::RecommendProducts | AnalysisType::RecommendUsers => {
                MetaType::list_of(MetaType::Int32)
            }
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Prediction" => Ok(AnalysisType::Prediction),
            "RecommendProducts" => Ok(AnalysisType::RecommendProducts),
            "RecommendUsers" => Ok(AnalysisType::RecommendUsers),
            other => Err(ConfigError::UnknownAnalysisType(other.to_string())),
        }
    }
}

impl TryFrom<String> for AnalysisType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
