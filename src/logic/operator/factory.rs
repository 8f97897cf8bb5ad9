//! Operator Factory - config to running operator

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::collaborative_filtering::{CollaborativeFilteringOperator, CollaborativeFilteringParams};
use super::context::OperatorContext;
use super::list_to_double::ListToDoubleOperator;
use super::Operator;
use crate::logic::config::OperatorConfig;
use crate::logic::error::{ConfigError, OperatorError};
use crate::logic::model::{
    KMeansModel, LinearRegressionModel, LogisticRegressionModel, MatrixFactorizationModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatorKind {
    CollaborativeFiltering,
    LinearRegression,
    LogisticRegression,
    #[serde(rename = "kmeans")]
    KMeans,
}

/// Validate schemas, load the model and return the operator
pub fn build_operator(config: &OperatorConfig) -> Result<Arc<dyn Operator>, OperatorError> {
    let context = OperatorContext::new(
        config.name.clone(),
        config.input_schema.clone(),
        config.output_schema.clone(),
    );
    let model_path = config.model_path.clone();

    let operator: Arc<dyn Operator> = match config.operator {
        OperatorKind::CollaborativeFiltering => {
            let params = CollaborativeFilteringParams {
                attr1: required(&config.attr1, "attr1")?,
                attr2: required(&config.attr2, "attr2")?,
                analysis_type: config
                    .analysis_type
                    .ok_or(ConfigError::MissingParameter("analysisType"))?,
            };
            Arc::new(CollaborativeFilteringOperator::<MatrixFactorizationModel>::open(
                context, params, model_path,
            )?)
        }
        OperatorKind::LinearRegression => Arc::new(ListToDoubleOperator::<LinearRegressionModel>::open(
            context,
            required(&config.test_data_attr, "testDataAttr")?,
            model_path,
        )?),
        OperatorKind::LogisticRegression => Arc::new(ListToDoubleOperator::<LogisticRegressionModel>::open(
            context,
            required(&config.test_data_attr, "testDataAttr")?,
            model_path,
        )?),
        OperatorKind::KMeans => Arc::new(ListToDoubleOperator::<KMeansModel>::open(
            context,
            required(&config.test_data_attr, "testDataAttr")?,
            model_path,
        )?),
    };

    Ok(operator)
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::MissingParameter(name))
}
