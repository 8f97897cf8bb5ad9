//! Collaborative Filtering Operator (ALS)
//!
//! Reads two int32 attributes (`attr1`, `attr2`) and, depending on the
//! analysis type, predicts a rating or recommends products/users.

use std::sync::Arc;

use super::analysis::AnalysisType;
use super::context::{ContextChecker, OperatorContext};
use super::metrics::{OperatorMetrics, OperatorStatus};
use super::{finite_result, Operator};
use crate::constants::ANALYSIS_RESULT_ATTRIBUTE;
use crate::logic::error::{ModelLoadError, OperatorError, SchemaMismatchError, ScoringError};
use crate::logic::model::{MatrixFactorizationModel, MllibModel, ModelHost, Rating, Recommender};
use crate::logic::tuple::{MetaType, OutputTuple, Record, Value};

/// Operator parameters
#[derive(Debug, Clone)]
pub struct CollaborativeFilteringParams {
    pub attr1: String,
    pub attr2: String,
    pub analysis_type: AnalysisType,
}

pub struct CollaborativeFilteringOperator<M = MatrixFactorizationModel> {
    context: OperatorContext,
    params: CollaborativeFilteringParams,
    host: Arc<ModelHost<M>>,
    metrics: OperatorMetrics,
}

impl<M: MllibModel + Recommender> CollaborativeFilteringOperator<M> {
    pub fn check_context(
        context: &OperatorContext,
        params: &CollaborativeFilteringParams,
    ) -> Result<(), SchemaMismatchError> {
        let analysis = params.analysis_type;
        let mut checker = ContextChecker::new(context);
        checker
            .check_result_attribute(analysis.name(), &analysis.result_type())
            .check_input_attribute("attr1", &params.attr1, &MetaType::Int32)
            .check_input_attribute("attr2", &params.attr2, &MetaType::Int32)
            .check_pass_through();
        checker.finish()
    }

    /// Check the schemas, then load the model from `model_path`
    pub fn open(
        context: OperatorContext,
        params: CollaborativeFilteringParams,
        model_path: impl Into<std::path::PathBuf>,
    ) -> Result<Self, OperatorError> {
        Self::check_context(&context, &params)?;

        if params.analysis_type == AnalysisType::RecommendUsers {
            log::warn!(
                "{}: RecommendUsers reports the product field of each rating, not the user",
                context.name
            );
        }

        let host = Arc::new(ModelHost::initialize(model_path)?);
        log::info!(
            "{}: {} on ({}, {})",
            context.name,
            params.analysis_type,
            params.attr1,
            params.attr2
        );

        Ok(Self {
            context,
            params,
            host,
            metrics: OperatorMetrics::default(),
        })
    }

    pub fn host(&self) -> &Arc<ModelHost<M>> {
        &self.host
    }

    fn analyze(&self, model: &M, val1: i32, val2: i32) -> Result<Value, ScoringError> {
        let value = match self.params.analysis_type {
            AnalysisType::Prediction => Value::Float64(finite_result(model.predict(val1, val2)?)?),
            AnalysisType::RecommendProducts => {
                Value::from(products_of(&model.recommend_products(val1, val2)?))
            }
            // keeps the product field on this branch as well, see `open`
            AnalysisType::RecommendUsers => {
                Value::from(products_of(&model.recommend_users(val1, val2)?))
            }
        };
        Ok(value)
    }
}

fn products_of(ratings: &[Rating]) -> Vec<i32> {
    ratings.iter().map(|r| r.product).collect()
}

impl<M: MllibModel + Recommender> Operator for CollaborativeFilteringOperator<M> {
    fn context(&self) -> &OperatorContext {
        &self.context
    }

    fn metrics(&self) -> &OperatorMetrics {
        &self.metrics
    }

    fn status(&self) -> OperatorStatus {
        OperatorStatus::collect(
            &self.context.name,
            self.params.analysis_type.name(),
            &self.metrics,
            &self.host,
        )
    }

    fn process_tuple(&self, tuple: &Record) -> Result<Record, ScoringError> {
        let val1 = tuple.get_int32(&self.params.attr1)?;
        let val2 = tuple.get_int32(&self.params.attr2)?;

        let handle = self.host.current();
        let result = self.analyze(&handle.model, val1, val2)?;

        let mut out = OutputTuple::new(Arc::clone(&self.context.output_schema));
        out.assign(tuple);
        out.set(ANALYSIS_RESULT_ATTRIBUTE, result)?;
        Ok(out.finish()?)
    }

    fn reload_model(&self) -> Result<(), ModelLoadError> {
        self.host.reload().map(|_| ())
    }
}
