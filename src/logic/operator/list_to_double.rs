//! List-to-Double Operator
//!
//! Reads a `list<float64>` attribute (`testDataAttr`), scores it with the
//! hosted `VectorScorer` and writes a float64 `analysisResult`.

use std::sync::Arc;

use ndarray::Array1;

use super::context::{ContextChecker, OperatorContext};
use super::metrics::{OperatorMetrics, OperatorStatus};
use super::{finite_result, Operator};
use crate::constants::ANALYSIS_RESULT_ATTRIBUTE;
use crate::logic::error::{ModelLoadError, OperatorError, SchemaMismatchError, ScoringError};
use crate::logic::model::{MllibModel, ModelHost, VectorScorer};
use crate::logic::tuple::{MetaType, OutputTuple, Record, Value};

pub struct ListToDoubleOperator<M> {
    context: OperatorContext,
    test_data_attr: String,
    host: Arc<ModelHost<M>>,
    metrics: OperatorMetrics,
}

impl<M: MllibModel + VectorScorer> ListToDoubleOperator<M> {
    pub fn check_context(context: &OperatorContext, test_data_attr: &str) -> Result<(), SchemaMismatchError> {
        let mut checker = ContextChecker::new(context);
        checker
            .check_result_attribute("Prediction", &MetaType::Float64)
            .check_input_attribute("testDataAttr", test_data_attr, &MetaType::list_of(MetaType::Float64))
            .check_pass_through();
        checker.finish()
    }

    /// Check the schemas, then load the model from `model_path`
    pub fn open(
        context: OperatorContext,
        test_data_attr: impl Into<String>,
        model_path: impl Into<std::path::PathBuf>,
    ) -> Result<Self, OperatorError> {
        let test_data_attr = test_data_attr.into();
        Self::check_context(&context, &test_data_attr)?;

        let host = Arc::new(ModelHost::initialize(model_path)?);
        Ok(Self::with_host(context, test_data_attr, host))
    }

    /// Schemas must already have passed `check_context`
    fn with_host(context: OperatorContext, test_data_attr: String, host: Arc<ModelHost<M>>) -> Self {
        log::info!(
            "{}: scoring '{}' with {}",
            context.name,
            test_data_attr,
            M::CLASS_NAME
        );
        Self {
            context,
            test_data_attr,
            host,
            metrics: OperatorMetrics::default(),
        }
    }

    pub fn host(&self) -> &Arc<ModelHost<M>> {
        &self.host
    }
}

impl<M: MllibModel + VectorScorer> Operator for ListToDoubleOperator<M> {
    fn context(&self) -> &OperatorContext {
        &self.context
    }

    fn metrics(&self) -> &OperatorMetrics {
        &self.metrics
    }

    fn status(&self) -> OperatorStatus {
        OperatorStatus::collect(&self.context.name, M::CLASS_NAME, &self.metrics, &self.host)
    }

    fn process_tuple(&self, tuple: &Record) -> Result<Record, ScoringError> {
        let features = Array1::from(tuple.get_float64_list(&self.test_data_attr)?);

        let handle = self.host.current();
        let result = finite_result(handle.model.score(&features)?)?;

        let mut out = OutputTuple::new(Arc::clone(&self.context.output_schema));
        out.assign(tuple);
        out.set(ANALYSIS_RESULT_ATTRIBUTE, Value::Float64(result))?;
        Ok(out.finish()?)
    }

    fn reload_model(&self) -> Result<(), ModelLoadError> {
        self.host.reload().map(|_| ())
    }
}
