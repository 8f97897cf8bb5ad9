use std::fs;
use std::path::Path;
use std::sync::Arc;

use ndarray::Array1;
use tempfile::tempdir;

use super::collaborative_filtering::CollaborativeFilteringParams;
use super::*;
use crate::constants::MODEL_DATA_FILE;
use crate::logic::config::OperatorConfig;
use crate::logic::error::{ConfigError, OperatorError, SchemaMismatchError, ScoringError};
use crate::logic::model::{
    save_model, FactorRow, LinearRegressionModel, MatrixFactorizationData, MatrixFactorizationModel,
    MllibModel, Rating, Recommender, VectorScorer,
};
use crate::logic::tuple::{MetaType, Record, StreamSchema, Value};

// ============================================================================
// TEST MODELS
// ============================================================================

/// Scores every non-empty vector with the same value
struct ConstantModel {
    value: f64,
}

impl MllibModel for ConstantModel {
    const CLASS_NAME: &'static str = "test.ConstantModel";
    type Data = f64;

    fn from_data(data: f64) -> Result<Self, String> {
        Ok(Self { value: data })
    }

    fn to_data(&self) -> f64 {
        self.value
    }
}

impl VectorScorer for ConstantModel {
    fn score(&self, features: &Array1<f64>) -> Result<f64, ScoringError> {
        if features.is_empty() {
            return Err(ScoringError::DimensionMismatch { expected: 3, actual: 0 });
        }
        Ok(self.value)
    }
}

/// Returns ratings for a fixed product list, in that order
struct ScriptedRecommender {
    products: Vec<i32>,
}

impl MllibModel for ScriptedRecommender {
    const CLASS_NAME: &'static str = "test.ScriptedRecommender";
    type Data = Vec<i32>;

    fn from_data(data: Vec<i32>) -> Result<Self, String> {
        Ok(Self { products: data })
    }

    fn to_data(&self) -> Vec<i32> {
        self.products.clone()
    }
}

impl Recommender for ScriptedRecommender {
    fn predict(&self, user: i32, product: i32) -> Result<f64, ScoringError> {
        Ok(user as f64 * product as f64)
    }

    fn recommend_products(&self, user: i32, num: i32) -> Result<Vec<Rating>, ScoringError> {
        Ok(self
            .products
            .iter()
            .take(num.max(0) as usize)
            .map(|&product| Rating { user, product, rating: 1.0 })
            .collect())
    }

    fn recommend_users(&self, product: i32, num: i32) -> Result<Vec<Rating>, ScoringError> {
        Ok((0..num)
            .map(|i| Rating { user: 100 + i, product, rating: 1.0 })
            .collect())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn context(input: &str, output: &str) -> OperatorContext {
    OperatorContext::new(
        "test",
        input.parse::<StreamSchema>().unwrap(),
        output.parse::<StreamSchema>().unwrap(),
    )
}

fn tuple(ctx: &OperatorContext, json: &str) -> Record {
    Record::from_json_str(Arc::clone(&ctx.input_schema), json).unwrap()
}

const VECTOR_IN: &str = "tuple<rstring id, list<float64> features>";
const VECTOR_OUT: &str = "tuple<rstring id, list<float64> features, float64 analysisResult>";
const PAIR_IN: &str = "tuple<int32 user, int32 count>";
const PAIR_LIST_OUT: &str = "tuple<int32 user, int32 count, list<int32> analysisResult>";
const PAIR_FLOAT_OUT: &str = "tuple<int32 user, int32 count, float64 analysisResult>";

fn constant_operator(dir: &Path, value: f64) -> ListToDoubleOperator<ConstantModel> {
    save_model(&ConstantModel { value }, dir).unwrap();
    ListToDoubleOperator::open(context(VECTOR_IN, VECTOR_OUT), "features", dir).unwrap()
}

fn params(analysis_type: AnalysisType) -> CollaborativeFilteringParams {
    CollaborativeFilteringParams {
        attr1: "user".to_string(),
        attr2: "count".to_string(),
        analysis_type,
    }
}

fn scripted_operator(
    dir: &Path,
    analysis_type: AnalysisType,
    output: &str,
) -> CollaborativeFilteringOperator<ScriptedRecommender> {
    save_model(&ScriptedRecommender { products: vec![7, 3, 9, 1, 2, 8] }, dir).unwrap();
    CollaborativeFilteringOperator::open(context(PAIR_IN, output), params(analysis_type), dir).unwrap()
}

// ============================================================================
// SCORING
// ============================================================================

#[test]
fn test_vector_scored_against_constant_model() {
    let dir = tempdir().unwrap();
    let op = constant_operator(dir.path(), 0.42);
    let input = tuple(op.context(), r#"{"id":"t1","features":[1.0,2.0,3.0]}"#);

    let mut out = Vec::new();
    assert!(op.process(&input, &mut out));

    assert_eq!(out.len(), 1);
    let result = &out[0];
    assert_eq!(result.get("id"), input.get("id"));
    assert_eq!(result.get("features"), input.get("features"));
    assert_eq!(result.get("analysisResult"), Some(&Value::Float64(0.42)));
    assert_eq!(result.values().len(), input.values().len() + 1);
}

#[test]
fn test_recommend_products_scenario() {
    let dir = tempdir().unwrap();
    let op = scripted_operator(dir.path(), AnalysisType::RecommendProducts, PAIR_LIST_OUT);
    let input = tuple(op.context(), r#"{"user":10,"count":5}"#);

    let mut out = Vec::new();
    op.process(&input, &mut out);

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("user"), Some(&Value::Int32(10)));
    assert_eq!(out[0].get("count"), Some(&Value::Int32(5)));
    assert_eq!(out[0].get("analysisResult"), Some(&Value::from(vec![7, 3, 9, 1, 2])));
}

#[test]
fn test_recommend_products_with_als_model() {
    let dir = tempdir().unwrap();
    let model = MatrixFactorizationModel::from_data(MatrixFactorizationData {
        rank: 1,
        user_features: vec![FactorRow { id: 10, features: vec![1.0] }],
        product_features: [(1, 2.0), (2, 1.0), (3, 4.0), (4, 0.5), (7, 5.0), (9, 3.0)]
            .iter()
            .map(|&(id, f)| FactorRow { id, features: vec![f] })
            .collect(),
    })
    .unwrap();
    save_model(&model, dir.path()).unwrap();

    let op = CollaborativeFilteringOperator::<MatrixFactorizationModel>::open(
        context(PAIR_IN, PAIR_LIST_OUT),
        params(AnalysisType::RecommendProducts),
        dir.path(),
    )
    .unwrap();

    let mut out = Vec::new();
    op.process(&tuple(op.context(), r#"{"user":10,"count":5}"#), &mut out);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::from(vec![7, 3, 9, 1, 2])));

    // unknown user: dropped, and the next tuple still scores
    assert!(!op.process(&tuple(op.context(), r#"{"user":99,"count":5}"#), &mut out));
    assert!(op.process(&tuple(op.context(), r#"{"user":10,"count":1}"#), &mut out));
    assert_eq!(out.len(), 2);
    assert_eq!(out[1].get("analysisResult"), Some(&Value::from(vec![7])));
    assert_eq!(op.metrics().dropped(), 1);
}

#[test]
fn test_prediction() {
    let dir = tempdir().unwrap();
    let op = scripted_operator(dir.path(), AnalysisType::Prediction, PAIR_FLOAT_OUT);

    let mut out = Vec::new();
    op.process(&tuple(op.context(), r#"{"user":4,"count":5}"#), &mut out);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::Float64(20.0)));
}

#[test]
fn test_recommend_users_reports_product_field() {
    let dir = tempdir().unwrap();
    let op = scripted_operator(dir.path(), AnalysisType::RecommendUsers, PAIR_LIST_OUT);

    let mut out = Vec::new();
    op.process(&tuple(op.context(), r#"{"user":42,"count":3}"#), &mut out);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::from(vec![42, 42, 42])));
}

#[test]
fn test_scoring_error_drops_tuple_and_continues() {
    let dir = tempdir().unwrap();
    let op = constant_operator(dir.path(), 0.42);
    let mut out = Vec::new();

    assert!(!op.process(&tuple(op.context(), r#"{"id":"bad","features":[]}"#), &mut out));
    assert!(out.is_empty());
    assert_eq!(op.metrics().dropped(), 1);

    assert!(op.process(&tuple(op.context(), r#"{"id":"ok","features":[1.0]}"#), &mut out));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("id"), Some(&Value::Rstring("ok".to_string())));

    let status = op.status();
    assert_eq!(status.tuples_processed, 2);
    assert_eq!(status.tuples_submitted, 1);
    assert_eq!(status.tuples_dropped, 1);
}

#[test]
fn test_tuple_from_other_schema_is_dropped() {
    let dir = tempdir().unwrap();
    let op = constant_operator(dir.path(), 1.0);
    let foreign = Record::new(
        Arc::new("tuple<int32 other>".parse().unwrap()),
        vec![Value::Int32(1)],
    )
    .unwrap();

    let result = op.process_tuple(&foreign);
    assert!(matches!(result, Err(ScoringError::Tuple(_))));
}

#[test]
fn test_non_finite_result_is_dropped() {
    let dir = tempdir().unwrap();
    save_model(&LinearRegressionModel::new(vec![1e300], 0.0), dir.path()).unwrap();
    let op = ListToDoubleOperator::<LinearRegressionModel>::open(
        context("tuple<list<float64> x>", "tuple<list<float64> x, float64 analysisResult>"),
        "x",
        dir.path(),
    )
    .unwrap();

    let overflow = tuple(op.context(), r#"{"x":[1e300]}"#);
    assert!(matches!(
        op.process_tuple(&overflow),
        Err(ScoringError::NonFiniteResult(v)) if v.is_infinite()
    ));

    let mut out = Vec::new();
    assert!(!op.process(&overflow, &mut out));
    assert!(op.process(&tuple(op.context(), r#"{"x":[1.0]}"#), &mut out));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::Float64(1e300)));
    assert_eq!(op.metrics().dropped(), 1);
}

#[test]
fn test_non_finite_prediction_is_dropped() {
    let dir = tempdir().unwrap();
    let model = MatrixFactorizationModel::from_data(MatrixFactorizationData {
        rank: 1,
        user_features: vec![FactorRow { id: 1, features: vec![1e200] }],
        product_features: vec![
            FactorRow { id: 2, features: vec![1e200] },
            FactorRow { id: 3, features: vec![2.0] },
        ],
    })
    .unwrap();
    save_model(&model, dir.path()).unwrap();
    let op = CollaborativeFilteringOperator::<MatrixFactorizationModel>::open(
        context(PAIR_IN, PAIR_FLOAT_OUT),
        params(AnalysisType::Prediction),
        dir.path(),
    )
    .unwrap();

    let mut out = Vec::new();
    assert!(!op.process(&tuple(op.context(), r#"{"user":1,"count":2}"#), &mut out));
    assert!(op.process(&tuple(op.context(), r#"{"user":1,"count":3}"#), &mut out));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::Float64(2e200)));
}

// ============================================================================
// CONTROL PORT
// ============================================================================

#[test]
fn test_control_reload_picks_up_new_model() {
    let dir = tempdir().unwrap();
    let op = constant_operator(dir.path(), 0.42);
    save_model(&ConstantModel { value: 0.9 }, dir.path()).unwrap();

    assert_eq!(op.process_control(r#"{"reloadModel":true}"#), ControlOutcome::Reloaded);

    let mut out = Vec::new();
    op.process(&tuple(op.context(), r#"{"id":"a","features":[1.0]}"#), &mut out);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::Float64(0.9)));
    assert_eq!(op.status().reloads, 1);
}

#[test]
fn test_failed_reload_keeps_serving_old_model() {
    let dir = tempdir().unwrap();
    let op = constant_operator(dir.path(), 0.42);
    let before = op.host().current();
    fs::write(dir.path().join(MODEL_DATA_FILE), b"]").unwrap();

    assert_eq!(op.process_control(r#"{"reloadModel":true}"#), ControlOutcome::ReloadFailed);

    assert!(Arc::ptr_eq(&before, &op.host().current()));
    let mut out = Vec::new();
    op.process(&tuple(op.context(), r#"{"id":"a","features":[1.0]}"#), &mut out);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::Float64(0.42)));

    let status = op.status();
    assert_eq!(status.reload_failures, 1);
    assert_eq!(status.reloads, 0);
}

#[test]
fn test_malformed_control_is_a_no_op() {
    let dir = tempdir().unwrap();
    let op = constant_operator(dir.path(), 0.42);

    assert_eq!(op.process_control("{reloadModel"), ControlOutcome::Ignored);
    assert_eq!(op.process_control(r#"{"reload":true}"#), ControlOutcome::Ignored);

    let status = op.status();
    assert_eq!(status.control_messages, 2);
    assert_eq!(status.reloads + status.reload_failures, 0);
}

// ============================================================================
// SETUP CHECKS
// ============================================================================

fn cf_check(analysis_type: AnalysisType, output: &str) -> Result<(), SchemaMismatchError> {
    CollaborativeFilteringOperator::<ScriptedRecommender>::check_context(
        &context(PAIR_IN, output),
        &params(analysis_type),
    )
}

#[test]
fn test_prediction_requires_float64_result() {
    assert!(cf_check(AnalysisType::Prediction, PAIR_FLOAT_OUT).is_ok());

    match cf_check(AnalysisType::Prediction, PAIR_LIST_OUT) {
        Err(SchemaMismatchError::WrongResultType { analysis, expected, actual, .. }) => {
            assert_eq!(analysis, "Prediction");
            assert_eq!(expected, MetaType::Float64);
            assert_eq!(actual, MetaType::list_of(MetaType::Int32));
        }
        other => panic!("Expected WrongResultType, got {:?}", other),
    }
}

#[test]
fn test_recommendations_require_int32_list_result() {
    for analysis in [AnalysisType::RecommendProducts, AnalysisType::RecommendUsers] {
        assert!(cf_check(analysis, PAIR_LIST_OUT).is_ok());
        assert!(cf_check(analysis, PAIR_FLOAT_OUT).is_err());
        assert!(cf_check(
            analysis,
            "tuple<int32 user, int32 count, list<float64> analysisResult>"
        )
        .is_err());
    }
}

#[test]
fn test_list_to_double_requires_float64_result() {
    let ctx = context(
        VECTOR_IN,
        "tuple<rstring id, list<float64> features, rstring analysisResult>",
    );
    let result = ListToDoubleOperator::<ConstantModel>::check_context(&ctx, "features");
    assert!(matches!(result, Err(SchemaMismatchError::WrongResultType { .. })));
}

#[test]
fn test_missing_result_attribute() {
    let result = cf_check(AnalysisType::Prediction, PAIR_IN);
    assert_eq!(
        result,
        Err(SchemaMismatchError::MissingResultAttribute("analysisResult".to_string()))
    );
}

#[test]
fn test_input_attribute_checks() {
    let ctx = context(
        "tuple<rstring user, int32 count>",
        "tuple<rstring user, int32 count, float64 analysisResult>",
    );
    let result = CollaborativeFilteringOperator::<ScriptedRecommender>::check_context(
        &ctx,
        &params(AnalysisType::Prediction),
    );
    assert!(matches!(
        result,
        Err(SchemaMismatchError::WrongInputType { parameter: "attr1", .. })
    ));

    let result = ListToDoubleOperator::<ConstantModel>::check_context(
        &context(VECTOR_IN, VECTOR_OUT),
        "missing",
    );
    assert!(matches!(
        result,
        Err(SchemaMismatchError::MissingInputAttribute { parameter: "testDataAttr", .. })
    ));
}

#[test]
fn test_output_must_carry_input_fields() {
    let dropped = cf_check(
        AnalysisType::Prediction,
        "tuple<int32 user, float64 analysisResult>",
    );
    assert_eq!(
        dropped,
        Err(SchemaMismatchError::DroppedInputAttribute("count".to_string()))
    );

    let extra = cf_check(
        AnalysisType::Prediction,
        "tuple<int32 user, int32 count, int32 extra, float64 analysisResult>",
    );
    assert_eq!(
        extra,
        Err(SchemaMismatchError::UnsourcedOutputAttribute("extra".to_string()))
    );
}

#[test]
fn test_output_keeps_input_order() {
    let reordered = cf_check(
        AnalysisType::Prediction,
        "tuple<int32 count, int32 user, float64 analysisResult>",
    );
    assert_eq!(
        reordered,
        Err(SchemaMismatchError::ReorderedInputAttribute {
            attribute: "count".to_string(),
            after: "user".to_string(),
        })
    );

    // the result attribute may sit anywhere
    let result_first = cf_check(
        AnalysisType::Prediction,
        "tuple<float64 analysisResult, int32 user, int32 count>",
    );
    assert_eq!(result_first, Ok(()));
}

#[test]
fn test_checker_states() {
    let ctx = context(PAIR_IN, PAIR_FLOAT_OUT);
    let mut checker = ContextChecker::new(&ctx);
    assert_eq!(checker.state(), CheckState::Unchecked);

    checker.check_result_attribute("Prediction", &MetaType::Float64);
    assert_eq!(checker.state(), CheckState::Valid);

    checker.check_input_attribute("attr1", "nope", &MetaType::Int32);
    assert_eq!(checker.state(), CheckState::Invalid);

    // stays invalid once rejected
    checker.check_pass_through();
    assert_eq!(checker.state(), CheckState::Invalid);
    assert!(checker.finish().is_err());
}

#[test]
fn test_schema_mismatch_blocks_startup() {
    let dir = tempdir().unwrap();
    save_model(&ConstantModel { value: 1.0 }, dir.path()).unwrap();

    let result = ListToDoubleOperator::<ConstantModel>::open(
        context(VECTOR_IN, "tuple<rstring id, list<float64> features>"),
        "features",
        dir.path(),
    );
    assert!(matches!(result, Err(OperatorError::Schema(_))));
}

#[test]
fn test_missing_model_blocks_startup() {
    let dir = tempdir().unwrap();
    let result = ListToDoubleOperator::<ConstantModel>::open(
        context(VECTOR_IN, VECTOR_OUT),
        "features",
        dir.path().join("none"),
    );
    assert!(matches!(result, Err(OperatorError::ModelLoad(_))));
}

// ============================================================================
// FACTORY
// ============================================================================

fn cf_config(model_path: &Path) -> OperatorConfig {
    serde_json::from_value(serde_json::json!({
        "operator": "collaborative-filtering",
        "modelPath": model_path,
        "attr1": "user",
        "attr2": "count",
        "analysisType": "RecommendProducts",
        "inputSchema": PAIR_IN,
        "outputSchema": PAIR_LIST_OUT,
    }))
    .unwrap()
}

#[test]
fn test_build_operator_from_config() {
    let dir = tempdir().unwrap();
    let model = MatrixFactorizationModel::from_data(MatrixFactorizationData {
        rank: 1,
        user_features: vec![FactorRow { id: 1, features: vec![1.0] }],
        product_features: vec![FactorRow { id: 5, features: vec![1.0] }],
    })
    .unwrap();
    save_model(&model, dir.path()).unwrap();

    let op = build_operator(&cf_config(dir.path())).unwrap();
    let mut out = Vec::new();
    op.process(&tuple(op.context(), r#"{"user":1,"count":3}"#), &mut out);
    assert_eq!(out[0].get("analysisResult"), Some(&Value::from(vec![5])));
    assert_eq!(op.status().analysis, "RecommendProducts");
}

#[test]
fn test_build_operator_missing_parameter() {
    let dir = tempdir().unwrap();
    let mut config = cf_config(dir.path());
    config.analysis_type = None;

    match build_operator(&config) {
        Err(OperatorError::Config(ConfigError::MissingParameter(name))) => {
            assert_eq!(name, "analysisType")
        }
        Err(other) => panic!("Expected MissingParameter, got {:?}", other),
        Ok(_) => panic!("Expected MissingParameter"),
    }
}
