//! Error Types
//!
//! One enum per failure class: setup (schema, config, model load) is fatal to
//! operator startup, scoring errors only cost the current tuple.

use std::path::PathBuf;
use thiserror::Error;

use crate::logic::tuple::MetaType;

// ============================================================================
// TUPLE ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum TupleError {
    #[error("unknown attribute type '{0}'")]
    UnknownType(String),

    #[error("malformed schema '{0}'")]
    MalformedSchema(String),

    #[error("duplicate attribute '{0}'")]
    DuplicateAttribute(String),

    #[error("attribute '{0}' not found")]
    MissingAttribute(String),

    #[error("attribute '{attribute}' expects {expected}, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: MetaType,
        found: String,
    },

    #[error("attribute '{0}' was never assigned")]
    Unassigned(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("schema has {expected} attributes, got {actual} values")]
    Arity { expected: usize, actual: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// SETUP ERRORS
// ============================================================================

/// Output/input schema does not fit the configured analysis.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaMismatchError {
    #[error("output schema has no '{0}' attribute")]
    MissingResultAttribute(String),

    #[error("{analysis} requires '{attribute}' of type {expected}, found {actual}")]
    WrongResultType {
        attribute: String,
        analysis: String,
        expected: MetaType,
        actual: MetaType,
    },

    #[error("parameter {parameter} names '{attribute}', which is not on the input schema")]
    MissingInputAttribute {
        parameter: &'static str,
        attribute: String,
    },

    #[error("parameter {parameter} requires '{attribute}' of type {expected}, found {actual}")]
    WrongInputType {
        parameter: &'static str,
        attribute: String,
        expected: MetaType,
        actual: MetaType,
    },

    #[error("input attribute '{0}' is not carried by the output schema")]
    DroppedInputAttribute(String),

    #[error("input attribute '{attribute}' is {input} but the output declares {output}")]
    RetypedInputAttribute {
        attribute: String,
        input: MetaType,
        output: MetaType,
    },

    #[error("input attribute '{attribute}' must come after '{after}' on the output schema")]
    ReorderedInputAttribute { attribute: String, after: String },

    #[error("output attribute '{0}' has no source on the input schema")]
    UnsourcedOutputAttribute(String),
}

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model path not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} holds a {actual} model, expected {expected}")]
    WrongClass {
        path: PathBuf,
        expected: &'static str,
        actual: String,
    },

    #[error("invalid model at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("unknown analysis type '{0}'")]
    UnknownAnalysisType(String),
}

/// Anything that keeps an operator from starting.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ============================================================================
// PER-TUPLE ERRORS
// ============================================================================

/// Failure while extracting inputs or invoking the model for one tuple.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Tuple(#[from] TupleError),

    #[error("feature vector has {actual} values, model expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("user {0} not found in model")]
    UnknownUser(i32),

    #[error("product {0} not found in model")]
    UnknownProduct(i32),

    #[error("number of recommendations must be positive, got {0}")]
    InvalidCount(i32),

    #[error("model produced a non-finite result ({0})")]
    NonFiniteResult(f64),
}

impl ScoringError {
    /// Short error class name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Tuple(_) => "TupleError",
            ScoringError::DimensionMismatch { .. } => "DimensionMismatch",
            ScoringError::UnknownUser(_) => "UnknownUser",
            ScoringError::UnknownProduct(_) => "UnknownProduct",
            ScoringError::InvalidCount(_) => "InvalidCount",
            ScoringError::NonFiniteResult(_) => "NonFiniteResult",
        }
    }
}
