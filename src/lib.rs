//! Streams MLlib operators
//!
//! Scores streaming tuples against MLlib-format models loaded in-process:
//! collaborative filtering (ALS) and list<float64> -> float64 analytics.

pub mod constants;
pub mod logic;

pub use logic::config::OperatorConfig;
pub use logic::error::{ModelLoadError, OperatorError, SchemaMismatchError, ScoringError};
pub use logic::operator::{build_operator, Operator};
pub use logic::runtime::OperatorRunner;
