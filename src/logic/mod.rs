//! Logic Module - Operators & Model Engines
//!
//! - `tuple/` - Typed tuples and stream schemas
//! - `model/` - Model loading, hot reload, MLlib model implementations
//! - `operator/` - Scoring operators, setup checks, control port
//! - `runtime/` - Driver that feeds tuples and control messages to an operator

pub mod config;
pub mod error;
pub mod model;
pub mod operator;
pub mod runtime;
pub mod tuple;
