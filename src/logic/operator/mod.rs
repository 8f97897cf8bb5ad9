//! Operator Module - scoring operators
//!
//! Each operator copies its input tuple, adds `analysisResult` computed by
//! the hosted model, and submits the copy. A tuple that fails to score is
//! logged and dropped; nothing is retried.

pub mod analysis;
pub mod collaborative_filtering;
pub mod context;
pub mod control;
pub mod factory;
pub mod list_to_double;
pub mod metrics;

#[cfg(test)]
mod tests;

use std::time::Instant;

use crate::logic::error::{ModelLoadError, ScoringError};
use crate::logic::tuple::Record;

// Re-export common types
pub use analysis::AnalysisType;
pub use collaborative_filtering::CollaborativeFilteringOperator;
pub use context::{CheckState, ContextChecker, OperatorContext};
pub use control::{parse_control, ControlCommand, ControlOutcome};
pub use factory::{build_operator, OperatorKind};
pub use list_to_double::ListToDoubleOperator;
pub use metrics::{OperatorMetrics, OperatorStatus};

/// Downstream port
pub trait OutputPort {
    fn submit(&mut self, tuple: Record);
}

impl OutputPort for Vec<Record> {
    fn submit(&mut self, tuple: Record) {
        self.push(tuple);
    }
}

pub trait Operator: Send + Sync {
    fn context(&self) -> &OperatorContext;

    fn metrics(&self) -> &OperatorMetrics;

    fn status(&self) -> OperatorStatus;

    /// Build the output tuple for `tuple`
    fn process_tuple(&self, tuple: &Record) -> Result<Record, ScoringError>;

    /// Reload the model from the configured path
    fn reload_model(&self) -> Result<(), ModelLoadError>;

    /// Score `tuple` and submit the result; on failure log and drop it.
    /// Returns whether a tuple was submitted.
    fn process(&self, tuple: &Record, out: &mut dyn OutputPort) -> bool {
        let start = Instant::now();
        match self.process_tuple(tuple) {
            Ok(result) => {
                out.submit(result);
                self.metrics().record_submitted(start.elapsed());
                true
            }
            Err(e) => {
                log::error!("PROCESS_TUPLE {}: {}", e.kind(), e);
                self.metrics().record_dropped(start.elapsed());
                false
            }
        }
    }

    /// Handle one control port payload
    fn process_control(&self, payload: &str) -> ControlOutcome {
        self.metrics().record_control();
        match parse_control(payload) {
            ControlCommand::ReloadModel => match self.reload_model() {
                Ok(()) => ControlOutcome::Reloaded,
                // logged by the host; the old model keeps serving
                Err(_) => ControlOutcome::ReloadFailed,
            },
            ControlCommand::Ignore => ControlOutcome::Ignored,
        }
    }
}

/// A float64 result must be finite to be submitted
fn finite_result(value: f64) -> Result<f64, ScoringError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::NonFiniteResult(value))
    }
}
