//! Operator configuration
//!
//! Loaded from a JSON file; model path and control file can be overridden
//! from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::error::ConfigError;
use crate::logic::operator::{AnalysisType, OperatorKind};
use crate::logic::tuple::StreamSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorConfig {
    /// Operator instance name used in logs
    #[serde(default = "default_name")]
    pub name: String,

    pub operator: OperatorKind,

    pub model_path: PathBuf,

    /// list<float64> input for list-to-double operators
    #[serde(default)]
    pub test_data_attr: Option<String>,

    /// int32 inputs for collaborative filtering
    #[serde(default)]
    pub attr1: Option<String>,
    #[serde(default)]
    pub attr2: Option<String>,

    #[serde(default)]
    pub analysis_type: Option<AnalysisType>,

    pub input_schema: StreamSchema,
    pub output_schema: StreamSchema,

    /// File whose content is sent to the control port on every change
    #[serde(default)]
    pub control_file: Option<PathBuf>,
}

fn default_name() -> String {
    constants::APP_NAME.to_string()
}

impl OperatorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `MLLIB_CONFIG` and apply environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = PathBuf::from(constants::get_config_path());
        let mut config = Self::load(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(model_path) = constants::get_model_path_override() {
            log::info!("Model path overridden from environment: {}", model_path);
            self.model_path = PathBuf::from(model_path);
        }
        if let Some(control_file) = constants::get_control_file_override() {
            self.control_file = Some(PathBuf::from(control_file));
        }
    }
}
