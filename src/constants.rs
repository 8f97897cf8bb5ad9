//! Central Configuration Constants
//!
//! Single source of truth for names and defaults shared by the operators.

/// Output attribute that receives the analysis result
pub const ANALYSIS_RESULT_ATTRIBUTE: &str = "analysisResult";

/// Default operator config file
pub const DEFAULT_CONFIG_PATH: &str = "mllib-operator.json";

/// Files inside a saved model directory
pub const MODEL_METADATA_FILE: &str = "metadata.json";
pub const MODEL_DATA_FILE: &str = "data.json";

/// Format version written by `save_model`
pub const MODEL_FORMAT_VERSION: &str = "1.0";

/// Capacity of the control message channel
pub const CONTROL_CHANNEL_CAPACITY: usize = 16;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "streamsx-mllib";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get operator config path from environment or use default
pub fn get_config_path() -> String {
    std::env::var("MLLIB_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Model path override, if set
pub fn get_model_path_override() -> Option<String> {
    std::env::var("MLLIB_MODEL_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Control file override, if set
pub fn get_control_file_override() -> Option<String> {
    std::env::var("MLLIB_CONTROL_FILE")
        .ok()
        .filter(|s| !s.trim().is_empty())
}
