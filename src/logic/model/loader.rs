//! Model Loader - saved model directories
//!
//! A saved model is a directory holding `metadata.json` (model class and
//! format version) and `data.json` (the model parameters).

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{MODEL_DATA_FILE, MODEL_FORMAT_VERSION, MODEL_METADATA_FILE};
use crate::logic::error::ModelLoadError;

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// A model that can be restored from a saved model directory
pub trait MllibModel: Sized + Send + Sync + 'static {
    /// Class name recorded in `metadata.json`
    const CLASS_NAME: &'static str;

    /// Serialized parameters stored in `data.json`
    type Data: Serialize + DeserializeOwned;

    fn from_data(data: Self::Data) -> Result<Self, String>;

    fn to_data(&self) -> Self::Data;
}

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Contents of `metadata.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedMetadata {
    pub class: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    MODEL_FORMAT_VERSION.to_string()
}

/// Metadata of a loaded model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_class: String,
    pub format_version: String,
    pub checksum: String, // sha256 of data.json
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Load a model of class `M` from a saved model directory
pub fn load_model<M: MllibModel>(path: &Path) -> Result<(M, ModelMetadata), ModelLoadError> {
    log::info!("Loading {} from: {}", M::CLASS_NAME, path.display());

    if !path.exists() {
        return Err(ModelLoadError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ModelLoadError::Invalid {
            path: path.to_path_buf(),
            reason: "not a model directory".to_string(),
        });
    }

    let metadata_path = path.join(MODEL_METADATA_FILE);
    let saved: SavedMetadata = serde_json::from_slice(&read_file(&metadata_path)?)
        .map_err(|source| ModelLoadError::Parse {
            path: metadata_path.clone(),
            source,
        })?;

    if saved.class != M::CLASS_NAME {
        return Err(ModelLoadError::WrongClass {
            path: path.to_path_buf(),
            expected: M::CLASS_NAME,
            actual: saved.class,
        });
    }

    let data_path = path.join(MODEL_DATA_FILE);
    let bytes = read_file(&data_path)?;
    let checksum = hex::encode(Sha256::digest(&bytes));

    let data: M::Data = serde_json::from_slice(&bytes).map_err(|source| ModelLoadError::Parse {
        path: data_path.clone(),
        source,
    })?;

    let model = M::from_data(data).map_err(|reason| ModelLoadError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;

    log::info!("{} loaded (checksum {})", M::CLASS_NAME, &checksum[..12]);

    let metadata = ModelMetadata {
        model_path: path.display().to_string(),
        model_class: saved.class,
        format_version: saved.version,
        checksum,
        loaded_at: chrono::Utc::now(),
    };

    Ok((model, metadata))
}

/// Save `model` as a model directory at `path`
pub fn save_model<M: MllibModel>(model: &M, path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;

    let metadata = SavedMetadata {
        class: M::CLASS_NAME.to_string(),
        version: MODEL_FORMAT_VERSION.to_string(),
    };
    fs::write(path.join(MODEL_METADATA_FILE), serde_json::to_vec_pretty(&metadata)?)?;
    fs::write(path.join(MODEL_DATA_FILE), serde_json::to_vec(&model.to_data())?)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, ModelLoadError> {
    fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
