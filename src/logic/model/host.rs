//! Model Host - owns the model served by one operator
//!
//! Readers take an `Arc` snapshot of the current model and score against it.
//! A reload builds the new model completely before swapping the `Arc`, so a
//! reader sees either the old model or the new one, never a partial load.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::loader::{load_model, MllibModel, ModelMetadata};
use crate::logic::error::ModelLoadError;

/// A loaded model and where it came from
#[derive(Debug)]
pub struct LoadedModel<M> {
    pub model: M,
    pub metadata: ModelMetadata,
}

pub type ModelHandle<M> = Arc<LoadedModel<M>>;

pub struct ModelHost<M> {
    path: PathBuf,
    current: RwLock<ModelHandle<M>>,
    // held across load and swap so reloads apply in request order
    reload_lock: Mutex<()>,
    reloads: AtomicU64,
    reload_failures: AtomicU64,
}

impl<M: MllibModel> ModelHost<M> {
    /// Load the initial model; failure means the operator cannot start
    pub fn initialize(path: impl Into<PathBuf>) -> Result<Self, ModelLoadError> {
        let path = path.into();
        let (model, metadata) = load_model::<M>(&path)?;

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(LoadedModel { model, metadata })),
            reload_lock: Mutex::new(()),
            reloads: AtomicU64::new(0),
            reload_failures: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the model currently served
    pub fn current(&self) -> ModelHandle<M> {
        self.current.read().clone()
    }

    /// Reload from the configured path and swap it in.
    ///
    /// Reloads run one at a time. On failure the served model is untouched
    /// and the error is logged once.
    pub fn reload(&self) -> Result<ModelHandle<M>, ModelLoadError> {
        let _serial = self.reload_lock.lock();
        let (model, metadata) = match load_model::<M>(&self.path) {
            Ok(loaded) => loaded,
            Err(e) => {
                self.reload_failures.fetch_add(1, Ordering::Relaxed);
                log::error!(
                    "Model reload from {} failed, keeping current model: {}",
                    self.path.display(),
                    e
                );
                return Err(e);
            }
        };

        let fresh = Arc::new(LoadedModel { model, metadata });
        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&fresh));
        self.reloads.fetch_add(1, Ordering::Relaxed);

        log::info!(
            "Model reloaded from {} (checksum {} -> {})",
            self.path.display(),
            short(&previous.metadata.checksum),
            short(&fresh.metadata.checksum)
        );

        Ok(fresh)
    }

    pub fn metadata(&self) -> ModelMetadata {
        self.current.read().metadata.clone()
    }

    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    pub fn reload_failure_count(&self) -> u64 {
        self.reload_failures.load(Ordering::Relaxed)
    }
}

fn short(checksum: &str) -> &str {
    &checksum[..checksum.len().min(12)]
}
