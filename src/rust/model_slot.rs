//! Process-wide holder for the loaded classifier.
//!
//! The slot starts empty. [`ModelSlot::ensure_model`] provisions the artifact and
//! loads it exactly once; afterwards every caller shares the same read-only model.
//! A failed download or load leaves the slot empty so the caller may retry.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::classifier::{ImageModel, WasteClassifier};
use crate::model_manager::{ArtifactFetcher, HttpFetcher, ModelError, ModelManager};
use crate::models::{BuiltinModel, ModelInfo};
use crate::runtime::RuntimeConfig;

/// Shared handle to a loaded model.
pub type ModelHandle = Arc<dyn ImageModel>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    /// No artifact on disk
    Missing,
    /// Artifact on disk but not loaded into memory
    Downloaded,
    Loaded,
}

pub struct ModelSlot<F = HttpFetcher> {
    manager: ModelManager<F>,
    info: ModelInfo,
    runtime: RuntimeConfig,
    model: OnceCell<ModelHandle>,
}

impl<F: ArtifactFetcher> ModelSlot<F> {
    pub fn new(manager: ModelManager<F>, info: ModelInfo, runtime: RuntimeConfig) -> Self {
        Self {
            manager,
            info,
            runtime,
            model: OnceCell::new(),
        }
    }

    /// Creates a slot that already holds a model.
    pub fn preloaded(manager: ModelManager<F>, info: ModelInfo, model: ModelHandle) -> Self {
        Self {
            manager,
            info,
            runtime: RuntimeConfig::default(),
            model: OnceCell::from(model),
        }
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    pub fn manager(&self) -> &ModelManager<F> {
        &self.manager
    }

    pub fn model_path(&self) -> PathBuf {
        self.manager.get_model_path(&self.info)
    }

    pub fn get(&self) -> Option<ModelHandle> {
        self.model.get().cloned()
    }

    pub fn status(&self) -> ModelStatus {
        if self.model.initialized() {
            ModelStatus::Loaded
        } else if self.manager.is_model_downloaded(&self.info) {
            ModelStatus::Downloaded
        } else {
            ModelStatus::Missing
        }
    }

    /// Downloads the artifact if needed, then loads it. Only the first
    /// successful call does any work.
    pub async fn ensure_model(&self) -> Result<ModelHandle, ModelError> {
        let handle = self
            .model
            .get_or_try_init(|| async {
                let path = self.manager.ensure_model_downloaded(&self.info).await?;
                self.load(path).await
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    /// Loads the model only if the artifact is already on disk. Never touches the network.
    pub async fn load_if_present(&self) -> Result<Option<ModelHandle>, ModelError> {
        if let Some(handle) = self.get() {
            return Ok(Some(handle));
        }
        if !self.manager.is_model_downloaded(&self.info) {
            return Ok(None);
        }
        let path = self.model_path();
        let handle = self.model.get_or_try_init(|| self.load(path)).await?;
        Ok(Some(Arc::clone(handle)))
    }

    async fn load(&self, path: PathBuf) -> Result<ModelHandle, ModelError> {
        log::info!("Loading model from {:?}", path);
        let runtime = self.runtime.clone();
        let classifier = tokio::task::spawn_blocking(move || {
            WasteClassifier::builder()
                .with_runtime_config(runtime)
                .with_expected_characteristics(BuiltinModel::WasteNet.characteristics())
                .with_custom_model(&path)?
                .build()
        })
        .await?
        .map_err(|e| {
            log::error!("Model could not be loaded: {}", e);
            ModelError::LoadFailed(e)
        })?;
        log::info!("Model loaded successfully: {:?}", classifier.info());
        Ok(Arc::new(classifier))
    }
}
