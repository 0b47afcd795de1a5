use std::path::PathBuf;

use crate::model_manager::ModelManager;
use crate::models::{BuiltinModel, ModelInfo};
use crate::runtime::RuntimeConfig;

/// Largest accepted upload, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: PathBuf,
    pub model_url: String,
    pub model_sha256: Option<String>,
    pub max_upload_bytes: usize,
    pub runtime: RuntimeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            models_dir: ModelManager::get_default_models_dir(),
            model_url: BuiltinModel::WasteNet.get_model_info().model_url,
            model_sha256: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The built-in model description with the configured source applied.
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_url: self.model_url.clone(),
            model_hash: self.model_sha256.as_ref().map(|h| h.trim().to_lowercase()),
            ..BuiltinModel::WasteNet.get_model_info()
        }
    }
}
