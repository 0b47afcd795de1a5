use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::classifier::ClassifierError;
use crate::models::ModelInfo;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Download of {url} failed with HTTP status {status}")]
    RemoteStatus { url: String, status: u16 },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Failed to load model: {0}")]
    LoadFailed(#[from] ClassifierError),
    #[error("Model loading task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl ModelError {
    /// True when fetching the artifact failed and a manual retry may succeed.
    pub fn is_download_failure(&self) -> bool {
        matches!(
            self,
            Self::DownloadError(_) | Self::RemoteStatus { .. } | Self::HashMismatch { .. }
        )
    }
}

/// Source of model artifact bytes.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ModelError>;
}

/// Fetches artifacts over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ModelError> {
        let response = self.client.get(url).send().await?;
        log::info!("Download response status: {}", response.status());
        if !response.status().is_success() {
            return Err(ModelError::RemoteStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

pub struct ModelManager<F = HttpFetcher> {
    models_dir: PathBuf,
    fetcher: Arc<F>,
    download_lock: Arc<Mutex<()>>,
}

impl<F> Clone for ModelManager<F> {
    fn clone(&self) -> Self {
        Self {
            models_dir: self.models_dir.clone(),
            fetcher: Arc::clone(&self.fetcher),
            download_lock: Arc::clone(&self.download_lock),
        }
    }
}

impl ModelManager<HttpFetcher> {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("WASTESORT_CACHE") {
            return PathBuf::from(path).join("models");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("wastesort").join("models");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("wastesort").join("models");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("wastesort").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        Self::with_fetcher(models_dir, HttpFetcher::new())
    }
}

impl<F: ArtifactFetcher> ModelManager<F> {
    pub fn with_fetcher<P: AsRef<Path>>(models_dir: P, fetcher: F) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            fetcher: Arc::new(fetcher),
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn get_model_path(&self, info: &ModelInfo) -> PathBuf {
        self.models_dir.join(&info.name).join(&info.file_name)
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".part");
        path.with_file_name(name)
    }

    /// Presence of the artifact is the only state checked.
    pub fn is_model_downloaded(&self, info: &ModelInfo) -> bool {
        let model_path = self.get_model_path(info);
        let exists = model_path.is_file();
        log::debug!("Model path: {:?} (exists: {})", model_path, exists);
        exists
    }

    fn hash_bytes(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ModelError> {
        log::info!("Verifying file: {:?}", path);
        let bytes = fs::read(path)?;
        let hash = Self::hash_bytes(&bytes);
        log::debug!("Calculated hash: {}", hash);
        log::debug!("Expected hash:   {}", expected_hash);
        Ok(hash == expected_hash)
    }

    /// Checks the local artifact. Without a configured hash, presence is enough.
    pub fn verify_model(&self, info: &ModelInfo) -> Result<bool, ModelError> {
        let model_path = self.get_model_path(info);
        if !model_path.is_file() {
            log::info!("Model file {:?} does not exist", model_path);
            return Ok(false);
        }
        match &info.model_hash {
            Some(expected) => self.verify_file(&model_path, expected),
            None => Ok(true),
        }
    }

    /// Fetches the artifact and moves it into place. The file only appears
    /// at its final path once it is complete (and verified, when hashed).
    async fn download_and_verify_file(&self, info: &ModelInfo, path: &Path) -> Result<(), ModelError> {
        log::info!("Downloading model file from {} to {:?}", info.model_url, path);
        let bytes = self.fetcher.fetch(&info.model_url).await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = &info.model_hash {
            let hash = Self::hash_bytes(&bytes);
            if &hash != expected {
                log::error!("Model hash mismatch: expected {}, got {}", expected, hash);
                return Err(ModelError::HashMismatch {
                    file_type: "model".to_string(),
                    expected: expected.clone(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = Self::partial_path(path);
        log::info!("Writing {} bytes to {:?}", bytes.len(), partial);
        if let Err(e) = fs::write(&partial, &bytes).and_then(|_| fs::rename(&partial, path)) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        log::info!("Model file downloaded to {:?}", path);
        Ok(())
    }

    /// Downloads the artifact unconditionally, replacing any existing file.
    pub async fn download_model(&self, info: &ModelInfo) -> Result<PathBuf, ModelError> {
        let _lock = self.download_lock.lock().await;
        let model_path = self.get_model_path(info);
        self.download_and_verify_file(info, &model_path).await?;
        Ok(model_path)
    }

    pub fn remove_download(&self, info: &ModelInfo) -> Result<(), ModelError> {
        let model_path = self.get_model_path(info);
        if model_path.exists() {
            log::info!("Removing model file {:?}", model_path);
            fs::remove_file(&model_path)?;
        }
        let partial = Self::partial_path(&model_path);
        if partial.exists() {
            fs::remove_file(&partial)?;
        }
        Ok(())
    }

    /// Ensures that the model artifact is present locally and returns its path.
    /// If the artifact exists, no network request is made.
    /// If it is missing (or fails a configured hash check), it is downloaded once.
    pub async fn ensure_model_downloaded(&self, info: &ModelInfo) -> Result<PathBuf, ModelError> {
        let model_path = self.get_model_path(info);
        let _lock = self.download_lock.lock().await;

        if self.verify_model(info)? {
            log::info!("Model {} already present at {:?}", info.name, model_path);
            return Ok(model_path);
        }

        if model_path.exists() {
            log::warn!("Model file verification failed, redownloading");
            fs::remove_file(&model_path)?;
        } else {
            log::info!("Model {} not found, downloading...", info.name);
        }

        match self.download_and_verify_file(info, &model_path).await {
            Ok(()) => Ok(model_path),
            Err(e) => {
                log::warn!("Failed to download model {}: {}", info.name, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetcher {
        calls: AtomicUsize,
        payload: Vec<u8>,
    }

    #[async_trait]
    impl ArtifactFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn test_info(hash: Option<String>) -> ModelInfo {
        ModelInfo {
            name: "unit".to_string(),
            file_name: "model.onnx".to_string(),
            model_url: "https://example.invalid/model.onnx".to_string(),
            model_hash: hash,
        }
    }

    #[test]
    fn test_default_models_dir() {
        // Test with environment variable
        env::set_var("WASTESORT_CACHE", "/tmp/test-cache");
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("/tmp/test-cache/models"));
        env::remove_var("WASTESORT_CACHE");

        // Test without environment variable
        let path = ModelManager::get_default_models_dir();
        assert!(path.to_str().unwrap().contains("wastesort/models"));
    }

    #[test]
    fn test_partial_path() {
        let path = ModelManager::<HttpFetcher>::partial_path(Path::new("/a/b/model.onnx"));
        assert_eq!(path, PathBuf::from("/a/b/model.onnx.part"));
    }

    #[tokio::test]
    async fn test_hash_mismatch_leaves_no_artifact() {
        let dir = env::temp_dir().join("wastesort-unit-hash-mismatch");
        let _ = fs::remove_dir_all(&dir);
        let fetcher = StaticFetcher { calls: AtomicUsize::new(0), payload: b"weights".to_vec() };
        let manager = ModelManager::with_fetcher(&dir, fetcher).unwrap();
        let info = test_info(Some("0".repeat(64)));

        let result = manager.ensure_model_downloaded(&info).await;
        assert!(matches!(result, Err(ModelError::HashMismatch { .. })));
        assert!(!manager.is_model_downloaded(&info));
        assert!(result.unwrap_err().is_download_failure());
    }

    #[tokio::test]
    async fn test_existing_file_with_bad_hash_is_refetched() {
        let dir = env::temp_dir().join("wastesort-unit-refetch");
        let _ = fs::remove_dir_all(&dir);
        let payload = b"good weights".to_vec();
        let hash = ModelManager::<StaticFetcher>::hash_bytes(&payload);
        let fetcher = StaticFetcher { calls: AtomicUsize::new(0), payload: payload.clone() };
        let manager = ModelManager::with_fetcher(&dir, fetcher).unwrap();
        let info = test_info(Some(hash));

        let path = manager.get_model_path(&info);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"stale").unwrap();
        assert!(!manager.verify_model(&info).unwrap());

        manager.ensure_model_downloaded(&info).await.unwrap();
        assert_eq!(fs::read(&path).unwrap(), payload);
        assert_eq!(manager.fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(manager.verify_model(&info).unwrap());
    }
}
