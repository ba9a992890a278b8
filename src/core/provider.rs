pub use crate::domain::model::ModelSource;

use crate::core::Storage;
use crate::prophet::ProphetArtifact;
use crate::utils::error::{ForecastError, Result};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Arc<ProphetArtifact>>>;

/// Load-once cache of artifacts keyed by source. Entries are never invalidated.
#[derive(Default)]
pub struct ModelCache {
    slots: Mutex<HashMap<ModelSource, Slot>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache shared by every provider in the process.
    pub fn global() -> Arc<ModelCache> {
        static GLOBAL: OnceLock<Arc<ModelCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(ModelCache::new())).clone()
    }

    fn slot(&self, source: &ModelSource) -> Slot {
        // 鎖只在取得 slot 時持有，抓取本身在 OnceCell 裡進行
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slots.entry(source.clone()).or_default().clone()
    }

    pub fn get(&self, source: &ModelSource) -> Option<Arc<ProphetArtifact>> {
        self.slot(source).get().cloned()
    }
}

pub struct ModelProvider<S: Storage> {
    storage: S,
    client: Client,
    timeout: Duration,
    cache: Arc<ModelCache>,
    fetches: AtomicUsize,
    last_failure: Mutex<Option<String>>,
}

impl<S: Storage> ModelProvider<S> {
    pub fn new(storage: S, timeout: Duration) -> Result<Self> {
        Self::with_cache(storage, timeout, ModelCache::global())
    }

    pub fn with_cache(storage: S, timeout: Duration, cache: Arc<ModelCache>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            storage,
            client,
            timeout,
            cache,
            fetches: AtomicUsize::new(0),
            last_failure: Mutex::new(None),
        })
    }

    /// Load the artifact behind `source`, fetching it at most once per cache.
    ///
    /// Failures are returned as `ModelLoadError` and are not cached.
    pub async fn load(&self, source: &ModelSource) -> Result<Arc<ProphetArtifact>> {
        let slot = self.cache.slot(source);
        if let Some(artifact) = slot.get() {
            tracing::debug!("Model cache hit for {}", source);
            self.record_failure(None);
            return Ok(artifact.clone());
        }

        let result = slot.get_or_try_init(|| self.fetch_artifact(source)).await;

        match result {
            Ok(artifact) => {
                self.record_failure(None);
                Ok(artifact.clone())
            }
            Err(e) => {
                tracing::error!("❌ {}", e);
                let reason = match &e {
                    ForecastError::ModelLoadError { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                self.record_failure(Some(reason));
                Err(e)
            }
        }
    }

    fn record_failure(&self, reason: Option<String>) {
        if let Ok(mut last) = self.last_failure.lock() {
            *last = reason;
        }
    }

    /// Like `load`, but yields `None` instead of an error.
    /// The reason is kept in `last_failure` until a later load succeeds.
    pub async fn try_load(&self, source: &ModelSource) -> Option<Arc<ProphetArtifact>> {
        self.load(source).await.ok()
    }

    pub fn last_failure(&self) -> Option<String> {
        self.last_failure.lock().ok().and_then(|last| last.clone())
    }

    /// Number of underlying fetches this provider issued.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn fetch_artifact(&self, source: &ModelSource) -> Result<Arc<ProphetArtifact>> {
        tracing::info!("📥 Loading model from {}", source);
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let bytes = self.fetch_bytes(source).await?;
        ProphetArtifact::from_json_slice(&bytes)
            .map(Arc::new)
            .map_err(|e| ForecastError::model_load(source.to_string(), e.to_string()))
    }

    async fn fetch_bytes(&self, source: &ModelSource) -> Result<Vec<u8>> {
        match source {
            ModelSource::Local(path) => {
                let path_str = path.to_string_lossy();
                self.storage
                    .read_file(&path_str)
                    .await
                    .map_err(|e| ForecastError::model_load(source.to_string(), e.to_string()))
            }
            ModelSource::Remote(url) => {
                tracing::debug!("Making model request to: {}", url);
                let response = self.client.get(url).send().await.map_err(|e| {
                    let reason = if e.is_timeout() {
                        format!("request timed out after {}s", self.timeout.as_secs())
                    } else {
                        format!("request failed: {}", e)
                    };
                    ForecastError::model_load(source.to_string(), reason)
                })?;

                tracing::debug!("Model response status: {}", response.status());
                if response.status() != StatusCode::OK {
                    return Err(ForecastError::model_load(
                        source.to_string(),
                        format!("unexpected HTTP status {}", response.status()),
                    ));
                }

                let bytes = response.bytes().await.map_err(|e| {
                    ForecastError::model_load(source.to_string(), format!("failed to read body: {}", e))
                })?;
                Ok(bytes.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    const ARTIFACT: &str = r#"{
        "history": { "ds": ["2024-01-01", "2024-01-02"] },
        "trend": { "k": 0.0, "m": 1.0, "t_start": "2024-01-01", "t_scale_days": 1.0 }
    }"#;

    fn provider() -> ModelProvider<LocalStorage> {
        ModelProvider::with_cache(
            LocalStorage::new("."),
            Duration::from_secs(5),
            Arc::new(ModelCache::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_local_load_is_cached() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(ARTIFACT.as_bytes()).unwrap();
        let source = ModelSource::Local(file.path().to_path_buf());
        let cache = Arc::new(ModelCache::new());
        let provider = ModelProvider::with_cache(
            LocalStorage::new("."),
            Duration::from_secs(5),
            cache.clone(),
        )
        .unwrap();
        assert!(cache.get(&source).is_none());

        let first = tokio_test::block_on(provider.load(&source)).unwrap();
        let second = tokio_test::block_on(provider.load(&source)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.get(&source).is_some());
        assert_eq!(provider.fetch_count(), 1);
    }

    #[test]
    fn test_missing_file_yields_none_with_reason() {
        let source = ModelSource::Local(PathBuf::from("/definitely/not/here/model.json"));
        let provider = provider();

        assert!(tokio_test::block_on(provider.try_load(&source)).is_none());
        assert!(provider.last_failure().is_some());
    }

    #[test]
    fn test_failures_are_not_cached() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ broken").unwrap();
        let source = ModelSource::Local(file.path().to_path_buf());
        let provider = provider();

        let err = tokio_test::block_on(provider.load(&source)).unwrap_err();
        assert!(matches!(err, ForecastError::ModelLoadError { .. }));
        assert!(provider.last_failure().is_some());

        std::fs::write(file.path(), ARTIFACT).unwrap();
        assert!(tokio_test::block_on(provider.load(&source)).is_ok());
        assert_eq!(provider.fetch_count(), 2);
        assert!(provider.last_failure().is_none());
    }
}
