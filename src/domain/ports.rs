use crate::domain::model::{ForecastFrame, ForecastResult, FutureFrame, ModelSource};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn model_path(&self) -> Option<&str>;
    fn model_url(&self) -> Option<&str>;
    fn days(&self) -> usize;
    fn output_path(&self) -> &str;
    /// Explicitly configured subject; `None` defers to the model.
    fn subject(&self) -> Option<&str>;
    fn regressors(&self) -> &[String];
    fn timeout_seconds(&self) -> u64;

    /// Exactly one of `model_path` or `model_url` must be set.
    fn model_source(&self) -> Result<ModelSource> {
        ModelSource::from_parts(self.model_path(), self.model_url())
    }
}

/// Errors surfaced by a model implementation. The pipeline wraps them into
/// `ForecastError::PredictionError`.
pub type ModelError = String;

/// A fitted forecasting model. Read-only after construction.
pub trait ForecastModel: Send + Sync {
    fn regressor_names(&self) -> Vec<String>;
    /// Display name recorded with the model, if any.
    fn subject(&self) -> Option<&str> {
        None
    }
    fn make_future_dataframe(&self, periods: usize) -> std::result::Result<FutureFrame, ModelError>;
    fn predict(&self, frame: &FutureFrame) -> std::result::Result<ForecastFrame, ModelError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn load_model(&self) -> Result<Arc<dyn ForecastModel>>;
    async fn forecast(&self, model: Arc<dyn ForecastModel>) -> Result<ForecastResult>;
    async fn export(&self, result: ForecastResult) -> Result<String>;
}
