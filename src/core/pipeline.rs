use crate::config::DEFAULT_SUBJECT;
use crate::core::export::{export_filename, to_csv};
use crate::core::forecast::run_forecast;
use crate::core::provider::ModelProvider;
use crate::core::{ConfigProvider, ForecastModel, ForecastResult, Pipeline, Storage};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Model provider -> regressor backfill -> predict -> CSV export.
///
/// `storage` receives the exported CSV; the provider reads local artifacts
/// through its own storage.
pub struct ForecastPipeline<S: Storage, C: ConfigProvider, M: Storage> {
    storage: S,
    config: C,
    provider: ModelProvider<M>,
}

impl<S: Storage, C: ConfigProvider, M: Storage> ForecastPipeline<S, C, M> {
    pub fn new(storage: S, config: C, provider: ModelProvider<M>) -> Self {
        Self {
            storage,
            config,
            provider,
        }
    }

    /// Build the model provider from the configured request timeout.
    pub fn from_config(storage: S, config: C, model_storage: M) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds());
        let provider = ModelProvider::new(model_storage, timeout)?;
        Ok(Self::new(storage, config, provider))
    }

    pub fn provider(&self) -> &ModelProvider<M> {
        &self.provider
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, M: Storage> Pipeline for ForecastPipeline<S, C, M> {
    async fn load_model(&self) -> Result<Arc<dyn ForecastModel>> {
        let source = self.config.model_source()?;
        let artifact = self.provider.load(&source).await?;
        tracing::debug!(
            "Model expects regressors: {:?}",
            artifact.regressor_names()
        );
        let model: Arc<dyn ForecastModel> = artifact;
        Ok(model)
    }

    async fn forecast(&self, model: Arc<dyn ForecastModel>) -> Result<ForecastResult> {
        let days = self.config.days();
        let display = run_forecast(model.as_ref(), days, self.config.regressors())?;
        let csv_output = to_csv(&display, days)?;

        // 設定優先，其次是模型內記錄的名稱
        let subject = self
            .config
            .subject()
            .or_else(|| model.subject())
            .unwrap_or(DEFAULT_SUBJECT)
            .to_string();

        Ok(ForecastResult {
            subject,
            days,
            display,
            csv_output,
        })
    }

    async fn export(&self, result: ForecastResult) -> Result<String> {
        let filename = export_filename(&result.subject, result.days);
        tracing::debug!(
            "Writing {} forecast rows ({} bytes) to {}",
            result.display.len(),
            result.csv_output.len(),
            filename
        );
        self.storage
            .write_file(&filename, result.csv_output.as_bytes())
            .await?;

        Ok(format!("{}/{}", self.config.output_path(), filename))
    }
}
