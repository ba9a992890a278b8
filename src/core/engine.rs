use crate::core::{ForecastResult, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of one run: where the CSV went and the forecast it holds.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub output_path: String,
    pub result: ForecastResult,
}

pub struct ForecastEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ForecastEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Run every stage in order. The first failure stops the run.
    pub async fn run(&self) -> Result<ForecastRun> {
        tracing::info!("🚀 Starting forecast run");

        // 載入模型
        let model = self.pipeline.load_model().await?;
        self.monitor.log_stats("Load");

        // 預測
        let result = self.pipeline.forecast(model).await?;
        tracing::info!(
            "📈 Forecast produced {} rows for a {} day horizon",
            result.display.len(),
            result.days
        );
        self.monitor.log_stats("Forecast");

        // 匯出
        let output_path = self.pipeline.export(result.clone()).await?;
        tracing::info!("💾 Forecast exported to {}", output_path);
        self.monitor.log_stats("Export");

        self.monitor.log_final_stats();
        Ok(ForecastRun {
            output_path,
            result,
        })
    }
}
