use clap::Parser;
use small_forecast::core::export::{line_series, render_chart};
use small_forecast::utils::error::{ForecastError, ErrorSeverity};
use small_forecast::utils::logger::{self, LogFormat};
use small_forecast::utils::validation::Validate;
use small_forecast::{CliConfig, ForecastEngine, ForecastPipeline, ForecastSettings, LocalStorage};

fn exit_with(e: &ForecastError) -> ! {
    tracing::error!(
        "❌ Forecast failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出使用者看得懂的錯誤訊息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,   // 模型載入失敗
        ErrorSeverity::High => 1,     // 設定或預測錯誤
        ErrorSeverity::Critical => 3, // 匯出 / 系統錯誤
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, cli.verbose);

    tracing::info!("Starting small-forecast CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match ForecastSettings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    if settings.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(settings.output_path.clone());
    let monitor_enabled = settings.monitor;
    // 模型路徑相對於目前工作目錄
    let pipeline = match ForecastPipeline::from_config(storage, settings, LocalStorage::new(".")) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };
    let engine = ForecastEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            if cli.chart {
                println!("📊 {} forecast", run.result.subject);
                print!("{}", render_chart(&line_series(&run.result.display)));
            }
            tracing::info!("✅ Forecast completed successfully!");
            println!("✅ Forecast completed successfully!");
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}
