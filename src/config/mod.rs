pub mod cli;
pub mod toml_config;

use crate::core::backfill::default_regressors;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use toml_config::TomlConfig;

pub const DEFAULT_DAYS: usize = 30;
pub const MAX_DAYS: usize = 200;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_SUBJECT: &str = "Tesla_Stock";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, clap::Parser)]
#[command(name = "small-forecast")]
#[command(about = "Forecast a series from a pre-trained model and export it as CSV")]
pub struct CliConfig {
    /// Local path to a serialized model artifact
    #[arg(long, conflicts_with = "model_url")]
    pub model_path: Option<String>,

    /// HTTP(S) URL serving the model artifact
    #[arg(long)]
    pub model_url: Option<String>,

    /// Number of days to forecast (1-200, default 30)
    #[arg(short, long)]
    pub days: Option<usize>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Name used in the exported file name
    #[arg(long)]
    pub subject: Option<String>,

    /// Required regressor names, comma separated
    #[arg(long, value_delimiter = ',')]
    pub regressors: Vec<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Print the forecast as a line chart")]
    pub chart: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

/// Settings after merging the TOML file (if any) with command line flags.
#[derive(Debug, Clone)]
pub struct ForecastSettings {
    pub model_path: Option<String>,
    pub model_url: Option<String>,
    pub days: usize,
    pub output_path: String,
    pub subject: Option<String>,
    pub regressors: Vec<String>,
    pub timeout_seconds: u64,
    pub monitor: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            model_url: None,
            days: DEFAULT_DAYS,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            subject: None,
            regressors: default_regressors(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            monitor: false,
        }
    }
}

impl ForecastSettings {
    pub fn from_toml(file: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            model_path: file.model.path.clone(),
            model_url: file.model.url.clone(),
            days: file.forecast.days.unwrap_or(defaults.days),
            output_path: file
                .export
                .output_path
                .clone()
                .unwrap_or(defaults.output_path),
            subject: file.export.subject.clone(),
            regressors: file
                .forecast
                .regressors
                .clone()
                .unwrap_or(defaults.regressors),
            timeout_seconds: file.model.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            monitor: file.monitoring_enabled(),
        }
    }

    /// 命令列參數覆蓋設定檔
    #[cfg(feature = "cli")]
    pub fn from_cli(cli: &CliConfig) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Self::from_toml(&file)
            }
            None => Self::default(),
        };

        if cli.model_path.is_some() || cli.model_url.is_some() {
            settings.model_path = cli.model_path.clone();
            settings.model_url = cli.model_url.clone();
        }
        if let Some(days) = cli.days {
            settings.days = days;
        }
        if let Some(output_path) = &cli.output_path {
            settings.output_path = output_path.clone();
        }
        if cli.subject.is_some() {
            settings.subject = cli.subject.clone();
        }
        if !cli.regressors.is_empty() {
            settings.regressors = cli.regressors.clone();
        }
        if let Some(timeout) = cli.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        settings.monitor = settings.monitor || cli.monitor;

        Ok(settings)
    }
}

impl ConfigProvider for ForecastSettings {
    fn model_path(&self) -> Option<&str> {
        self.model_path.as_deref()
    }

    fn model_url(&self) -> Option<&str> {
        self.model_url.as_deref()
    }

    fn days(&self) -> usize {
        self.days
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    fn regressors(&self) -> &[String] {
        &self.regressors
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for ForecastSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_model_source(self.model_path.as_deref(), self.model_url.as_deref())?;
        validation::validate_range("forecast.days", self.days, 1, MAX_DAYS)?;
        validation::validate_path("export.output_path", &self.output_path)?;
        if let Some(subject) = &self.subject {
            validation::validate_non_empty_string("export.subject", subject)?;
        }
        validation::validate_positive_number("model.timeout_seconds", self.timeout_seconds, 1)?;
        for name in &self.regressors {
            validation::validate_non_empty_string("forecast.regressors", name)?;
        }
        Ok(())
    }
}
