use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub forecast: ForecastSection,
    #[serde(default)]
    pub export: ExportConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: Option<String>,
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSection {
    pub days: Option<usize>,
    pub regressors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ForecastError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ForecastError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ForecastError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    /// 只檢查檔案中有出現的欄位，其餘交給合併後的設定
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.model.url {
            validation::validate_url("model.url", url)?;
        }
        if let Some(path) = &self.model.path {
            validation::validate_path("model.path", path)?;
        }
        if let Some(days) = self.forecast.days {
            validation::validate_range("forecast.days", days, 1, 200)?;
        }
        if let Some(timeout) = self.model.timeout_seconds {
            validation::validate_positive_number("model.timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[model]
url = "https://models.example.com/tesla.json"
timeout_seconds = 10

[forecast]
days = 45
regressors = ["rolling_mean_7", "volume_change"]

[export]
output_path = "./out"
subject = "Tesla_Stock"

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.model.url.as_deref(),
            Some("https://models.example.com/tesla.json")
        );
        assert_eq!(config.model.timeout_seconds, Some(10));
        assert_eq!(config.forecast.days, Some(45));
        assert_eq!(config.forecast.regressors.as_ref().unwrap().len(), 2);
        assert_eq!(config.export.subject.as_deref(), Some("Tesla_Stock"));
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("[model]\npath = \"model.json\"\n").unwrap();
        assert_eq!(config.model.path.as_deref(), Some("model.json"));
        assert!(config.forecast.days.is_none());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SMALL_FORECAST_TEST_MODEL_URL", "https://test.models.com/m.json");

        let toml_content = r#"
[model]
url = "${SMALL_FORECAST_TEST_MODEL_URL}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.model.url.as_deref(),
            Some("https://test.models.com/m.json")
        );

        std::env::remove_var("SMALL_FORECAST_TEST_MODEL_URL");
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[forecast]\ndays = 500\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[model]\nurl = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[export]\nsubject = \"File_Test\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.export.subject.as_deref(), Some("File_Test"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            TomlConfig::from_toml_str("[model\npath ="),
            Err(ForecastError::ConfigValidationError { .. })
        ));
    }
}
