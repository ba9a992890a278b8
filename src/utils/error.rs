use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Failed to load model from {source_desc}: {reason}")]
    ModelLoadError { source_desc: String, reason: String },

    #[error("Missing required regressors: {}", names.join(", "))]
    RegressorMissingError { names: Vec<String> },

    #[error("Prediction failed: {cause}")]
    PredictionError { cause: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ModelLoading,
    Regressors,
    Prediction,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ForecastError {
    pub fn model_load(source_desc: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelLoadError {
            source_desc: source_desc.into(),
            reason: reason.into(),
        }
    }

    pub fn prediction(cause: impl Into<String>) -> Self {
        Self::PredictionError {
            cause: cause.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ModelLoadError { .. } | Self::HttpError(_) => ErrorCategory::ModelLoading,
            Self::RegressorMissingError { .. } => ErrorCategory::Regressors,
            Self::PredictionError { .. } => ErrorCategory::Prediction,
            Self::CsvError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Export
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::ModelLoading => ErrorSeverity::Medium,
            ErrorCategory::Configuration
            | ErrorCategory::Regressors
            | ErrorCategory::Prediction => ErrorSeverity::High,
            ErrorCategory::Export => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ModelLoadError {
                source_desc,
                reason,
            } => format!("Could not load the forecasting model ({}): {}", source_desc, reason),
            Self::RegressorMissingError { names } => format!(
                "The model needs regressors that could not be filled: {}",
                names.join(", ")
            ),
            Self::PredictionError { cause } => format!("The forecast could not be computed: {}", cause),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Missing setting '{}'", field),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ModelLoadError { .. } | Self::HttpError(_) => {
                "Check that the model path exists or that the URL is reachable and returns status 200"
            }
            Self::RegressorMissingError { .. } => {
                "Make sure the artifact history carries a known value for every listed regressor"
            }
            Self::PredictionError { .. } => {
                "Check that the artifact matches the configured regressors and horizon"
            }
            Self::CsvError(_) | Self::IoError(_) => {
                "Check that the output directory is writable"
            }
            Self::SerializationError(_) => "Check that the model artifact is valid JSON",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ValidationError { .. } => "Review the command line flags or the TOML config file",
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regressor_missing_lists_every_name() {
        let err = ForecastError::RegressorMissingError {
            names: vec!["rolling_mean_7".to_string(), "rolling_std_30".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required regressors: rolling_mean_7, rolling_std_30"
        );
        assert_eq!(err.category(), ErrorCategory::Regressors);
    }

    #[test]
    fn test_severity_by_category() {
        let load = ForecastError::model_load("model.json", "file not found");
        assert_eq!(load.severity(), ErrorSeverity::Medium);
        assert!(load.user_friendly_message().contains("file not found"));

        let predict = ForecastError::prediction("shape mismatch");
        assert_eq!(predict.severity(), ErrorSeverity::High);
    }
}
