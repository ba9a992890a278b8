use crate::utils::error::{ForecastError, Result};
use crate::utils::validation::validate_model_source;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Where a model artifact lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelSource {
    Local(PathBuf),
    Remote(String),
}

impl ModelSource {
    /// Exactly one of `path` or `url` must be set.
    pub fn from_parts(path: Option<&str>, url: Option<&str>) -> Result<Self> {
        validate_model_source(path, url)?;
        match (path, url) {
            (Some(path), None) => Ok(Self::Local(PathBuf::from(path))),
            (None, Some(url)) => Ok(Self::Remote(url.to_string())),
            _ => Err(ForecastError::MissingConfigError {
                field: "model.path or model.url".to_string(),
            }),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "file {}", path.display()),
            Self::Remote(url) => write!(f, "url {}", url),
        }
    }
}

/// Dated rows handed to `predict`: one date per row and one nullable value per
/// regressor column. Rows are chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureFrame {
    pub ds: Vec<NaiveDate>,
    pub regressors: BTreeMap<String, Vec<Option<f64>>>,
}

impl FutureFrame {
    pub fn new(ds: Vec<NaiveDate>) -> Self {
        Self {
            ds,
            regressors: BTreeMap::new(),
        }
    }

    pub fn with_regressor(mut self, name: &str, values: Vec<Option<f64>>) -> Self {
        self.regressors.insert(name.to_string(), values);
        self
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.regressors.get(name).map(|v| v.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Output of `predict`, still in the model's log scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFrame {
    pub rows: Vec<ForecastRow>,
}

/// Forecast rows in the original target unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub rows: Vec<ForecastRow>,
}

impl DisplayFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Date keyed series used for charting.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone)]
pub struct ForecastResult {
    pub subject: String,
    pub days: usize,
    pub display: DisplayFrame,
    pub csv_output: String,
}
