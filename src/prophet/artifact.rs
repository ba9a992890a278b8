use crate::domain::model::{ForecastFrame, ForecastRow, FutureFrame};
use crate::domain::ports::{ForecastModel, ModelError};
use crate::prophet::seasonality::seasonal_component;
use crate::prophet::trend::{future_dates_daily, piecewise_linear, scaled_time};
use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub ds: Vec<NaiveDate>,
    #[serde(default)]
    pub regressors: BTreeMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendParams {
    pub k: f64,
    pub m: f64,
    #[serde(default)]
    pub changepoints: Vec<f64>,
    #[serde(default)]
    pub deltas: Vec<f64>,
    pub t_start: NaiveDate,
    pub t_scale_days: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityParams {
    pub name: String,
    pub period_days: f64,
    pub fourier_order: usize,
    pub beta: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressorParams {
    pub name: String,
    #[serde(default)]
    pub mu: f64,
    #[serde(default = "default_one")]
    pub std: f64,
    pub coefficient: f64,
}

/// Serialized, previously fitted additive model (trend + seasonality + regressors),
/// trained on a log-transformed target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProphetArtifact {
    #[serde(default)]
    pub subject: Option<String>,
    pub history: History,
    pub trend: TrendParams,
    #[serde(default)]
    pub seasonalities: Vec<SeasonalityParams>,
    #[serde(default)]
    pub regressors: Vec<RegressorParams>,
    #[serde(default = "default_one")]
    pub y_scale: f64,
    #[serde(default)]
    pub sigma_obs: f64,
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,
}

fn default_one() -> f64 {
    1.0
}

fn default_interval_width() -> f64 {
    0.80
}

impl ProphetArtifact {
    /// 從 JSON bytes 反序列化並檢查結構
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: Self = serde_json::from_slice(bytes)?;
        artifact.validate_structure()?;
        Ok(artifact)
    }

    fn validate_structure(&self) -> Result<()> {
        let invalid = |message: String| ForecastError::ValidationError { message };

        if self.history.ds.is_empty() {
            return Err(invalid("artifact history has no dates".to_string()));
        }
        if self.history.ds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("artifact history dates are not strictly increasing".to_string()));
        }
        for (name, values) in &self.history.regressors {
            if values.len() != self.history.ds.len() {
                return Err(invalid(format!(
                    "history regressor '{}' has {} values for {} dates",
                    name,
                    values.len(),
                    self.history.ds.len()
                )));
            }
        }
        if self.trend.t_scale_days <= 0.0 {
            return Err(invalid("trend.t_scale_days must be positive".to_string()));
        }
        if self.trend.changepoints.len() != self.trend.deltas.len() {
            return Err(invalid(format!(
                "trend has {} changepoints but {} deltas",
                self.trend.changepoints.len(),
                self.trend.deltas.len()
            )));
        }
        for s in &self.seasonalities {
            if s.period_days <= 0.0 || s.beta.len() != 2 * s.fourier_order {
                return Err(invalid(format!(
                    "seasonality '{}' needs a positive period and {} coefficients",
                    s.name,
                    2 * s.fourier_order
                )));
            }
        }
        for r in &self.regressors {
            if r.std <= 0.0 {
                return Err(invalid(format!("regressor '{}' has non-positive std", r.name)));
            }
        }
        Ok(())
    }

    fn z_score(&self) -> f64 {
        match (self.interval_width * 100.0).round() as i32 {
            80 => 1.28,
            90 => 1.645,
            95 => 1.96,
            99 => 2.576,
            _ => 1.28,
        }
    }

    fn regressor_value(
        frame: &FutureFrame,
        name: &str,
        row: usize,
    ) -> std::result::Result<f64, ModelError> {
        let column = frame
            .column(name)
            .ok_or_else(|| format!("missing regressor column '{}'", name))?;
        if column.len() != frame.len() {
            return Err(format!(
                "regressor column '{}' has {} values for {} rows",
                name,
                column.len(),
                frame.len()
            ));
        }
        column[row].ok_or_else(|| format!("regressor '{}' is null at {}", name, frame.ds[row]))
    }
}

impl ForecastModel for ProphetArtifact {
    fn regressor_names(&self) -> Vec<String> {
        self.regressors.iter().map(|r| r.name.clone()).collect()
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn make_future_dataframe(&self, periods: usize) -> std::result::Result<FutureFrame, ModelError> {
        let last = *self
            .history
            .ds
            .last()
            .ok_or_else(|| "artifact history has no dates".to_string())?;
        let future = future_dates_daily(last, periods)
            .ok_or_else(|| format!("{} periods after {} overflows the calendar", periods, last))?;

        let mut ds = self.history.ds.clone();
        ds.extend(future);

        let mut frame = FutureFrame::new(ds);
        for (name, values) in &self.history.regressors {
            let mut column = values.clone();
            column.resize(frame.len(), None);
            frame.regressors.insert(name.clone(), column);
        }
        Ok(frame)
    }

    fn predict(&self, frame: &FutureFrame) -> std::result::Result<ForecastFrame, ModelError> {
        if frame.is_empty() {
            return Err("cannot predict on an empty frame".to_string());
        }

        let margin = self.z_score() * self.sigma_obs * self.y_scale;
        let mut rows = Vec::with_capacity(frame.len());

        for (i, &ds) in frame.ds.iter().enumerate() {
            let t_days = (ds - self.trend.t_start).num_days() as f64;
            let t = scaled_time(ds, self.trend.t_start, self.trend.t_scale_days);

            let mut y = piecewise_linear(
                self.trend.k,
                self.trend.m,
                &self.trend.deltas,
                &self.trend.changepoints,
                t,
            );
            for s in &self.seasonalities {
                y += seasonal_component(t_days, s.period_days, s.fourier_order, &s.beta);
            }
            for r in &self.regressors {
                let x = Self::regressor_value(frame, &r.name, i)?;
                y += r.coefficient * (x - r.mu) / r.std;
            }

            let yhat = y * self.y_scale;
            if !yhat.is_finite() {
                return Err(format!("non-finite prediction at {}", ds));
            }
            rows.push(ForecastRow {
                ds,
                yhat,
                yhat_lower: yhat - margin,
                yhat_upper: yhat + margin,
            });
        }

        Ok(ForecastFrame { rows })
    }
}
