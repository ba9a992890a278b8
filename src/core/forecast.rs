use crate::core::backfill::ensure_regressors;
use crate::domain::model::{DisplayFrame, ForecastFrame, ForecastRow};
use crate::domain::ports::ForecastModel;
use crate::utils::error::{ForecastError, Result};

/// Undo the log transform applied to the target at training time.
pub fn inverse_transform(forecast: ForecastFrame) -> DisplayFrame {
    DisplayFrame {
        rows: forecast
            .rows
            .into_iter()
            .map(|row| ForecastRow {
                ds: row.ds,
                yhat: row.yhat.exp(),
                yhat_lower: row.yhat_lower.exp(),
                yhat_upper: row.yhat_upper.exp(),
            })
            .collect(),
    }
}

/// Keep the chronologically last `days` rows.
pub fn truncate_to_horizon(display: DisplayFrame, days: usize) -> DisplayFrame {
    let skip = display.rows.len().saturating_sub(days);
    DisplayFrame {
        rows: display.rows.into_iter().skip(skip).collect(),
    }
}

/// Full forecast for `days` future days:
/// future frame -> regressor backfill -> predict -> exp -> trailing `days` rows.
pub fn run_forecast(
    model: &dyn ForecastModel,
    days: usize,
    required: &[String],
) -> Result<DisplayFrame> {
    if days == 0 {
        return Err(ForecastError::ValidationError {
            message: "forecast horizon must be at least one day".to_string(),
        });
    }

    let future = model
        .make_future_dataframe(days)
        .map_err(ForecastError::prediction)?;
    tracing::debug!("Future frame has {} rows", future.len());

    // 模型本身需要的 regressor 也一併補齊
    let mut required = required.to_vec();
    for name in model.regressor_names() {
        if !required.contains(&name) {
            required.push(name);
        }
    }
    let future = ensure_regressors(&future, &required)?;

    let forecast = model.predict(&future).map_err(|cause| {
        tracing::error!("❌ Model prediction failed: {}", cause);
        ForecastError::prediction(cause)
    })?;
    if forecast.rows.len() != future.len() {
        return Err(ForecastError::prediction(format!(
            "model returned {} rows for {} input rows",
            forecast.rows.len(),
            future.len()
        )));
    }

    let display_frame = truncate_to_horizon(inverse_transform(forecast), days);
    // exp 溢位時不輸出 inf
    if let Some(row) = display_frame
        .rows
        .iter()
        .find(|r| !(r.yhat.is_finite() && r.yhat_lower.is_finite() && r.yhat_upper.is_finite()))
    {
        return Err(ForecastError::prediction(format!(
            "forecast value overflows after exp at {}",
            row.ds
        )));
    }

    let rows = display_frame.len();
    tracing::debug!("Forecast truncated to {} rows", rows);
    Ok(display_frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FutureFrame;
    use crate::domain::ports::ModelError;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, n).unwrap()
    }

    fn log_frame(values: &[f64]) -> ForecastFrame {
        ForecastFrame {
            rows: values
                .iter()
                .enumerate()
                .map(|(i, &v)| ForecastRow {
                    ds: day(i as u32 + 1),
                    yhat: v,
                    yhat_lower: v - 0.5,
                    yhat_upper: v + 0.5,
                })
                .collect(),
        }
    }

    /// 固定輸出的假模型
    struct FixedModel {
        values: Vec<f64>,
        required: Vec<String>,
        fail_with: Option<String>,
    }

    impl ForecastModel for FixedModel {
        fn regressor_names(&self) -> Vec<String> {
            self.required.clone()
        }

        fn make_future_dataframe(&self, periods: usize) -> std::result::Result<FutureFrame, ModelError> {
            let history = self.values.len().saturating_sub(periods);
            Ok(FutureFrame::new(
                (0..history + periods).map(|i| day(i as u32 + 1)).collect(),
            ))
        }

        fn predict(&self, frame: &FutureFrame) -> std::result::Result<ForecastFrame, ModelError> {
            if let Some(cause) = &self.fail_with {
                return Err(cause.clone());
            }
            for name in &self.required {
                if frame.column(name).is_none() {
                    return Err(format!("missing {}", name));
                }
            }
            Ok(log_frame(&self.values[..frame.len().min(self.values.len())]))
        }
    }

    #[test]
    fn test_inverse_transform_exponentiates_all_columns() {
        let frame = log_frame(&[0.0, 1.0, -2.5]);
        let display = inverse_transform(frame.clone());

        assert_eq!(display.len(), 3);
        for (log_row, row) in frame.rows.iter().zip(&display.rows) {
            assert_eq!(row.ds, log_row.ds);
            assert_eq!(row.yhat, log_row.yhat.exp());
            assert_eq!(row.yhat_lower, log_row.yhat_lower.exp());
            assert_eq!(row.yhat_upper, log_row.yhat_upper.exp());
        }
    }

    #[test]
    fn test_truncate_keeps_last_rows() {
        let display = inverse_transform(log_frame(&[0.0, 1.0, 2.0, 3.0]));

        let tail = truncate_to_horizon(display.clone(), 2);
        assert_eq!(tail.rows.iter().map(|r| r.ds).collect::<Vec<_>>(), vec![day(3), day(4)]);

        let all = truncate_to_horizon(display, 10);
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn test_run_forecast_returns_horizon_rows() {
        let model = FixedModel {
            values: vec![0.0, 2f64.ln(), 3f64.ln()],
            required: vec!["rolling_mean_7".to_string()],
            fail_with: None,
        };

        let display = run_forecast(&model, 2, &[]).unwrap();
        assert_eq!(display.len(), 2);
        assert!((display.rows[0].yhat - 2.0).abs() < 1e-12);
        assert!((display.rows[1].yhat - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_forecast_wraps_model_failure() {
        let model = FixedModel {
            values: vec![0.0; 3],
            required: vec![],
            fail_with: Some("shape mismatch".to_string()),
        };

        match run_forecast(&model, 1, &[]) {
            Err(ForecastError::PredictionError { cause }) => assert_eq!(cause, "shape mismatch"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_run_forecast_rejects_overflowing_exp() {
        let model = FixedModel {
            values: vec![1.0, 800.0],
            required: vec![],
            fail_with: None,
        };

        match run_forecast(&model, 2, &[]) {
            Err(ForecastError::PredictionError { cause }) => {
                assert!(cause.contains("overflows"));
                assert!(cause.contains("2024-05-02"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_run_forecast_rejects_zero_days() {
        let model = FixedModel {
            values: vec![0.0],
            required: vec![],
            fail_with: None,
        };
        assert!(matches!(
            run_forecast(&model, 0, &[]),
            Err(ForecastError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_run_forecast_detects_row_count_mismatch() {
        let model = FixedModel {
            values: vec![0.0, 1.0],
            required: vec![],
            fail_with: None,
        };
        // 模型只回傳 2 列，但 frame 有 5 列
        let err = run_forecast(&model, 5, &[]).unwrap_err();
        assert!(matches!(err, ForecastError::PredictionError { .. }));
    }
}
