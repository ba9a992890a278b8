use crate::domain::model::FutureFrame;
use crate::utils::error::{ForecastError, Result};

/// Rolling-statistic features the bundled models are trained with.
pub const DEFAULT_REGRESSORS: [&str; 4] = [
    "rolling_mean_7",
    "rolling_std_7",
    "rolling_mean_30",
    "rolling_std_30",
];

pub fn default_regressors() -> Vec<String> {
    DEFAULT_REGRESSORS.iter().map(|s| s.to_string()).collect()
}

/// Carry the nearest preceding non-null value forward. Leading nulls stay null.
pub fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
}

/// Fill every required regressor in `frame`.
///
/// A present column is forward-filled. An absent column, or one with no
/// non-null value at all, is replaced by zeros. A column whose length differs
/// from the frame is left that length for validation to report.
pub fn backfill_regressors(frame: &FutureFrame, required: &[String]) -> FutureFrame {
    let mut filled = frame.clone();
    let rows = filled.len();

    for name in required {
        match filled.regressors.get_mut(name) {
            Some(column) if column.iter().any(Option::is_some) => {
                forward_fill(column);
            }
            Some(column) => {
                tracing::debug!("Regressor '{}' has no known value, defaulting to 0", name);
                *column = vec![Some(0.0); rows];
            }
            None => {
                tracing::debug!("Regressor '{}' absent, defaulting to 0", name);
                filled.regressors.insert(name.clone(), vec![Some(0.0); rows]);
            }
        }
    }

    filled
}

/// Required names that are absent or still hold a null, in `required` order.
pub fn missing_regressors(frame: &FutureFrame, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| match frame.column(name) {
            Some(column) => column.len() != frame.len() || column.iter().any(Option::is_none),
            None => true,
        })
        .cloned()
        .collect()
}

/// Backfill and then fail if any required regressor is still missing.
pub fn ensure_regressors(frame: &FutureFrame, required: &[String]) -> Result<FutureFrame> {
    let filled = backfill_regressors(frame, required);
    let missing = missing_regressors(&filled, required);
    if !missing.is_empty() {
        tracing::error!("❌ Regressors still missing after backfill: {:?}", missing);
        return Err(ForecastError::RegressorMissingError { names: missing });
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_forward_fill_carries_last_known_value() {
        let mut values = vec![Some(5.0), None, None, Some(8.0), None];
        forward_fill(&mut values);
        assert_eq!(
            values,
            vec![Some(5.0), Some(5.0), Some(5.0), Some(8.0), Some(8.0)]
        );
    }

    #[test]
    fn test_absent_regressors_default_to_zero() {
        let frame = FutureFrame::new(dates(3))
            .with_regressor("A", vec![Some(1.0), None, None])
            .with_regressor("C", vec![Some(2.0), Some(3.0), None]);

        let filled = ensure_regressors(&frame, &names(&["A", "B", "C", "D"])).unwrap();

        assert_eq!(filled.column("B").unwrap(), &[Some(0.0); 3]);
        assert_eq!(filled.column("D").unwrap(), &[Some(0.0); 3]);
        assert_eq!(filled.column("A").unwrap(), &[Some(1.0); 3]);
        assert_eq!(
            filled.column("C").unwrap(),
            &[Some(2.0), Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_backfill_is_idempotent() {
        let frame = FutureFrame::new(dates(4))
            .with_regressor("A", vec![Some(1.0), None, Some(4.0), None])
            .with_regressor("B", vec![None, None, None, None]);
        let required = names(&["A", "B", "C"]);

        let once = backfill_regressors(&frame, &required);
        let twice = backfill_regressors(&once, &required);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_all_null_column_is_zero_filled() {
        let frame = FutureFrame::new(dates(2)).with_regressor("A", vec![None, None]);
        let filled = ensure_regressors(&frame, &names(&["A"])).unwrap();
        assert_eq!(filled.column("A").unwrap(), &[Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_leading_nulls_are_reported_missing() {
        let frame = FutureFrame::new(dates(3))
            .with_regressor("A", vec![None, Some(2.0), None])
            .with_regressor("B", vec![Some(1.0), None, None]);

        let err = ensure_regressors(&frame, &names(&["A", "B"])).unwrap_err();
        match err {
            ForecastError::RegressorMissingError { names } => assert_eq!(names, vec!["A"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_misaligned_column_is_reported_not_truncated() {
        let frame = FutureFrame::new(dates(2))
            .with_regressor("A", vec![Some(1.0), None, Some(9.0)])
            .with_regressor("B", vec![Some(2.0)]);
        let required = names(&["A", "B"]);

        let filled = backfill_regressors(&frame, &required);
        assert_eq!(filled.column("A").unwrap(), &[Some(1.0), Some(1.0), Some(9.0)]);
        assert_eq!(filled.column("B").unwrap(), &[Some(2.0)]);

        match ensure_regressors(&frame, &required).unwrap_err() {
            ForecastError::RegressorMissingError { names } => assert_eq!(names, vec!["A", "B"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unrequired_columns_are_left_alone() {
        let frame = FutureFrame::new(dates(2)).with_regressor("extra", vec![None, Some(1.0)]);
        let filled = backfill_regressors(&frame, &names(&["A"]));
        assert_eq!(filled.column("extra").unwrap(), &[None, Some(1.0)]);
    }
}
