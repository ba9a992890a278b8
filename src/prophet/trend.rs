use chrono::{Days, NaiveDate};

/// Piecewise linear trend evaluated at scaled time `t`.
///
/// trend = (k + Σ δ_j) * t + (m + Σ -c_j * δ_j) over changepoints c_j <= t
pub fn piecewise_linear(k: f64, m: f64, deltas: &[f64], changepoints: &[f64], t: f64) -> f64 {
    let mut slope = k;
    let mut offset = m;
    for (&c, &delta) in changepoints.iter().zip(deltas) {
        if t >= c {
            slope += delta;
            offset -= c * delta;
        }
    }
    slope * t + offset
}

/// Daily dates following `last`, `periods` of them.
pub fn future_dates_daily(last: NaiveDate, periods: usize) -> Option<Vec<NaiveDate>> {
    (1..=periods as u64)
        .map(|i| last.checked_add_days(Days::new(i)))
        .collect()
}

/// Days between `start` and `ds`, divided by `t_scale_days`.
pub fn scaled_time(ds: NaiveDate, start: NaiveDate, t_scale_days: f64) -> f64 {
    (ds - start).num_days() as f64 / t_scale_days
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piecewise_linear_without_changepoints() {
        assert_eq!(piecewise_linear(2.0, 1.0, &[], &[], 0.5), 2.0);
    }

    #[test]
    fn test_piecewise_linear_is_continuous_at_changepoint() {
        let before = piecewise_linear(1.0, 0.0, &[2.0], &[0.5], 0.5 - 1e-12);
        let at = piecewise_linear(1.0, 0.0, &[2.0], &[0.5], 0.5);
        assert!((before - at).abs() < 1e-9);
        // 斜率在變點之後變成 3
        let later = piecewise_linear(1.0, 0.0, &[2.0], &[0.5], 1.0);
        assert!((later - (at + 1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_future_dates_daily() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let dates = future_dates_daily(last, 3).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            ]
        );
    }
}
