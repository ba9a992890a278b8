use std::f64::consts::PI;

/// Fourier features for a single time point (`t_days` in days) and period (in days).
/// Layout: [sin(1), cos(1), sin(2), cos(2), ...]
pub fn fourier_terms(t_days: f64, period: f64, order: usize) -> Vec<f64> {
    let mut x = Vec::with_capacity(2 * order);
    for k in 1..=order {
        let c = 2.0 * PI * (k as f64) * t_days / period;
        x.push(c.sin());
        x.push(c.cos());
    }
    x
}

pub fn seasonal_component(t_days: f64, period: f64, order: usize, beta: &[f64]) -> f64 {
    fourier_terms(t_days, period, order)
        .iter()
        .zip(beta)
        .map(|(x, b)| x * b)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourier_terms_shape() {
        assert_eq!(fourier_terms(3.0, 7.0, 3).len(), 6);
    }

    #[test]
    fn test_seasonal_component_periodicity() {
        let beta = [0.3, -0.2, 0.1, 0.05];
        let a = seasonal_component(2.0, 7.0, 2, &beta);
        let b = seasonal_component(9.0, 7.0, 2, &beta);
        assert!((a - b).abs() < 1e-9);
    }
}
