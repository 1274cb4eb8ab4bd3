//! Stationarity diagnostics
//!
//! Log differencing plus the augmented Dickey-Fuller unit-root test with a
//! constant term. Lag length is picked by AIC over a common sample, the
//! statistic is the t value of the lagged level, and p-values and critical
//! values use MacKinnon's response-surface approximations.

use crate::regression::ols;
use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// First differences of the natural log of a positive series
pub fn log_differences(prices: &[f64]) -> Result<Vec<f64>> {
    if let Some(bad) = prices.iter().find(|p| !(**p > 0.0) || !p.is_finite()) {
        return Err(MathError::InvalidInput(format!(
            "Log differences need strictly positive prices, found {}",
            bad
        )));
    }

    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Outcome of an augmented Dickey-Fuller test
#[derive(Debug, Clone, PartialEq)]
pub struct AdfResult {
    pub statistic: f64,
    pub p_value: f64,
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// Critical values at 1%, 5% and 10%
    pub critical_values: [f64; 3],
}

impl AdfResult {
    /// Whether the unit root is rejected at `significance`
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

impl std::fmt::Display for AdfResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "  ADF Statistic: {:.6}", self.statistic)?;
        writeln!(f, "  p-value:       {:.6}", self.p_value)?;
        writeln!(f, "  Lags used:     {}", self.used_lag)?;
        write!(
            f,
            "  Critical:      1%: {:.4}  5%: {:.4}  10%: {:.4}",
            self.critical_values[0], self.critical_values[1], self.critical_values[2]
        )
    }
}

/// Default maximum lag: `ceil(12 * (n / 100)^(1/4))`, capped by the sample
pub fn default_max_lag(nobs: usize) -> usize {
    let schwert = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize;
    schwert.min((nobs / 2).saturating_sub(2))
}

/// ADF test with a constant, lag chosen by AIC up to `default_max_lag`
pub fn adf_test(series: &[f64]) -> Result<AdfResult> {
    if series.len() < 6 {
        return Err(MathError::InsufficientData(format!(
            "ADF test needs at least 6 observations, have {}",
            series.len()
        )));
    }
    let max_lag = default_max_lag(series.len());
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    // Every candidate lag is scored on the sample the largest lag allows.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let (rows, response) = adf_design(series, &diffs, lag, max_lag);
        let fit = ols(&rows, &response)?;
        let aic = fit.aic();
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let (_, lag) = best.ok_or_else(|| {
        MathError::CalculationError("No lag could be evaluated".to_string())
    })?;

    adf_test_with_lag(series, lag)
}

/// ADF test with a constant and a fixed number of lagged differences
pub fn adf_test_with_lag(series: &[f64], lag: usize) -> Result<AdfResult> {
    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();
    if diffs.len() <= lag + 2 {
        return Err(MathError::InsufficientData(format!(
            "ADF test with {} lags needs more than {} observations, have {}",
            lag,
            lag + 3,
            series.len()
        )));
    }

    let (rows, response) = adf_design(series, &diffs, lag, lag);
    let fit = ols(&rows, &response)?;

    // Column 1 holds the lagged level.
    let statistic = fit.t_value(1).ok_or_else(|| {
        MathError::CalculationError("Missing lagged-level coefficient".to_string())
    })?;
    if !statistic.is_finite() {
        return Err(MathError::CalculationError(
            "ADF statistic is not finite; the series may be deterministic".to_string(),
        ));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag: lag,
        nobs: fit.nobs,
        critical_values: mackinnon_critical_values(fit.nobs),
    })
}

/// Rows `[1, y_t, dy_{t-1}, .., dy_{t-lag}]` regressed against `dy_t`,
/// for `t` from `start` to the last difference.
fn adf_design(
    levels: &[f64],
    diffs: &[f64],
    lag: usize,
    start: usize,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let mut rows = Vec::with_capacity(diffs.len() - start);
    let mut response = Vec::with_capacity(diffs.len() - start);

    for t in start..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(levels[t]);
        row.extend((1..=lag).map(|j| diffs[t - j]));
        rows.push(row);
        response.push(diffs[t]);
    }

    (rows, response)
}

/// MacKinnon (1994) approximate p-value for the constant-only case
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * statistic + c);

    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(z),
        Err(_) => f64::NAN,
    }
}

/// MacKinnon (2010) finite-sample critical values at 1%, 5% and 10%
pub fn mackinnon_critical_values(nobs: usize) -> [f64; 3] {
    const TAU_C: [[f64; 4]; 3] = [
        [-3.43035, -6.5393, -16.786, -79.433],
        [-2.86154, -2.8903, -4.234, -40.040],
        [-2.56677, -1.5384, -2.809, 0.0],
    ];

    let inv = 1.0 / nobs as f64;
    TAU_C.map(|b| b[0] + b[1] * inv + b[2] * inv.powi(2) + b[3] * inv.powi(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal as NormalDist};

    #[test]
    fn test_log_differences() {
        let diffs = log_differences(&[100.0, 110.0, 99.0]).unwrap();
        assert_eq!(diffs.len(), 2);
        assert!((diffs[0] - 1.1_f64.ln()).abs() < 1e-12);
        assert!((diffs[1] - 0.9_f64.ln()).abs() < 1e-12);

        assert!(log_differences(&[1.0, 0.0, 2.0]).is_err());
        assert!(log_differences(&[1.0, -3.0]).is_err());
    }

    #[test]
    fn test_p_value_at_asymptotic_critical_points() {
        assert!((mackinnon_p_value(-3.43) - 0.01).abs() < 0.002);
        assert!((mackinnon_p_value(-2.86) - 0.05).abs() < 0.005);
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-20.0), 0.0);
        assert!(mackinnon_p_value(0.0) > 0.9);
    }

    #[test]
    fn test_critical_values_approach_asymptotes() {
        let crit = mackinnon_critical_values(100_000);
        assert!((crit[0] + 3.43).abs() < 0.01);
        assert!((crit[1] + 2.86).abs() < 0.01);
        assert!((crit[2] + 2.57).abs() < 0.01);

        let small = mackinnon_critical_values(50);
        assert!(small[0] < crit[0]);
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = NormalDist::new(0.0, 1.0).unwrap();
        let noise: Vec<f64> = (0..400).map(|_| normal.sample(&mut rng)).collect();

        let result = adf_test(&noise).unwrap();
        assert!(result.statistic < -3.5);
        assert!(result.is_stationary(0.01));
        assert!(result.used_lag <= default_max_lag(400));
    }

    #[test]
    fn test_fixed_lag_matches_requested_lag() {
        let series: Vec<f64> = (0..120)
            .map(|i| (i as f64 * 0.7).sin() + 0.3 * (i as f64 * 1.9).cos())
            .collect();
        let result = adf_test_with_lag(&series, 2).unwrap();
        assert_eq!(result.used_lag, 2);
        assert_eq!(result.nobs, 119 - 2);
    }

    #[test]
    fn test_short_series_rejected() {
        assert!(adf_test(&[1.0, 2.0, 3.0]).is_err());
        assert!(adf_test_with_lag(&[1.0, 2.0, 1.5, 2.5], 3).is_err());
    }
}
