//! Ordinary least squares for small dense designs
//!
//! The design matrix is passed row-major as `rows[i][j]` = regressor `j` of
//! observation `i`. Solves the normal equations with Gauss-Jordan elimination,
//! which is adequate for the handful of regressors used by unit-root tests.

use crate::{MathError, Result};
use std::f64::consts::PI;

/// Fitted OLS regression
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// t statistic of coefficient `index`
    pub fn t_value(&self, index: usize) -> Option<f64> {
        let coef = self.coefficients.get(index)?;
        let se = self.std_errors.get(index)?;
        Some(coef / se)
    }

    /// Gaussian log-likelihood at the OLS estimate
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every regressor
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit `response ~ rows` by ordinary least squares
pub fn ols(rows: &[Vec<f64>], response: &[f64]) -> Result<OlsFit> {
    let nobs = rows.len();
    if nobs != response.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            nobs,
            response.len()
        )));
    }
    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no regressors".to_string(),
        ));
    }
    if rows.iter().any(|r| r.len() != k) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different lengths".to_string(),
        ));
    }
    if nobs <= k {
        return Err(MathError::InsufficientData(format!(
            "OLS with {} regressors needs more than {} observations, have {}",
            k, k, nobs
        )));
    }

    // X'X and X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in rows.iter().zip(response) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let inverse = invert(xtx)?;
    let coefficients: Vec<f64> = (0..k)
        .map(|i| (0..k).map(|j| inverse[i][j] * xty[j]).sum())
        .collect();

    let ssr: f64 = rows
        .iter()
        .zip(response)
        .map(|(row, &y)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (y - fitted).powi(2)
        })
        .sum();

    let sigma2 = ssr / (nobs - k) as f64;
    let std_errors = (0..k).map(|i| (sigma2 * inverse[i][i]).sqrt()).collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        ssr,
        nobs,
    })
}

/// Invert a square matrix with partial pivoting
fn invert(mut a: Vec<Vec<f64>>) -> Result<Vec<Vec<f64>>> {
    let n = a.len();
    let mut inv: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Design matrix is singular".to_string(),
            ));
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let p = a[col][col];
        for j in 0..n {
            a[col][j] /= p;
            inv[col][j] /= p;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                a[row][j] -= factor * a[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line() {
        // y = 1 + 2x
        let rows: Vec<Vec<f64>> = (0..6).map(|x| vec![1.0, x as f64]).collect();
        let y: Vec<f64> = (0..6).map(|x| 1.0 + 2.0 * x as f64).collect();

        let fit = ols(&rows, &y).unwrap();
        assert!((fit.coefficients[0] - 1.0).abs() < 1e-9);
        assert!((fit.coefficients[1] - 2.0).abs() < 1e-9);
        assert!(fit.ssr < 1e-18);
        assert_eq!(fit.nobs, 6);
    }

    #[test]
    fn test_noisy_fit_and_statistics() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let noise = [0.1, -0.2, 0.05, 0.15, -0.1, 0.0, -0.05, 0.1];
        let rows: Vec<Vec<f64>> = xs.iter().map(|&x| vec![1.0, x]).collect();
        let y: Vec<f64> = xs
            .iter()
            .zip(noise)
            .map(|(&x, e)| 0.5 + 3.0 * x + e)
            .collect();

        let fit = ols(&rows, &y).unwrap();
        assert!((fit.coefficients[1] - 3.0).abs() < 0.1);
        assert!(fit.std_errors.iter().all(|se| *se > 0.0));
        assert!(fit.t_value(1).unwrap() > 10.0);
        assert!(fit.aic().is_finite());
        assert!(fit.t_value(5).is_none());
    }

    #[test]
    fn test_singular_and_malformed_designs() {
        let collinear: Vec<Vec<f64>> = (0..5).map(|x| vec![x as f64, 2.0 * x as f64]).collect();
        assert!(matches!(
            ols(&collinear, &[1.0, 2.0, 3.0, 4.0, 5.0]),
            Err(MathError::CalculationError(_))
        ));

        let rows = vec![vec![1.0, 2.0], vec![1.0, 3.0]];
        assert!(ols(&rows, &[1.0, 2.0]).is_err());
        assert!(ols(&rows, &[1.0]).is_err());
    }
}
