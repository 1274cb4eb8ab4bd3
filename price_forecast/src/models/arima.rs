//! Fitted ARIMA model for direct multi-step forecasting

use crate::error::{ForecastError, Result};
use crate::models::{read_artifact, MultiStepForecaster};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Fitted ARIMA(p,d,q) model
///
/// The ARMA recursion runs on the `d`-times differenced history:
/// `w_t = c + Σ ar_i w_{t-i} + Σ ma_j e_{t-j}`, with future shocks zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArimaModel {
    /// Name of the model
    #[serde(default = "default_name")]
    name: String,
    /// `[p, d, q]`
    order: [usize; 3],
    /// Intercept of the differenced process
    #[serde(default)]
    constant: f64,
    /// Fitted AR coefficients
    #[serde(default)]
    ar: Vec<f64>,
    /// Fitted MA coefficients
    #[serde(default)]
    ma: Vec<f64>,
    /// Series the model was fitted on, in levels
    history: Vec<f64>,
    /// Residuals of the differenced fit, aligned with its end
    #[serde(default)]
    residuals: Vec<f64>,
}

fn default_name() -> String {
    "ARIMA".to_string()
}

impl ArimaModel {
    /// Create a fitted model from its parts
    pub fn new(
        order: (usize, usize, usize),
        constant: f64,
        ar: Vec<f64>,
        ma: Vec<f64>,
        history: Vec<f64>,
        residuals: Vec<f64>,
    ) -> Result<Self> {
        let (p, d, q) = order;
        let model = Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            order: [p, d, q],
            constant,
            ar,
            ma,
            history,
            residuals,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load a fitted model from its JSON artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: Self = read_artifact(&path)?;
        model.validate()?;
        info!(
            model = %model.name,
            path = %path.as_ref().display(),
            history = model.history.len(),
            "loaded ARIMA model"
        );
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let [p, d, q] = self.order;
        if self.ar.len() != p || self.ma.len() != q {
            return Err(ForecastError::ModelError(format!(
                "{}: order ({},{},{}) doesn't match {} AR and {} MA coefficients",
                self.name,
                p,
                d,
                q,
                self.ar.len(),
                self.ma.len()
            )));
        }
        if self.history.len() < p + d + 1 {
            return Err(ForecastError::ModelError(format!(
                "{}: history of {} values is too short for order ({},{},{})",
                self.name,
                self.history.len(),
                p,
                d,
                q
            )));
        }
        if self.residuals.len() < q {
            return Err(ForecastError::ModelError(format!(
                "{}: needs {} residuals for the MA part, has {}",
                self.name,
                q,
                self.residuals.len()
            )));
        }
        if self.history.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelError(format!(
                "{}: history contains non-finite values",
                self.name
            )));
        }
        Ok(())
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.order[0], self.order[1], self.order[2])
    }

    /// Last value the model was fitted on
    pub fn last_observation(&self) -> Option<f64> {
        self.history.last().copied()
    }
}

impl MultiStepForecaster for ArimaModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        let [p, d, q] = self.order;

        // Difference d times, remembering the last level at each stage.
        let mut anchors = Vec::with_capacity(d);
        let mut differenced = self.history.clone();
        for _ in 0..d {
            let last = differenced.last().copied().ok_or_else(|| {
                ForecastError::ModelError(format!("{}: history exhausted by differencing", self.name))
            })?;
            anchors.push(last);
            differenced = differenced.windows(2).map(|w| w[1] - w[0]).collect();
        }

        let mut shocks: Vec<f64> = self.residuals[self.residuals.len() - q..].to_vec();
        let mut forecasts = Vec::with_capacity(steps);

        for _ in 0..steps {
            let n = differenced.len();
            let ar_part: f64 = (0..p).map(|i| self.ar[i] * differenced[n - 1 - i]).sum();
            let m = shocks.len();
            let ma_part: f64 = (0..q).map(|j| self.ma[j] * shocks[m - 1 - j]).sum();
            let next = self.constant + ar_part + ma_part;

            differenced.push(next);
            shocks.push(0.0);

            // Integrate back up to levels.
            let mut level = next;
            for anchor in anchors.iter_mut().rev() {
                level += *anchor;
                *anchor = level;
            }
            forecasts.push(level);
        }

        Ok(forecasts)
    }
}
