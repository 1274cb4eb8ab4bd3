//! Display decoration for direct multi-step forecasts
//!
//! The statistical model forecasts every step at once; nothing is fed back.
//! For charts its output is overlaid with a sine wave and Gaussian noise.
//! The undecorated forecast is kept alongside for export.

use crate::error::{ForecastError, Result};
use crate::models::MultiStepForecaster;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Sine-plus-noise overlay for a direct forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationParams {
    pub amplitude: f64,
    /// Period of the sine wave, in steps
    pub period: usize,
    pub noise_scale: f64,
}

impl Default for DecorationParams {
    fn default() -> Self {
        Self {
            amplitude: 0.05,
            period: 50,
            noise_scale: 0.02,
        }
    }
}

impl DecorationParams {
    pub fn validate(&self) -> Result<()> {
        if self.period == 0 {
            return Err(ForecastError::InvalidParameter(
                "decoration period must be greater than zero".to_string(),
            ));
        }
        if !(self.noise_scale >= 0.0) || !self.amplitude.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "decoration needs a finite amplitude and non-negative noise, got {} and {}",
                self.amplitude, self.noise_scale
            )));
        }
        Ok(())
    }

    /// `amplitude * sin(2π * step / period)`
    pub fn wave(&self, step: usize) -> f64 {
        self.amplitude * (2.0 * PI * step as f64 / self.period as f64).sin()
    }
}

/// Add the sine wave and one noise draw to every value
pub fn decorate<R: Rng>(forecast: &[f64], params: &DecorationParams, rng: &mut R) -> Result<Vec<f64>> {
    params.validate()?;
    let noise = Normal::new(0.0, params.noise_scale)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

    Ok(forecast
        .iter()
        .enumerate()
        .map(|(step, &value)| value + params.wave(step) + noise.sample(rng))
        .collect())
}

/// Direct forecast and its decorated counterpart
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalForecast {
    pub plain: Vec<f64>,
    pub decorated: Vec<f64>,
}

/// Ask the model for `steps` values and decorate them
pub fn forecast_statistical<M, R>(
    model: &M,
    steps: usize,
    params: &DecorationParams,
    rng: &mut R,
) -> Result<StatisticalForecast>
where
    M: MultiStepForecaster + ?Sized,
    R: Rng,
{
    let plain = model.forecast(steps)?;
    if plain.len() != steps {
        return Err(ForecastError::ValidationError(format!(
            "{} returned {} values for a {}-step forecast",
            model.name(),
            plain.len(),
            steps
        )));
    }
    let decorated = decorate(&plain, params, rng)?;

    Ok(StatisticalForecast { plain, decorated })
}
