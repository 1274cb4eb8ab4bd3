//! Autoregressive multi-step forecasting with injected structure
//!
//! The forecaster calls a [`PointPredictor`] once per step on a sliding
//! window. Each raw prediction is perturbed with growing Gaussian noise, a
//! rare shock, a periodic component and a linear drift, and the perturbed
//! value (not the raw one) becomes the newest element of the next window.
//!
//! All randomness comes from the generator passed to
//! [`AutoregressiveForecaster::forecast`]; seed it for reproducible runs.

use crate::error::{ForecastError, Result};
use crate::predictor::{check_window, PointPredictor};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use series_math::{MinMaxScaler, SlidingWindow};
use std::f64::consts::PI;
use tracing::{debug, trace};

/// Perturbation applied at every forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationParams {
    /// Noise standard deviation at step 0
    pub noise_base_scale: f64,
    /// Added to the noise standard deviation per step
    pub noise_growth_per_step: f64,
    /// Chance of a shock at any step
    pub fluctuation_probability: f64,
    /// Standard deviation of a shock
    pub fluctuation_scale: f64,
    pub seasonality_amplitude: f64,
    /// Period of the periodic component, in steps
    pub seasonality_period: usize,
    pub trend_per_step: f64,
}

impl Default for PerturbationParams {
    fn default() -> Self {
        Self {
            noise_base_scale: 0.007,
            noise_growth_per_step: 0.00001,
            fluctuation_probability: 0.1,
            fluctuation_scale: 0.09,
            seasonality_amplitude: 0.04,
            seasonality_period: 30,
            trend_per_step: 0.0001,
        }
    }
}

impl PerturbationParams {
    /// No perturbation at all: the forecast is a pure feedback loop
    pub fn none() -> Self {
        Self {
            noise_base_scale: 0.0,
            noise_growth_per_step: 0.0,
            fluctuation_probability: 0.0,
            fluctuation_scale: 0.0,
            seasonality_amplitude: 0.0,
            seasonality_period: 30,
            trend_per_step: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("noise_base_scale", self.noise_base_scale),
            ("noise_growth_per_step", self.noise_growth_per_step),
            ("fluctuation_scale", self.fluctuation_scale),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.fluctuation_probability) {
            return Err(ForecastError::InvalidParameter(format!(
                "fluctuation_probability must be in [0, 1], got {}",
                self.fluctuation_probability
            )));
        }
        if self.seasonality_period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonality_period must be greater than zero".to_string(),
            ));
        }
        if !self.seasonality_amplitude.is_finite() || !self.trend_per_step.is_finite() {
            return Err(ForecastError::InvalidParameter(
                "seasonality_amplitude and trend_per_step must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Noise standard deviation at `step`; grows linearly with the step
    pub fn noise_std(&self, step: usize) -> f64 {
        self.noise_base_scale + step as f64 * self.noise_growth_per_step
    }

    /// `amplitude * sin(3π * (step mod period) / period)`
    pub fn seasonality(&self, step: usize) -> f64 {
        let phase = (step % self.seasonality_period) as f64;
        self.seasonality_amplitude
            * (3.0 * PI * phase / self.seasonality_period as f64).sin()
    }

    pub fn trend(&self, step: usize) -> f64 {
        self.trend_per_step * step as f64
    }
}

/// Every component of a single forecast step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTrace {
    pub step: usize,
    /// Predictor output before perturbation
    pub raw: f64,
    pub noise: f64,
    pub fluctuation: f64,
    pub seasonality: f64,
    pub trend: f64,
    /// `raw + noise + fluctuation + seasonality + trend`
    pub adjusted: f64,
}

/// Forecast in scaled units, one entry per step
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledTrajectory {
    model: String,
    steps: Vec<StepTrace>,
}

impl ScaledTrajectory {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn steps(&self) -> &[StepTrace] {
        &self.steps
    }

    /// Adjusted values, in order
    pub fn values(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.adjusted).collect()
    }

    /// Raw predictor outputs, in order
    pub fn raw_values(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.raw).collect()
    }

    /// Adjusted values mapped back into price units
    pub fn to_prices(&self, scaler: &MinMaxScaler) -> Vec<f64> {
        self.steps.iter().map(|s| scaler.inverse(s.adjusted)).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Multi-step forecaster feeding perturbed predictions back into its window
#[derive(Debug, Clone)]
pub struct AutoregressiveForecaster {
    horizon: usize,
    params: PerturbationParams,
}

impl AutoregressiveForecaster {
    pub fn new(horizon: usize, params: PerturbationParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { horizon, params })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn params(&self) -> &PerturbationParams {
        &self.params
    }

    /// Forecast `horizon` steps from `seed_window`, the last `look_back`
    /// scaled observations.
    ///
    /// Any predictor error aborts the whole trajectory.
    pub fn forecast<P, R>(
        &self,
        predictor: &P,
        seed_window: &[f64],
        rng: &mut R,
    ) -> Result<ScaledTrajectory>
    where
        P: PointPredictor + ?Sized,
        R: Rng,
    {
        check_window(predictor.look_back(), seed_window)?;
        let mut window = SlidingWindow::new(seed_window)?;

        debug!(
            model = predictor.name(),
            horizon = self.horizon,
            look_back = seed_window.len(),
            "starting autoregressive forecast"
        );

        let mut steps = Vec::with_capacity(self.horizon);
        for step in 0..self.horizon {
            let raw = predictor.predict(window.as_slice())?;

            let noise = Normal::new(0.0, self.params.noise_std(step))
                .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?
                .sample(rng);

            let fluctuation = if rng.gen_bool(self.params.fluctuation_probability) {
                Normal::new(0.0, self.params.fluctuation_scale)
                    .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?
                    .sample(rng)
            } else {
                0.0
            };

            let seasonality = self.params.seasonality(step);
            let trend = self.params.trend(step);
            let adjusted = raw + noise + fluctuation + seasonality + trend;

            trace!(step, raw, noise, fluctuation, seasonality, trend, adjusted, "forecast step");

            steps.push(StepTrace {
                step,
                raw,
                noise,
                fluctuation,
                seasonality,
                trend,
                adjusted,
            });
            window.push(adjusted);
        }

        Ok(ScaledTrajectory {
            model: predictor.name().to_string(),
            steps,
        })
    }
}
