//! One-step point predictors
//!
//! A point predictor maps a look-back window of scaled values to the next
//! scaled value. The recurrent and transfer-learned models both satisfy this
//! contract, so everything downstream is written once against the trait.

use crate::error::{ForecastError, Result};
use series_math::WindowedSample;
use std::fmt::Debug;

/// Single-step predictor over a fixed-length window
pub trait PointPredictor: Debug {
    /// Human readable model label
    fn name(&self) -> &str;

    /// Window length the predictor accepts
    fn look_back(&self) -> usize;

    /// Predict the value following `window`.
    ///
    /// Fails with [`ForecastError::Shape`] when `window.len() != self.look_back()`.
    fn predict(&self, window: &[f64]) -> Result<f64>;

    /// Predict the target of every sample
    fn predict_samples(&self, samples: &[WindowedSample]) -> Result<Vec<f64>> {
        samples.iter().map(|s| self.predict(&s.input)).collect()
    }
}

impl<P: PointPredictor + ?Sized> PointPredictor for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn look_back(&self) -> usize {
        (**self).look_back()
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        (**self).predict(window)
    }
}

/// Reject a window whose length differs from `expected`
pub fn check_window(expected: usize, window: &[f64]) -> Result<()> {
    if window.len() != expected {
        return Err(ForecastError::Shape {
            expected,
            actual: window.len(),
        });
    }
    Ok(())
}
