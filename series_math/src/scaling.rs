//! Min-max scaling of a price series
//!
//! The scaler is fitted once on the full history and then reused both to
//! map observations into the feature range and to map model outputs back
//! into price units.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Linear transform fitted on a series' minimum and maximum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: f64,
    data_max: f64,
    feature_min: f64,
    feature_max: f64,
    scale: f64,
    offset: f64,
}

impl MinMaxScaler {
    /// Fit a scaler mapping the series into `[0, 1]`
    pub fn fit(series: &[f64]) -> Result<Self> {
        Self::fit_with_range(series, 0.0, 1.0)
    }

    /// Fit a scaler mapping the series into `[feature_min, feature_max]`
    pub fn fit_with_range(series: &[f64], feature_min: f64, feature_max: f64) -> Result<Self> {
        if series.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if !(feature_min < feature_max) {
            return Err(MathError::InvalidInput(format!(
                "Feature range ({}, {}) must be increasing",
                feature_min, feature_max
            )));
        }
        if let Some(bad) = series.iter().find(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(format!(
                "Series contains a non-finite value: {}",
                bad
            )));
        }

        let data_min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // A constant series has no range; every value maps onto feature_min.
        let mut data_range = data_max - data_min;
        if data_range == 0.0 {
            data_range = 1.0;
        }

        let scale = (feature_max - feature_min) / data_range;
        let offset = feature_min - data_min * scale;

        Ok(Self {
            data_min,
            data_max,
            feature_min,
            feature_max,
            scale,
            offset,
        })
    }

    /// Map a value in data units into the feature range
    pub fn transform(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    /// Map a value in feature units back to data units
    pub fn inverse(&self, scaled: f64) -> f64 {
        (scaled - self.offset) / self.scale
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }

    pub fn inverse_all(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&v| self.inverse(v)).collect()
    }

    /// Minimum seen while fitting
    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    /// Maximum seen while fitting
    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    /// Target range of the transform
    pub fn feature_range(&self) -> (f64, f64) {
        (self.feature_min, self.feature_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_maps_extremes_to_unit_range() {
        let scaler = MinMaxScaler::fit(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();

        assert_eq!(scaler.transform(10.0), 0.0);
        assert_eq!(scaler.transform(50.0), 1.0);
        assert!((scaler.transform(30.0) - 0.5).abs() < 1e-12);
        assert_eq!(scaler.data_min(), 10.0);
        assert_eq!(scaler.data_max(), 50.0);
    }

    #[test]
    fn test_round_trip_within_fitted_range() {
        let series = [131.2, 98.7, 145.9, 101.3, 120.0];
        let scaler = MinMaxScaler::fit(&series).unwrap();

        let mut v = 98.7;
        while v <= 145.9 {
            let back = scaler.inverse(scaler.transform(v));
            assert!((back - v).abs() < 1e-9, "{} round-tripped to {}", v, back);
            v += 0.37;
        }
    }

    #[test]
    fn test_custom_range() {
        let scaler = MinMaxScaler::fit_with_range(&[0.0, 5.0, 10.0], -1.0, 1.0).unwrap();
        assert_eq!(scaler.transform(0.0), -1.0);
        assert_eq!(scaler.transform(10.0), 1.0);
        assert_eq!(scaler.feature_range(), (-1.0, 1.0));
    }

    #[test]
    fn test_values_outside_range_extrapolate() {
        let scaler = MinMaxScaler::fit(&[100.0, 200.0]).unwrap();
        assert!((scaler.transform(250.0) - 1.5).abs() < 1e-12);
        assert!((scaler.inverse(1.5) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_series() {
        let scaler = MinMaxScaler::fit(&[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(scaler.transform(7.0), 0.0);
        assert_eq!(scaler.inverse(0.0), 7.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[1.0, f64::NAN]).is_err());
        assert!(MinMaxScaler::fit_with_range(&[1.0, 2.0], 1.0, 1.0).is_err());
    }
}
