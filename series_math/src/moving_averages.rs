//! Rolling means over a price series
//!
//! `RollingMean` is the streaming form; `rolling_mean` applies it to a whole
//! series and leaves the warm-up positions undefined.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Streaming trailing mean over the last `period` values
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Add a value and return the mean once the window is full
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }

        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period {
            return None;
        }
        Some(self.sum / self.period as f64)
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Trailing mean at every position; `None` until `window` values are seen
pub fn rolling_mean(series: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    let mut mean = RollingMean::new(window)?;
    Ok(series.iter().map(|&v| mean.update(v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_warm_up() {
        let means = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3).unwrap();

        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(4.0)); // (2 + 4 + 6) / 3
        assert_eq!(means[3], Some(6.0)); // (4 + 6 + 8) / 3
    }

    #[test]
    fn test_streaming_matches_batch() {
        let series: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.3).cos()).collect();
        let batch = rolling_mean(&series, 10).unwrap();

        let mut streaming = RollingMean::new(10).unwrap();
        for (i, &v) in series.iter().enumerate() {
            let got = streaming.update(v);
            match (got, batch[i]) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-12),
                (None, None) => {}
                other => panic!("mismatch at {}: {:?}", i, other),
            }
        }
        assert_eq!(streaming.period(), 10);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(RollingMean::new(0).is_err());
        assert!(rolling_mean(&[1.0], 0).is_err());
    }
}
