//! Fixed-length look-back windows over a series
//!
//! Contains:
//! - `build_windows`: overlapping (input, target) pairs for supervised evaluation
//! - `last_window`: the trailing window used to seed a multi-step forecast
//! - `SlidingWindow`: a bounded buffer that drops its oldest value on push

use crate::{MathError, Result};
use std::collections::VecDeque;

/// One look-back window and the observation that follows it
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSample {
    /// `series[i - look_back..i]`
    pub input: Vec<f64>,
    /// `series[i]`
    pub target: f64,
}

/// Build every (input, target) pair for `i` in `look_back..series.len()`.
///
/// Returns an empty vector when the series is not longer than the window.
pub fn build_windows(series: &[f64], look_back: usize) -> Vec<WindowedSample> {
    if look_back == 0 || series.len() <= look_back {
        return Vec::new();
    }

    series
        .windows(look_back + 1)
        .map(|w| WindowedSample {
            input: w[..look_back].to_vec(),
            target: w[look_back],
        })
        .collect()
}

/// The last `look_back` values of the series
pub fn last_window(series: &[f64], look_back: usize) -> Result<Vec<f64>> {
    if look_back == 0 {
        return Err(MathError::InvalidInput(
            "Look-back must be greater than zero".to_string(),
        ));
    }
    if series.len() < look_back {
        return Err(MathError::InsufficientData(format!(
            "Need {} observations for the look-back window, have {}",
            look_back,
            series.len()
        )));
    }

    Ok(series[series.len() - look_back..].to_vec())
}

/// Bounded window that always holds exactly `len` values
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    values: VecDeque<f64>,
}

impl SlidingWindow {
    /// Create a window from its initial contents
    pub fn new(seed: &[f64]) -> Result<Self> {
        if seed.is_empty() {
            return Err(MathError::InvalidInput(
                "Sliding window needs at least one value".to_string(),
            ));
        }

        Ok(Self {
            values: seed.iter().copied().collect(),
        })
    }

    /// Drop the oldest value and append `value` as the newest
    pub fn push(&mut self, value: f64) {
        self.values.pop_front();
        self.values.push_back(value);
    }

    /// Contiguous view of the window, oldest first
    pub fn as_slice(&mut self) -> &[f64] {
        self.values.make_contiguous()
    }

    pub fn newest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }
}
