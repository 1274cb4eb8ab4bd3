//! # Series Math
//!
//! Numeric building blocks for forecasting a scalar price series.
//! Nothing in this crate performs I/O; every function works on slices of
//! `f64` and returns owned results.

use thiserror::Error;

pub mod accuracy;
pub mod moving_averages;
pub mod regression;
pub mod scaling;
pub mod stationarity;
pub mod windowing;

pub use accuracy::{forecast_accuracy, ForecastAccuracy};
pub use scaling::MinMaxScaler;
pub use windowing::{build_windows, last_window, SlidingWindow, WindowedSample};

/// Errors that can occur in series calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for series math operations
pub type Result<T> = std::result::Result<T, MathError>;
