//! # Price Forecast
//!
//! A Rust library for forecasting a daily closing price series with
//! pretrained models.
//!
//! ## Features
//!
//! - Price history loading from CSV (date and close column detection,
//!   missing-value report)
//! - Min-max scaling and look-back windowing
//! - Pretrained models loaded from JSON artifacts: recurrent (LSTM),
//!   transfer-learned and ARIMA
//! - Autoregressive multi-step forecasting with injected noise, rare shocks,
//!   seasonality and trend
//! - Model evaluation (MAE, MSE, RMSE, MAPE), ADF stationarity test, moving
//!   averages
//! - Forecast tables dated on business days, exported as CSV
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_forecast::{DataLoader, ForecastConfig, ForecastPipeline, ModelSet};
//!
//! fn main() -> Result<(), price_forecast::ForecastError> {
//!     let config = ForecastConfig::default();
//!
//!     // Load data
//!     let loaded = DataLoader::from_csv("nvda.csv")?;
//!     let series = loaded.series.between(config.start_date, config.end_date);
//!
//!     // Load whichever model artifacts exist
//!     let models = ModelSet::load(&config.artifacts)?;
//!
//!     // Run every model and write the forecast tables
//!     let report = ForecastPipeline::new(config)?.run(&series, &models)?;
//!     println!("{}", report);
//!     report.export_tables("output")?;
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod data;
pub mod decoration;
pub mod error;
pub mod evaluation;
pub mod forecaster;
pub mod models;
pub mod pipeline;
pub mod predictor;
pub mod report;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{DataLoader, PriceSeries};
pub use crate::error::ForecastError;
pub use crate::forecaster::{AutoregressiveForecaster, PerturbationParams, ScaledTrajectory};
pub use crate::models::MultiStepForecaster;
pub use crate::pipeline::{ForecastPipeline, ModelSet, NeuralModel};
pub use crate::predictor::PointPredictor;
pub use crate::report::{DashboardReport, ForecastTable};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
