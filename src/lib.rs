//! # Price Forecast Workspace
//!
//! Umbrella crate over the workspace members:
//!
//! - [`series_math`]: scaling, windowing, accuracy metrics, moving averages,
//!   least squares and the augmented Dickey-Fuller test
//! - [`price_forecast`]: price loading, pretrained models, the autoregressive
//!   forecaster, the forecast pipeline and CSV export
//!
//! ## Example
//!
//! ```
//! use price_forecast_workspace::series_math::MinMaxScaler;
//!
//! let scaler = MinMaxScaler::fit(&[0.0, 4.0, 8.0]).unwrap();
//! assert_eq!(scaler.transform(4.0), 0.5);
//! assert_eq!(scaler.inverse(1.0), 8.0);
//! ```

pub use price_forecast;
pub use series_math;
