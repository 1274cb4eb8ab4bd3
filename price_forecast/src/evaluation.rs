//! Accuracy of fitted models against observed prices

use crate::error::{ForecastError, Result};
use crate::models::MultiStepForecaster;
use crate::predictor::PointPredictor;
use series_math::{build_windows, forecast_accuracy, ForecastAccuracy, MinMaxScaler};
use tracing::debug;

/// Forecast `test.len()` steps and score them against `test`
pub fn evaluate_holdout<M>(model: &M, test: &[f64]) -> Result<ForecastAccuracy>
where
    M: MultiStepForecaster + ?Sized,
{
    if test.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        });
    }
    let predicted = model.forecast(test.len())?;
    let accuracy = forecast_accuracy(test, &predicted)?;
    debug!(model = model.name(), test_size = test.len(), %accuracy, "hold-out evaluation");
    Ok(accuracy)
}

/// Predict every window of `scaled` and score the predictions in price units
pub fn evaluate_in_sample<P>(
    predictor: &P,
    scaled: &[f64],
    scaler: &MinMaxScaler,
) -> Result<ForecastAccuracy>
where
    P: PointPredictor + ?Sized,
{
    let look_back = predictor.look_back();
    let samples = build_windows(scaled, look_back);
    if samples.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: look_back + 1,
            available: scaled.len(),
        });
    }

    let predicted = scaler.inverse_all(&predictor.predict_samples(&samples)?);
    let actual: Vec<f64> = samples.iter().map(|s| scaler.inverse(s.target)).collect();
    let accuracy = forecast_accuracy(&actual, &predicted)?;
    debug!(model = predictor.name(), samples = samples.len(), %accuracy, "in-sample evaluation");
    Ok(accuracy)
}
