use assert_approx_eq::assert_approx_eq;
use price_forecast::decoration::{decorate, forecast_statistical, DecorationParams};
use price_forecast::error::{ForecastError, Result};
use price_forecast::evaluation::{evaluate_holdout, evaluate_in_sample};
use price_forecast::models::{ArimaModel, MultiStepForecaster};
use price_forecast::predictor::{check_window, PointPredictor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use series_math::MinMaxScaler;

/// Predicts the newest value of the window
#[derive(Debug)]
struct Persistence {
    look_back: usize,
}

impl PointPredictor for Persistence {
    fn name(&self) -> &str {
        "persistence"
    }

    fn look_back(&self) -> usize {
        self.look_back
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        check_window(self.look_back, window)?;
        Ok(window[window.len() - 1])
    }
}

/// Returns one value fewer than asked for
#[derive(Debug)]
struct ShortForecaster;

impl MultiStepForecaster for ShortForecaster {
    fn name(&self) -> &str {
        "short"
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>> {
        Ok(vec![1.0; steps.saturating_sub(1)])
    }
}

fn flat_arima(level: f64) -> ArimaModel {
    // ARIMA(0,0,0) with a constant forecasts the constant everywhere
    ArimaModel::new((0, 0, 0), level, vec![], vec![], vec![level; 5], vec![]).unwrap()
}

#[test]
fn test_holdout_against_constant_forecast() {
    let model = flat_arima(100.0);
    let test = [98.0, 101.0, 104.0, 97.0];

    let accuracy = evaluate_holdout(&model, &test).unwrap();

    assert_approx_eq!(accuracy.mae, 2.5, 1e-12);
    assert_approx_eq!(accuracy.mse, 7.5, 1e-12);
    assert_approx_eq!(accuracy.rmse, 7.5_f64.sqrt(), 1e-12);
}

#[test]
fn test_holdout_needs_test_values() {
    let result = evaluate_holdout(&flat_arima(1.0), &[]);
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData { .. })
    ));
}

#[test]
fn test_in_sample_scores_in_price_units() {
    let prices: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
    let scaler = MinMaxScaler::fit(&prices).unwrap();
    let scaled = scaler.transform_all(&prices);

    let accuracy = evaluate_in_sample(&Persistence { look_back: 3 }, &scaled, &scaler).unwrap();

    // every persistence error is one step of 2.0
    assert_approx_eq!(accuracy.mae, 2.0, 1e-9);
    assert_approx_eq!(accuracy.rmse, 2.0, 1e-9);
}

#[test]
fn test_in_sample_needs_a_full_window() {
    let scaler = MinMaxScaler::fit(&[1.0, 2.0, 3.0]).unwrap();
    let scaled = scaler.transform_all(&[1.0, 2.0, 3.0]);

    let result = evaluate_in_sample(&Persistence { look_back: 3 }, &scaled, &scaler);

    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 4,
            available: 3
        })
    ));
}

#[test]
fn test_decoration_wave() {
    let params = DecorationParams::default();

    assert_eq!(params.wave(0), 0.0);
    assert_approx_eq!(params.wave(25), 0.0, 1e-12);
    assert_approx_eq!(params.wave(12), 0.05 * (2.0 * std::f64::consts::PI * 12.0 / 50.0).sin(), 1e-15);
    assert_approx_eq!(params.wave(50), 0.0, 1e-12);
}

#[test]
fn test_noiseless_decoration_adds_wave() {
    let params = DecorationParams {
        noise_scale: 0.0,
        ..DecorationParams::default()
    };
    let forecast = vec![10.0; 60];
    let mut rng = StdRng::seed_from_u64(4);

    let decorated = decorate(&forecast, &params, &mut rng).unwrap();

    assert_eq!(decorated.len(), 60);
    for (step, value) in decorated.iter().enumerate() {
        assert_approx_eq!(*value, 10.0 + params.wave(step), 1e-12);
    }
}

#[test]
fn test_statistical_forecast_keeps_plain_values() {
    let model = flat_arima(50.0);
    let mut rng = StdRng::seed_from_u64(21);

    let forecast = forecast_statistical(&model, 30, &DecorationParams::default(), &mut rng).unwrap();

    assert_eq!(forecast.plain, vec![50.0; 30]);
    assert_eq!(forecast.decorated.len(), 30);
    assert_ne!(forecast.plain, forecast.decorated);

    let mut again = StdRng::seed_from_u64(21);
    let repeat = forecast_statistical(&model, 30, &DecorationParams::default(), &mut again).unwrap();
    assert_eq!(forecast, repeat);
}

#[test]
fn test_statistical_forecast_length_checked() {
    let mut rng = StdRng::seed_from_u64(0);
    let result = forecast_statistical(&ShortForecaster, 5, &DecorationParams::default(), &mut rng);

    assert!(matches!(result, Err(ForecastError::ValidationError(_))));
}
