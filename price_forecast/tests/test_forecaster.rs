use assert_approx_eq::assert_approx_eq;
use price_forecast::error::{ForecastError, Result};
use price_forecast::forecaster::{AutoregressiveForecaster, PerturbationParams};
use price_forecast::predictor::{check_window, PointPredictor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;
use series_math::MinMaxScaler;
use std::cell::{Cell, RefCell};

/// Always predicts the same value
#[derive(Debug)]
struct ConstantPredictor {
    look_back: usize,
    value: f64,
}

impl PointPredictor for ConstantPredictor {
    fn name(&self) -> &str {
        "constant"
    }

    fn look_back(&self) -> usize {
        self.look_back
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        check_window(self.look_back, window)?;
        Ok(self.value)
    }
}

/// Predicts the newest window value and remembers every window it saw
#[derive(Debug)]
struct RecordingPredictor {
    look_back: usize,
    seen: RefCell<Vec<Vec<f64>>>,
}

impl PointPredictor for RecordingPredictor {
    fn name(&self) -> &str {
        "recording"
    }

    fn look_back(&self) -> usize {
        self.look_back
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        check_window(self.look_back, window)?;
        self.seen.borrow_mut().push(window.to_vec());
        Ok(window[window.len() - 1])
    }
}

/// Fails on its `fail_at`-th call (zero based)
#[derive(Debug)]
struct FailingPredictor {
    fail_at: usize,
    calls: Cell<usize>,
}

impl PointPredictor for FailingPredictor {
    fn name(&self) -> &str {
        "failing"
    }

    fn look_back(&self) -> usize {
        3
    }

    fn predict(&self, _window: &[f64]) -> Result<f64> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call == self.fail_at {
            return Err(ForecastError::ModelError("inference failed".to_string()));
        }
        Ok(0.5)
    }
}

fn seed_window(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64 / len as f64).collect()
}

#[test]
fn test_default_perturbation_params() {
    let params = PerturbationParams::default();

    assert_eq!(params.noise_base_scale, 0.007);
    assert_eq!(params.noise_growth_per_step, 0.00001);
    assert_eq!(params.fluctuation_probability, 0.1);
    assert_eq!(params.fluctuation_scale, 0.09);
    assert_eq!(params.seasonality_amplitude, 0.04);
    assert_eq!(params.seasonality_period, 30);
    assert_eq!(params.trend_per_step, 0.0001);
    assert!(params.validate().is_ok());
}

#[test]
fn test_noise_std_grows_with_step() {
    let params = PerturbationParams::default();

    assert_approx_eq!(params.noise_std(0), 0.007, 1e-15);
    assert_approx_eq!(params.noise_std(100), 0.008, 1e-15);
    assert_approx_eq!(params.noise_std(251), 0.00951, 1e-15);
}

#[test]
fn test_seasonality_shape() {
    let params = PerturbationParams {
        seasonality_amplitude: 0.04,
        seasonality_period: 32,
        ..PerturbationParams::none()
    };

    assert_eq!(params.seasonality(0), 0.0);
    // 3π·8/32 = 3π/4
    assert_approx_eq!(params.seasonality(8), 0.04 * (0.75 * std::f64::consts::PI).sin(), 1e-15);
    // phase resets every period
    assert_eq!(params.seasonality(32), params.seasonality(0));
    assert_eq!(params.seasonality(40), params.seasonality(8));
}

#[test]
fn test_zero_perturbation_is_pure_feedback() {
    let predictor = ConstantPredictor {
        look_back: 5,
        value: 0.5,
    };
    let forecaster = AutoregressiveForecaster::new(12, PerturbationParams::none()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let trajectory = forecaster
        .forecast(&predictor, &seed_window(5), &mut rng)
        .unwrap();

    assert_eq!(trajectory.len(), 12);
    assert_eq!(trajectory.model(), "constant");
    assert!(trajectory.values().iter().all(|&v| v == 0.5));
    assert_eq!(trajectory.values(), trajectory.raw_values());
}

#[test]
fn test_zero_horizon_gives_empty_trajectory() {
    let predictor = ConstantPredictor {
        look_back: 4,
        value: 0.5,
    };
    let forecaster = AutoregressiveForecaster::new(0, PerturbationParams::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let trajectory = forecaster
        .forecast(&predictor, &seed_window(4), &mut rng)
        .unwrap();

    assert!(trajectory.is_empty());
}

#[test]
fn test_window_slides_over_adjusted_values() {
    let predictor = RecordingPredictor {
        look_back: 5,
        seen: RefCell::new(Vec::new()),
    };
    let seed = seed_window(5);
    let forecaster = AutoregressiveForecaster::new(8, PerturbationParams::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(11);

    let trajectory = forecaster.forecast(&predictor, &seed, &mut rng).unwrap();
    let adjusted = trajectory.values();
    let seen = predictor.seen.borrow();

    assert_eq!(seen.len(), 8);
    assert_eq!(seen[0], seed);
    for k in 1..seen.len() {
        assert_eq!(seen[k].len(), 5);
        assert_eq!(seen[k][..4], seen[k - 1][1..]);
        assert_eq!(seen[k][4], adjusted[k - 1]);
    }
}

#[test]
fn test_step_components_sum_to_adjusted() {
    let predictor = ConstantPredictor {
        look_back: 5,
        value: 0.3,
    };
    let forecaster = AutoregressiveForecaster::new(40, PerturbationParams::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);

    let trajectory = forecaster
        .forecast(&predictor, &seed_window(5), &mut rng)
        .unwrap();

    for (step, trace) in trajectory.steps().iter().enumerate() {
        assert_eq!(trace.step, step);
        assert_eq!(trace.raw, 0.3);
        let sum = trace.raw + trace.noise + trace.fluctuation + trace.seasonality + trace.trend;
        assert_eq!(trace.adjusted, sum);
    }
}

#[test]
fn test_isolated_seasonality() {
    let params = PerturbationParams {
        seasonality_amplitude: 0.04,
        seasonality_period: 32,
        ..PerturbationParams::none()
    };
    let predictor = ConstantPredictor {
        look_back: 3,
        value: 0.0,
    };
    let forecaster = AutoregressiveForecaster::new(64, params).unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let values = forecaster
        .forecast(&predictor, &seed_window(3), &mut rng)
        .unwrap()
        .values();

    for (step, value) in values.iter().enumerate() {
        assert_eq!(*value, params.seasonality(step));
    }
    assert_approx_eq!(values[8], 0.04 * (0.75 * std::f64::consts::PI).sin(), 1e-15);
    assert_eq!(values[32], 0.0);
}

#[test]
fn test_isolated_trend() {
    let params = PerturbationParams {
        trend_per_step: 0.0001,
        ..PerturbationParams::none()
    };
    let predictor = ConstantPredictor {
        look_back: 3,
        value: 0.0,
    };
    let forecaster = AutoregressiveForecaster::new(252, params).unwrap();
    let mut rng = StdRng::seed_from_u64(3);

    let values = forecaster
        .forecast(&predictor, &seed_window(3), &mut rng)
        .unwrap()
        .values();

    for (step, value) in values.iter().enumerate() {
        assert_eq!(*value, 0.0001 * step as f64);
    }
}

#[test]
fn test_same_seed_reproduces_trajectory() {
    let predictor = ConstantPredictor {
        look_back: 6,
        value: 0.4,
    };
    let forecaster = AutoregressiveForecaster::new(50, PerturbationParams::default()).unwrap();

    let first = forecaster
        .forecast(&predictor, &seed_window(6), &mut StdRng::seed_from_u64(42))
        .unwrap();
    let second = forecaster
        .forecast(&predictor, &seed_window(6), &mut StdRng::seed_from_u64(42))
        .unwrap();
    let other = forecaster
        .forecast(&predictor, &seed_window(6), &mut StdRng::seed_from_u64(43))
        .unwrap();

    assert_eq!(first, second);
    assert_ne!(first.values(), other.values());
}

#[rstest]
#[case(0.0, false)]
#[case(1.0, true)]
fn test_fluctuation_probability(#[case] probability: f64, #[case] always: bool) {
    let params = PerturbationParams {
        fluctuation_probability: probability,
        fluctuation_scale: 0.09,
        ..PerturbationParams::none()
    };
    let predictor = ConstantPredictor {
        look_back: 2,
        value: 0.5,
    };
    let forecaster = AutoregressiveForecaster::new(30, params).unwrap();
    let mut rng = StdRng::seed_from_u64(9);

    let trajectory = forecaster
        .forecast(&predictor, &seed_window(2), &mut rng)
        .unwrap();

    for trace in trajectory.steps() {
        assert_eq!(trace.fluctuation != 0.0, always);
    }
}

#[test]
fn test_predictor_error_aborts_forecast() {
    let predictor = FailingPredictor {
        fail_at: 3,
        calls: Cell::new(0),
    };
    let forecaster = AutoregressiveForecaster::new(10, PerturbationParams::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    let result = forecaster.forecast(&predictor, &seed_window(3), &mut rng);

    assert!(matches!(result, Err(ForecastError::ModelError(_))));
    assert_eq!(predictor.calls.get(), 4);
}

#[test]
fn test_seed_window_length_mismatch() {
    let predictor = ConstantPredictor {
        look_back: 5,
        value: 0.5,
    };
    let forecaster = AutoregressiveForecaster::new(3, PerturbationParams::default()).unwrap();
    let mut rng = StdRng::seed_from_u64(2);

    let result = forecaster.forecast(&predictor, &seed_window(4), &mut rng);

    match result {
        Err(ForecastError::Shape { expected, actual }) => {
            assert_eq!(expected, 5);
            assert_eq!(actual, 4);
        }
        other => panic!("Expected Shape error, got {:?}", other),
    }
}

#[rstest]
#[case(PerturbationParams { fluctuation_probability: 1.5, ..PerturbationParams::default() })]
#[case(PerturbationParams { noise_base_scale: -0.1, ..PerturbationParams::default() })]
#[case(PerturbationParams { seasonality_period: 0, ..PerturbationParams::default() })]
fn test_invalid_params_rejected(#[case] params: PerturbationParams) {
    let result = AutoregressiveForecaster::new(10, params);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_trajectory_to_prices() {
    let scaler = MinMaxScaler::fit(&[100.0, 200.0]).unwrap();
    let predictor = ConstantPredictor {
        look_back: 2,
        value: 0.25,
    };
    let forecaster = AutoregressiveForecaster::new(3, PerturbationParams::none()).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let trajectory = forecaster
        .forecast(&predictor, &[0.0, 1.0], &mut rng)
        .unwrap();

    for price in trajectory.to_prices(&scaler) {
        assert_approx_eq!(price, 125.0, 1e-9);
    }
}
