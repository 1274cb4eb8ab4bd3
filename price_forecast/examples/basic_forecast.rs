use chrono::NaiveDate;
use price_forecast::calendar::business_days_after;
use price_forecast::data::PriceSeries;
use price_forecast::error::Result;
use price_forecast::forecaster::{AutoregressiveForecaster, PerturbationParams};
use price_forecast::models::layers::{Activation, DenseWeights, LstmWeights};
use price_forecast::models::recurrent::RecurrentArtifact;
use price_forecast::models::{ArimaModel, MultiStepForecaster, RecurrentModel};
use price_forecast::report::ForecastTable;
use rand::rngs::StdRng;
use rand::SeedableRng;
use series_math::{last_window, MinMaxScaler};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    // Create sample data
    let series = create_sample_series()?;
    println!(
        "Sample data created: {} daily closes, last on {}\n",
        series.len(),
        series.last_date().unwrap_or_default()
    );

    let horizon = 10;
    let dates = business_days_after(series.last_date().unwrap_or_default(), horizon);

    // Direct multi-step forecast
    let arima = ArimaModel::new(
        (1, 1, 0),
        0.0,
        vec![0.4],
        vec![],
        series.closes().to_vec(),
        vec![],
    )?;
    let table = ForecastTable::new(arima.name(), &dates, &arima.forecast(horizon)?)?;
    print_table(&table);

    // Autoregressive forecast with a small hand-built LSTM
    let scaler = MinMaxScaler::fit(series.closes())?;
    let scaled = scaler.transform_all(series.closes());
    let lstm = RecurrentModel::from_artifact(sample_lstm(20))?;
    let seed = last_window(&scaled, 20)?;

    let forecaster = AutoregressiveForecaster::new(horizon, PerturbationParams::default())?;
    let mut rng = StdRng::seed_from_u64(42);
    let trajectory = forecaster.forecast(&lstm, &seed, &mut rng)?;
    let table = ForecastTable::new("LSTM", &dates, &trajectory.to_prices(&scaler))?;
    print_table(&table);

    println!("\nSummary:");
    println!("1. ARIMA forecasts every step at once from its fitted history");
    println!("2. The LSTM forecast feeds each perturbed prediction back into its window");
    println!("3. Both tables are dated on business days after the last close");

    Ok(())
}

fn print_table(table: &ForecastTable) {
    println!("{} forecast:", table.label());
    for row in table.rows() {
        println!("  {}  {:.2}", row.date, row.predicted_price);
    }
    println!();
}

fn create_sample_series() -> Result<PriceSeries> {
    let closes = (0..120)
        .map(|i| {
            let t = i as f64;
            120.0 + 0.25 * t + 6.0 * (t / 9.0).sin()
        })
        .collect();
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default();
    PriceSeries::from_closes(start, closes)
}

/// One-unit LSTM that mostly echoes its latest input
fn sample_lstm(look_back: usize) -> RecurrentArtifact {
    RecurrentArtifact {
        name: "LSTM".to_string(),
        look_back,
        recurrent: vec![LstmWeights {
            units: 1,
            kernel: vec![vec![0.0, 0.0, 1.5, 0.0]],
            recurrent_kernel: vec![vec![0.0, 0.0, 0.0, 0.0]],
            bias: vec![4.0, -4.0, 0.0, 4.0],
        }],
        head: vec![DenseWeights {
            kernel: vec![vec![1.1]],
            bias: vec![0.0],
            activation: Activation::Linear,
        }],
    }
}
