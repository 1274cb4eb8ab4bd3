//! # forecast_report
//!
//! Command-line front end: load a price history and the model artifacts,
//! run the forecast pipeline, print the report and write the CSV tables.

use anyhow::{bail, Context, Result};
use clap::Parser;
use price_forecast::{DataLoader, ForecastConfig, ForecastPipeline, ModelSet};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forecast_report")]
#[command(about = "Forecast a daily closing price series with pretrained models", long_about = None)]
struct Cli {
    /// Price history CSV with a date and a close column
    #[arg(short, long)]
    prices: PathBuf,

    /// JSON config; artifact paths in it are relative to its directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the exported forecast tables
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seed for reproducible forecasts
    #[arg(short, long)]
    seed: Option<u64>,

    /// Forecast length in business days
    #[arg(long)]
    horizon: Option<usize>,

    /// Look-back window length
    #[arg(long)]
    look_back: Option<usize>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}

fn load_config(cli: &Cli) -> Result<ForecastConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ForecastConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            if let Some(dir) = path.parent() {
                config.artifacts = config.artifacts.relative_to(dir);
            }
            config
        }
        None => ForecastConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    if let Some(look_back) = cli.look_back {
        config.look_back = look_back;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let loaded = DataLoader::from_csv(&cli.prices)
        .with_context(|| format!("loading prices from {}", cli.prices.display()))?;
    info!(
        date_column = %loaded.date_column,
        close_column = %loaded.close_column,
        rows = loaded.series.len(),
        "loaded price history"
    );

    let series = loaded.series.between(config.start_date, config.end_date);
    if series.is_empty() {
        bail!(
            "no prices between {} and {}",
            config.start_date,
            config.end_date
        );
    }

    let models = ModelSet::load(&config.artifacts).context("loading model artifacts")?;
    if models.is_empty() {
        bail!("no model artifacts found; nothing to forecast");
    }

    let output_dir = config.output_dir.clone();
    let pipeline = ForecastPipeline::new(config)?;
    let report = pipeline.run_with_missing(&series, Some(loaded.missing), &models)?;
    println!("{}", report);

    for path in report.export_tables(&output_dir)? {
        println!("Wrote {}", path.display());
    }

    Ok(())
}
