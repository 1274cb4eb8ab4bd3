//! Forecast tables and the summary report of a pipeline run

use crate::data::{MissingValueReport, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::models::TrainingHistory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use series_math::stationarity::AdfResult;
use series_math::ForecastAccuracy;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported forecast value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Predicted Price")]
    pub predicted_price: f64,
}

/// Dated forecast of a single model
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    label: String,
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Pair `dates` with `prices`; both must have the same length
    pub fn new(label: &str, dates: &[NaiveDate], prices: &[f64]) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(ForecastError::ValidationError(format!(
                "{}: {} dates for {} predicted prices",
                label,
                dates.len(),
                prices.len()
            )));
        }
        let rows = dates
            .iter()
            .zip(prices)
            .map(|(&date, &predicted_price)| ForecastRow {
                date,
                predicted_price,
            })
            .collect();

        Ok(Self {
            label: label.to_string(),
            rows,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn prices(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted_price).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV with a `Date,Predicted Price` header
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read back a table written by [`ForecastTable::write_csv`]
    pub fn read_csv<P: AsRef<Path>>(label: &str, path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<ForecastRow>, _>>()?;
        Ok(Self {
            label: label.to_string(),
            rows,
        })
    }
}

/// Export name of the statistical one-year table
pub fn statistical_file_name(ticker: &str, label: &str) -> String {
    format!("{}_1yr_predictions_{}.csv", ticker_slug(ticker), label_slug(label))
}

/// Export name of a neural forecast table
pub fn neural_file_name(ticker: &str, label: &str) -> String {
    format!(
        "{}_future_predictions_{}.csv",
        ticker_slug(ticker),
        label_slug(label)
    )
}

fn ticker_slug(ticker: &str) -> String {
    ticker.trim().to_lowercase()
}

fn label_slug(label: &str) -> String {
    label.trim().replace(' ', "_")
}

/// Headline numbers of the price history
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub observations: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub last_close: Option<f64>,
}

impl SeriesSummary {
    pub fn of(series: &PriceSeries) -> Self {
        Self {
            observations: series.len(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            min: series.min(),
            max: series.max(),
            mean: series.mean(),
            last_close: series.closes().last().copied(),
        }
    }
}

/// Statistical model: hold-out score and one-year forecast
#[derive(Debug, Clone)]
pub struct StatisticalSection {
    pub model: String,
    /// Zero when the history was too short to hold anything out
    pub test_size: usize,
    pub accuracy: Option<ForecastAccuracy>,
    /// Undecorated forecast; this is what gets exported
    pub forecast: ForecastTable,
    /// Forecast with the display overlay
    pub decorated: Vec<f64>,
}

/// Neural model: in-sample score and perturbed forecast
#[derive(Debug, Clone)]
pub struct NeuralSection {
    pub model: String,
    /// Absent when the history holds no complete window plus target
    pub accuracy: Option<ForecastAccuracy>,
    pub history: Option<TrainingHistory>,
    pub forecast: ForecastTable,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub ticker: String,
    pub summary: SeriesSummary,
    pub missing: Option<MissingValueReport>,
    /// Latest rolling mean per window
    pub moving_averages: Vec<(usize, Option<f64>)>,
    pub stationarity: Option<AdfResult>,
    pub statistical: Option<StatisticalSection>,
    pub neural: Vec<NeuralSection>,
}

impl DashboardReport {
    /// Write every forecast table into `dir`, creating it if needed
    pub fn export_tables<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        if let Some(section) = &self.statistical {
            let path = dir.join(statistical_file_name(&self.ticker, section.forecast.label()));
            section.forecast.write_csv(&path)?;
            written.push(path);
        }
        for section in &self.neural {
            let path = dir.join(neural_file_name(&self.ticker, section.forecast.label()));
            section.forecast.write_csv(&path)?;
            written.push(path);
        }

        info!(dir = %dir.display(), tables = written.len(), "exported forecast tables");
        Ok(written)
    }
}

fn write_option(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{:.2}", v),
        None => write!(f, "n/a"),
    }
}

fn write_forecast_range(f: &mut fmt::Formatter<'_>, table: &ForecastTable) -> fmt::Result {
    if let (Some(first), Some(last)) = (table.rows().first(), table.rows().last()) {
        writeln!(
            f,
            "  Forecast: {} steps, {} {:.2} -> {} {:.2}",
            table.len(),
            first.date,
            first.predicted_price,
            last.date,
            last.predicted_price
        )?;
    }
    Ok(())
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} price forecast ===", self.ticker)?;
        write!(f, "Observations: {}", self.summary.observations)?;
        if let (Some(first), Some(last)) = (self.summary.first_date, self.summary.last_date) {
            write!(f, " ({} to {})", first, last)?;
        }
        writeln!(f)?;
        write!(f, "Close min/mean/max: ")?;
        write_option(f, self.summary.min)?;
        write!(f, " / ")?;
        write_option(f, self.summary.mean)?;
        write!(f, " / ")?;
        write_option(f, self.summary.max)?;
        writeln!(f)?;

        if let Some(missing) = &self.missing {
            writeln!(f, "{}", missing)?;
        }

        writeln!(f, "Moving averages:")?;
        for (window, value) in &self.moving_averages {
            write!(f, "  MA{:<4} ", window)?;
            write_option(f, *value)?;
            writeln!(f)?;
        }

        match &self.stationarity {
            Some(adf) => writeln!(f, "Stationarity of log differences:\n{}", adf)?,
            None => writeln!(f, "Stationarity of log differences: not computed")?,
        }

        if let Some(section) = &self.statistical {
            writeln!(f, "--- {} ---", section.model)?;
            if let Some(accuracy) = &section.accuracy {
                writeln!(f, "  Hold-out ({} days): {}", section.test_size, accuracy)?;
            }
            write_forecast_range(f, &section.forecast)?;
        }

        for section in &self.neural {
            writeln!(f, "--- {} ---", section.model)?;
            if let Some(accuracy) = &section.accuracy {
                writeln!(f, "  In-sample: {}", accuracy)?;
            }
            if let Some(history) = &section.history {
                writeln!(f, "{}", history)?;
            }
            write_forecast_range(f, &section.forecast)?;
        }

        Ok(())
    }
}
