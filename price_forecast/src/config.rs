//! Run configuration, loadable from JSON

use crate::decoration::DecorationParams;
use crate::error::{ForecastError, Result};
use crate::forecaster::PerturbationParams;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Where fitted model artifacts live; a missing file skips that section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub arima: PathBuf,
    pub recurrent: PathBuf,
    pub transfer: PathBuf,
    pub recurrent_history: PathBuf,
    pub transfer_history: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            arima: PathBuf::from("models/arima.json"),
            recurrent: PathBuf::from("models/lstm.json"),
            transfer: PathBuf::from("models/transfer.json"),
            recurrent_history: PathBuf::from("models/lstm_history.json"),
            transfer_history: PathBuf::from("models/transfer_history.json"),
        }
    }
}

impl ArtifactPaths {
    /// Resolve every relative path against `base`
    pub fn relative_to(&self, base: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.clone()
            }
        };
        Self {
            arima: join(&self.arima),
            recurrent: join(&self.recurrent),
            transfer: join(&self.transfer),
            recurrent_history: join(&self.recurrent_history),
            transfer_history: join(&self.transfer_history),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub ticker: String,
    pub start_date: NaiveDate,
    /// First date excluded from the history
    pub end_date: NaiveDate,
    pub look_back: usize,
    /// Forecast length in business days
    pub horizon: usize,
    /// Share of the history held out to score the statistical model
    pub test_ratio: f64,
    pub perturbation: PerturbationParams,
    pub decoration: DecorationParams,
    pub moving_average_windows: Vec<usize>,
    pub artifacts: ArtifactPaths,
    pub output_dir: PathBuf,
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            ticker: "NVDA".to_string(),
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 10, 30).unwrap_or_default(),
            look_back: 60,
            horizon: 252,
            test_ratio: 0.1,
            perturbation: PerturbationParams::default(),
            decoration: DecorationParams::default(),
            moving_average_windows: vec![10, 20, 30, 40],
            artifacts: ArtifactPaths::default(),
            output_dir: PathBuf::from("output"),
            seed: None,
        }
    }
}

impl ForecastConfig {
    /// Read a JSON config; absent fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            return Err(ForecastError::InvalidParameter(
                "ticker must not be empty".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(ForecastError::InvalidParameter(format!(
                "start date {} must precede end date {}",
                self.start_date, self.end_date
            )));
        }
        if self.look_back == 0 {
            return Err(ForecastError::InvalidParameter(
                "look_back must be greater than zero".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be greater than zero".to_string(),
            ));
        }
        if !(self.test_ratio > 0.0 && self.test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test_ratio must be between 0 and 1, got {}",
                self.test_ratio
            )));
        }
        if self.moving_average_windows.is_empty() || self.moving_average_windows.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "moving_average_windows must be non-empty and positive".to_string(),
            ));
        }
        self.perturbation.validate()?;
        self.decoration.validate()?;
        Ok(())
    }
}
