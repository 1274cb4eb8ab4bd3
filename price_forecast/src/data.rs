//! Daily closing price series and CSV loading

use crate::calendar::business_day_range;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Closing prices indexed by strictly increasing trading dates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Create a series, rejecting unordered or duplicate dates
    pub fn new(dates: Vec<NaiveDate>, closes: Vec<f64>) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(ForecastError::DataError(format!(
                "{} dates but {} closing prices",
                dates.len(),
                closes.len()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(ForecastError::DataError(format!(
                "Dates must be strictly increasing: {} is followed by {}",
                pair[0], pair[1]
            )));
        }
        if let Some(i) = closes.iter().position(|c| !c.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Closing price on {} is not finite",
                dates[i]
            )));
        }

        Ok(Self { dates, closes })
    }

    /// Create a series on consecutive business days starting at `start`
    pub fn from_closes(start: NaiveDate, closes: Vec<f64>) -> Result<Self> {
        let dates = business_day_range(start, closes.len());
        Self::new(dates, closes)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Observations with `start <= date < end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let (dates, closes) = self
            .dates
            .iter()
            .zip(&self.closes)
            .filter(|(d, _)| **d >= start && **d < end)
            .map(|(d, c)| (*d, *c))
            .unzip();
        Self { dates, closes }
    }

    /// Split off the last `floor(len * test_ratio)` observations
    pub fn split_tail(&self, test_ratio: f64) -> Result<(Self, Self)> {
        if !(test_ratio > 0.0 && test_ratio < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "test ratio must be between 0 and 1, got {}",
                test_ratio
            )));
        }
        let test_size = (self.len() as f64 * test_ratio).floor() as usize;
        if test_size == 0 {
            return Err(ForecastError::InsufficientData {
                required: (1.0 / test_ratio).ceil() as usize,
                available: self.len(),
            });
        }
        let cut = self.len() - test_size;

        Ok((
            Self {
                dates: self.dates[..cut].to_vec(),
                closes: self.closes[..cut].to_vec(),
            },
            Self {
                dates: self.dates[cut..].to_vec(),
                closes: self.closes[cut..].to_vec(),
            },
        ))
    }

    pub fn min(&self) -> Option<f64> {
        self.closes.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.closes.iter().copied().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.closes.is_empty() {
            return None;
        }
        Some(self.closes.iter().sum::<f64>() / self.closes.len() as f64)
    }
}

/// Null counts per column of the raw file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingValueReport {
    pub total_rows: usize,
    pub per_column: Vec<(String, usize)>,
    /// Rows dropped because the date or close was missing
    pub dropped_rows: usize,
}

impl MissingValueReport {
    pub fn total_missing(&self) -> usize {
        self.per_column.iter().map(|(_, n)| n).sum()
    }
}

impl std::fmt::Display for MissingValueReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Missing values ({} rows):", self.total_rows)?;
        for (column, missing) in &self.per_column {
            writeln!(f, "  {:<20} {}", column, missing)?;
        }
        write!(f, "  Dropped rows: {}", self.dropped_rows)
    }
}

/// Price series plus what was found while reading it
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    pub series: PriceSeries,
    pub missing: MissingValueReport,
    pub date_column: String,
    pub close_column: String,
}

/// Loader for daily price files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a price file from CSV; the literal `null` marks a missing value
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<LoadedPrices> {
        let file = File::open(path.as_ref())?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .with_null_values(Some(NullValues::AllColumnsSingle("null".to_string())))
            .finish()?;

        info!(path = %path.as_ref().display(), rows = df.height(), "read price file");
        Self::from_dataframe(&df)
    }

    /// Extract the date and close columns of an existing DataFrame
    pub fn from_dataframe(df: &DataFrame) -> Result<LoadedPrices> {
        let date_column = Self::detect_date_column(df)?;
        let close_column = Self::detect_close_column(df)?;

        let per_column = df
            .get_columns()
            .iter()
            .map(|s| (s.name().to_string(), s.null_count()))
            .collect();

        let date_text = df.column(&date_column)?.cast(&DataType::Utf8)?;
        let closes = df.column(&close_column)?.cast(&DataType::Float64)?;

        let mut dates = Vec::with_capacity(df.height());
        let mut values = Vec::with_capacity(df.height());
        let mut dropped_rows = 0;
        for (date, close) in date_text.utf8()?.into_iter().zip(closes.f64()?.into_iter()) {
            match (date, close) {
                (Some(date), Some(close)) if close.is_finite() => {
                    dates.push(parse_date(date)?);
                    values.push(close);
                }
                _ => dropped_rows += 1,
            }
        }
        if dropped_rows > 0 {
            warn!(dropped_rows, "dropped rows with a missing date or close");
        }

        let missing = MissingValueReport {
            total_rows: df.height(),
            per_column,
            dropped_rows,
        };

        Ok(LoadedPrices {
            series: PriceSeries::new(dates, values)?,
            missing,
            date_column,
            close_column,
        })
    }

    /// Detect the date column in a DataFrame
    fn detect_date_column(df: &DataFrame) -> Result<String> {
        for name in df.get_column_names() {
            let lower = name.to_lowercase();
            if lower.contains("date") || lower.contains("time") || lower.contains("timestamp") {
                return Ok(name.to_string());
            }
        }

        if let Some(first) = df.get_columns().first() {
            if first.dtype().is_temporal() {
                return Ok(first.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No date column found in data".to_string(),
        ))
    }

    /// Detect the close column; flattened names such as `Close_NVDA` match
    fn detect_close_column(df: &DataFrame) -> Result<String> {
        let names = df.get_column_names();
        let lower: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

        let pick = lower
            .iter()
            .position(|n| n.contains("close") && !n.contains("adj"))
            .or_else(|| lower.iter().position(|n| n.contains("close")))
            .or_else(|| lower.iter().position(|n| n.contains("price")));

        pick.map(|i| names[i].to_string()).ok_or_else(|| {
            ForecastError::DataError("No close price column found in data".to_string())
        })
    }
}

/// Parse the calendar date at the start of `text`
fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    Ok(NaiveDate::parse_from_str(day, "%Y-%m-%d")?)
}
