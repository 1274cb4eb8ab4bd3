//! End-to-end forecast run over a loaded price history

use crate::calendar::business_days_after;
use crate::config::{ArtifactPaths, ForecastConfig};
use crate::data::{MissingValueReport, PriceSeries};
use crate::decoration::forecast_statistical;
use crate::error::{ForecastError, Result};
use crate::evaluation::{evaluate_holdout, evaluate_in_sample};
use crate::forecaster::AutoregressiveForecaster;
use crate::models::{
    ArimaModel, MultiStepForecaster, RecurrentModel, TrainingHistory, TransferLearnedModel,
};
use crate::predictor::PointPredictor;
use crate::report::{
    DashboardReport, ForecastTable, NeuralSection, SeriesSummary, StatisticalSection,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use series_math::moving_averages::rolling_mean;
use series_math::stationarity::{adf_test, log_differences, AdfResult};
use series_math::{last_window, MinMaxScaler};
use std::path::Path;
use tracing::{debug, info, warn};

/// A point predictor and the losses it was trained with
#[derive(Debug)]
pub struct NeuralModel {
    pub predictor: Box<dyn PointPredictor>,
    pub history: Option<TrainingHistory>,
}

impl NeuralModel {
    pub fn new<P: PointPredictor + 'static>(predictor: P) -> Self {
        Self {
            predictor: Box::new(predictor),
            history: None,
        }
    }

    pub fn with_history(mut self, history: TrainingHistory) -> Self {
        self.history = Some(history);
        self
    }
}

/// Models taking part in a run
#[derive(Debug, Default)]
pub struct ModelSet {
    pub statistical: Option<Box<dyn MultiStepForecaster>>,
    pub neural: Vec<NeuralModel>,
}

impl ModelSet {
    /// Load every artifact that exists; absent ones are skipped with a warning
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let mut models = Self::default();

        if paths.arima.exists() {
            models.statistical = Some(Box::new(ArimaModel::load(&paths.arima)?));
        } else {
            warn!(path = %paths.arima.display(), "ARIMA artifact not found, skipping");
        }

        if paths.recurrent.exists() {
            let model = NeuralModel::new(RecurrentModel::load(&paths.recurrent)?);
            models.neural.push(attach_history(model, &paths.recurrent_history)?);
        } else {
            warn!(path = %paths.recurrent.display(), "recurrent artifact not found, skipping");
        }

        if paths.transfer.exists() {
            let model = NeuralModel::new(TransferLearnedModel::load(&paths.transfer)?);
            models.neural.push(attach_history(model, &paths.transfer_history)?);
        } else {
            warn!(path = %paths.transfer.display(), "transfer artifact not found, skipping");
        }

        Ok(models)
    }

    pub fn is_empty(&self) -> bool {
        self.statistical.is_none() && self.neural.is_empty()
    }
}

fn attach_history(model: NeuralModel, path: &Path) -> Result<NeuralModel> {
    if path.exists() {
        Ok(model.with_history(TrainingHistory::load(path)?))
    } else {
        warn!(path = %path.display(), "training history not found");
        Ok(model)
    }
}

/// Runs diagnostics and every model over one price history
#[derive(Debug, Clone)]
pub struct ForecastPipeline {
    config: ForecastConfig,
}

impl ForecastPipeline {
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Generator for the model section at `index`
    fn section_rng(&self, index: u64) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index)),
            None => StdRng::from_entropy(),
        }
    }

    pub fn run(&self, series: &PriceSeries, models: &ModelSet) -> Result<DashboardReport> {
        self.run_with_missing(series, None, models)
    }

    /// Run and attach the missing-value report of the loaded file
    pub fn run_with_missing(
        &self,
        series: &PriceSeries,
        missing: Option<MissingValueReport>,
        models: &ModelSet,
    ) -> Result<DashboardReport> {
        let look_back = self.config.look_back;
        if series.len() < look_back {
            return Err(ForecastError::InsufficientData {
                required: look_back,
                available: series.len(),
            });
        }
        let last_date = series.last_date().ok_or(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        })?;

        info!(
            ticker = %self.config.ticker,
            observations = series.len(),
            horizon = self.config.horizon,
            "running forecast pipeline"
        );

        let closes = series.closes();
        let scaler = MinMaxScaler::fit(closes)?;
        let scaled = scaler.transform_all(closes);
        debug!(min = scaler.data_min(), max = scaler.data_max(), "fitted scaler");

        let moving_averages = self
            .config
            .moving_average_windows
            .iter()
            .map(|&window| {
                let latest = rolling_mean(closes, window)?.last().copied().flatten();
                Ok((window, latest))
            })
            .collect::<Result<Vec<_>>>()?;

        let stationarity = self.stationarity(closes);
        let future_dates = business_days_after(last_date, self.config.horizon);

        let statistical = match &models.statistical {
            Some(model) => Some(self.statistical_section(
                model.as_ref(),
                series,
                &future_dates,
            )?),
            None => None,
        };

        let mut neural = Vec::with_capacity(models.neural.len());
        for (i, model) in models.neural.iter().enumerate() {
            neural.push(self.neural_section(
                model,
                &scaled,
                &scaler,
                &future_dates,
                i as u64 + 1,
            )?);
        }

        info!(
            statistical = statistical.is_some(),
            neural = neural.len(),
            "forecast pipeline complete"
        );

        Ok(DashboardReport {
            ticker: self.config.ticker.clone(),
            summary: SeriesSummary::of(series),
            missing,
            moving_averages,
            stationarity,
            statistical,
            neural,
        })
    }

    fn stationarity(&self, closes: &[f64]) -> Option<AdfResult> {
        let result = log_differences(closes).and_then(|diffs| adf_test(&diffs));
        match result {
            Ok(adf) => {
                debug!(statistic = adf.statistic, p_value = adf.p_value, "ADF test");
                Some(adf)
            }
            Err(e) => {
                warn!(error = %e, "skipping stationarity test");
                None
            }
        }
    }

    fn statistical_section(
        &self,
        model: &dyn MultiStepForecaster,
        series: &PriceSeries,
        future_dates: &[chrono::NaiveDate],
    ) -> Result<StatisticalSection> {
        let (accuracy, test_size) = match series.split_tail(self.config.test_ratio) {
            Ok((_, test)) => (Some(evaluate_holdout(model, test.closes())?), test.len()),
            Err(ForecastError::InsufficientData { .. }) => {
                warn!(model = model.name(), "history too short for a hold-out score");
                (None, 0)
            }
            Err(e) => return Err(e),
        };

        let mut rng = self.section_rng(0);
        let forecast = forecast_statistical(
            model,
            self.config.horizon,
            &self.config.decoration,
            &mut rng,
        )?;
        info!(model = model.name(), steps = forecast.plain.len(), "statistical forecast complete");

        Ok(StatisticalSection {
            model: model.name().to_string(),
            test_size,
            accuracy,
            forecast: ForecastTable::new(model.name(), future_dates, &forecast.plain)?,
            decorated: forecast.decorated,
        })
    }

    fn neural_section(
        &self,
        model: &NeuralModel,
        scaled: &[f64],
        scaler: &MinMaxScaler,
        future_dates: &[chrono::NaiveDate],
        index: u64,
    ) -> Result<NeuralSection> {
        let predictor = model.predictor.as_ref();
        let look_back = predictor.look_back();
        if scaled.len() < look_back {
            return Err(ForecastError::InsufficientData {
                required: look_back,
                available: scaled.len(),
            });
        }
        if look_back != self.config.look_back {
            warn!(
                model = predictor.name(),
                model_look_back = look_back,
                configured = self.config.look_back,
                "model look-back differs from configuration"
            );
        }

        let accuracy = if scaled.len() > look_back {
            Some(evaluate_in_sample(predictor, scaled, scaler)?)
        } else {
            warn!(model = predictor.name(), "no complete window to score in-sample");
            None
        };

        let seed_window = last_window(scaled, look_back)?;
        let forecaster = AutoregressiveForecaster::new(self.config.horizon, self.config.perturbation)?;
        let mut rng = self.section_rng(index);
        let trajectory = forecaster.forecast(predictor, &seed_window, &mut rng)?;
        let prices = trajectory.to_prices(scaler);
        info!(model = predictor.name(), steps = prices.len(), "neural forecast complete");

        Ok(NeuralSection {
            model: predictor.name().to_string(),
            accuracy,
            history: model.history.clone(),
            forecast: ForecastTable::new(predictor.name(), future_dates, &prices)?,
        })
    }
}
