//! Pretrained forecasting models loaded from JSON artifacts
//!
//! - [`recurrent::RecurrentModel`]: stacked LSTM network with a dense head
//! - [`transfer::TransferLearnedModel`]: frozen layers of a base recurrent
//!   model followed by fine-tuned layers and a new head
//! - [`arima::ArimaModel`]: fitted ARIMA(p,d,q) that forecasts many steps at once
//! - [`history::TrainingHistory`]: per-epoch losses recorded during training

use crate::error::{ForecastError, Result};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod arima;
pub mod history;
pub mod layers;
pub mod recurrent;
pub mod transfer;

pub use arima::ArimaModel;
pub use history::TrainingHistory;
pub use recurrent::RecurrentModel;
pub use transfer::TransferLearnedModel;

/// Model that produces a whole multi-step forecast in one call
pub trait MultiStepForecaster: Debug {
    fn name(&self) -> &str;

    /// Forecast `steps` values following the fitted history
    fn forecast(&self, steps: usize) -> Result<Vec<f64>>;
}

/// Deserialize a JSON artifact, naming the file in any error
pub(crate) fn read_artifact<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ForecastError::ModelError(format!("Cannot open artifact {}: {}", path.display(), e))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        ForecastError::ModelError(format!("Malformed artifact {}: {}", path.display(), e))
    })
}
