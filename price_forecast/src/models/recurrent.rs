//! Pretrained recurrent (LSTM) point predictor

use crate::error::{ForecastError, Result};
use crate::models::layers::{build_layers, DenseWeights, LstmWeights, SequenceNetwork};
use crate::models::read_artifact;
use crate::predictor::{check_window, PointPredictor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// On-disk form of a recurrent model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrentArtifact {
    pub name: String,
    pub look_back: usize,
    pub recurrent: Vec<LstmWeights>,
    #[serde(default)]
    pub head: Vec<DenseWeights>,
}

/// Stacked LSTM network mapping a window of scaled prices to the next one
#[derive(Debug, Clone)]
pub struct RecurrentModel {
    name: String,
    look_back: usize,
    network: SequenceNetwork,
    artifact: RecurrentArtifact,
}

impl RecurrentModel {
    /// Load a model from its JSON artifact
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: RecurrentArtifact = read_artifact(&path)?;
        let model = Self::from_artifact(artifact)?;
        info!(
            model = %model.name,
            path = %path.as_ref().display(),
            layers = model.network.recurrent_layers().len(),
            "loaded recurrent model"
        );
        Ok(model)
    }

    pub fn from_artifact(artifact: RecurrentArtifact) -> Result<Self> {
        if artifact.look_back == 0 {
            return Err(ForecastError::ModelError(format!(
                "{}: look_back must be greater than zero",
                artifact.name
            )));
        }
        let (recurrent, head) = build_layers(&artifact.recurrent, &artifact.head)?;
        let network = SequenceNetwork::new(recurrent, head)?;

        Ok(Self {
            name: artifact.name.clone(),
            look_back: artifact.look_back,
            network,
            artifact,
        })
    }

    /// The serialized weights this model was built from
    pub fn artifact(&self) -> &RecurrentArtifact {
        &self.artifact
    }
}

impl PointPredictor for RecurrentModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn look_back(&self) -> usize {
        self.look_back
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        check_window(self.look_back, window)?;
        self.network.forward(window)
    }
}
