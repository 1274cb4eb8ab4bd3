//! Transfer-learned variant of the recurrent model
//!
//! The artifact reuses the first `frozen_layers` LSTM layers of a base
//! recurrent model unchanged and stacks its own fine-tuned layers and dense
//! head on top. The base artifact path is resolved relative to the transfer
//! artifact's directory.

use crate::error::{ForecastError, Result};
use crate::models::layers::{build_layers, DenseWeights, LstmWeights, SequenceNetwork};
use crate::models::read_artifact;
use crate::models::recurrent::{RecurrentArtifact, RecurrentModel};
use crate::predictor::{check_window, PointPredictor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk form of a transfer-learned model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferArtifact {
    pub name: String,
    /// Base recurrent artifact
    pub base: PathBuf,
    /// Leading base layers reused as-is
    pub frozen_layers: usize,
    /// Layers trained on top of the frozen ones
    #[serde(default)]
    pub recurrent: Vec<LstmWeights>,
    pub head: Vec<DenseWeights>,
}

#[derive(Debug, Clone)]
pub struct TransferLearnedModel {
    name: String,
    look_back: usize,
    frozen_layers: usize,
    network: SequenceNetwork,
}

impl TransferLearnedModel {
    /// Load the transfer artifact and the base artifact it names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let artifact: TransferArtifact = read_artifact(path)?;

        let base_path = if artifact.base.is_relative() {
            path.parent()
                .map(|dir| dir.join(&artifact.base))
                .unwrap_or_else(|| artifact.base.clone())
        } else {
            artifact.base.clone()
        };
        let base: RecurrentArtifact = read_artifact(&base_path)?;

        let model = Self::from_parts(&base, artifact)?;
        info!(
            model = %model.name,
            base = %base_path.display(),
            frozen = model.frozen_layers,
            "loaded transfer-learned model"
        );
        Ok(model)
    }

    /// Build on top of an already loaded base model
    pub fn from_base(base: &RecurrentModel, artifact: TransferArtifact) -> Result<Self> {
        Self::from_parts(base.artifact(), artifact)
    }

    fn from_parts(base: &RecurrentArtifact, artifact: TransferArtifact) -> Result<Self> {
        if artifact.frozen_layers > base.recurrent.len() {
            return Err(ForecastError::ModelError(format!(
                "{} freezes {} layers but base {} has only {}",
                artifact.name,
                artifact.frozen_layers,
                base.name,
                base.recurrent.len()
            )));
        }
        if base.look_back == 0 {
            return Err(ForecastError::ModelError(format!(
                "base {} has a zero look_back",
                base.name
            )));
        }

        let recurrent_weights: Vec<LstmWeights> = base.recurrent[..artifact.frozen_layers]
            .iter()
            .chain(&artifact.recurrent)
            .cloned()
            .collect();
        let (recurrent, head) = build_layers(&recurrent_weights, &artifact.head)?;
        let network = SequenceNetwork::new(recurrent, head)?;

        Ok(Self {
            name: artifact.name,
            look_back: base.look_back,
            frozen_layers: artifact.frozen_layers,
            network,
        })
    }

    pub fn frozen_layers(&self) -> usize {
        self.frozen_layers
    }
}

impl PointPredictor for TransferLearnedModel {
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
