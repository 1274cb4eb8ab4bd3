//! Training history recorded alongside a neural model

use crate::error::{ForecastError, Result};
use crate::models::read_artifact;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-epoch losses; extra metrics in the file are ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub loss: Vec<f64>,
    #[serde(default)]
    pub val_loss: Option<Vec<f64>>,
}

impl TrainingHistory {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let history: Self = read_artifact(path)?;
        if history.loss.is_empty() {
            return Err(ForecastError::ModelError(
                "training history has no epochs".to_string(),
            ));
        }
        Ok(history)
    }

    pub fn epochs(&self) -> usize {
        self.loss.len()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.loss.last().copied()
    }

    /// Zero-based epoch with the lowest training loss
    pub fn best_epoch(&self) -> Option<(usize, f64)> {
        self.loss
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn final_val_loss(&self) -> Option<f64> {
        self.val_loss.as_ref().and_then(|v| v.last().copied())
    }
}

impl std::fmt::Display for TrainingHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  Epochs: {}", self.epochs())?;
        if let Some(loss) = self.final_loss() {
            write!(f, "  Final loss: {:.6}", loss)?;
        }
        if let Some((epoch, loss)) = self.best_epoch() {
            write!(f, "  Best: {:.6} (epoch {})", loss, epoch + 1)?;
        }
        if let Some(val) = self.final_val_loss() {
            write!(f, "  Final val loss: {:.6}", val)?;
        }
        Ok(())
    }
}
