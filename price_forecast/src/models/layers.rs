//! LSTM and dense layers in Keras weight layout
//!
//! LSTM kernels are `[input_dim][4 * units]`, recurrent kernels
//! `[units][4 * units]` and biases `[4 * units]`, with gates ordered
//! input, forget, cell, output.

use crate::error::{ForecastError, Result};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};

/// Serialized LSTM layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmWeights {
    pub units: usize,
    pub kernel: Vec<Vec<f64>>,
    pub recurrent_kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Element-wise activation of a dense layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => sigmoid(x),
        }
    }
}

/// Serialized dense layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseWeights {
    /// `[input_dim][output_dim]`
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn to_matrix(rows: &[Vec<f64>], what: &str) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        return Err(ForecastError::ModelError(format!("{} is empty", what)));
    }
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(ForecastError::ModelError(format!(
            "{} has ragged rows",
            what
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| ForecastError::ModelError(format!("{}: {}", what, e)))
}

/// LSTM layer ready for inference
#[derive(Debug, Clone)]
pub struct LstmLayer {
    units: usize,
    kernel: Array2<f64>,
    recurrent_kernel: Array2<f64>,
    bias: Array1<f64>,
}

impl LstmLayer {
    pub fn from_weights(weights: &LstmWeights) -> Result<Self> {
        let units = weights.units;
        if units == 0 {
            return Err(ForecastError::ModelError(
                "LSTM layer must have at least one unit".to_string(),
            ));
        }

        let kernel = to_matrix(&weights.kernel, "LSTM kernel")?;
        let recurrent_kernel = to_matrix(&weights.recurrent_kernel, "LSTM recurrent kernel")?;

        if kernel.ncols() != 4 * units {
            return Err(ForecastError::ModelError(format!(
                "LSTM kernel has {} columns, expected {}",
                kernel.ncols(),
                4 * units
            )));
        }
        if recurrent_kernel.dim() != (units, 4 * units) {
            return Err(ForecastError::ModelError(format!(
                "LSTM recurrent kernel is {:?}, expected ({}, {})",
                recurrent_kernel.dim(),
                units,
                4 * units
            )));
        }
        if weights.bias.len() != 4 * units {
            return Err(ForecastError::ModelError(format!(
                "LSTM bias has {} entries, expected {}",
                weights.bias.len(),
                4 * units
            )));
        }

        Ok(Self {
            units,
            kernel,
            recurrent_kernel,
            bias: Array1::from_vec(weights.bias.clone()),
        })
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    /// Run the layer over `inputs` (`[time][input_dim]`), returning every
    /// hidden state (`[time][units]`).
    pub fn forward(&self, inputs: &Array2<f64>) -> Array2<f64> {
        let u = self.units;
        let mut hidden = Array1::<f64>::zeros(u);
        let mut cell = Array1::<f64>::zeros(u);
        let mut outputs = Array2::<f64>::zeros((inputs.nrows(), u));

        for (t, x) in inputs.rows().into_iter().enumerate() {
            let z = x.dot(&self.kernel) + hidden.dot(&self.recurrent_kernel) + &self.bias;

            let i = z.slice(s![0..u]).mapv(sigmoid);
            let f = z.slice(s![u..2 * u]).mapv(sigmoid);
            let g = z.slice(s![2 * u..3 * u]).mapv(f64::tanh);
            let o = z.slice(s![3 * u..4 * u]).mapv(sigmoid);

            cell = &f * &cell + &i * &g;
            hidden = &o * &cell.mapv(f64::tanh);
            outputs.row_mut(t).assign(&hidden);
        }

        outputs
    }
}

/// Dense layer ready for inference
#[derive(Debug, Clone)]
pub struct DenseLayer {
    kernel: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl DenseLayer {
    pub fn from_weights(weights: &DenseWeights) -> Result<Self> {
        let kernel = to_matrix(&weights.kernel, "dense kernel")?;
        if weights.bias.len() != kernel.ncols() {
            return Err(ForecastError::ModelError(format!(
                "dense bias has {} entries, expected {}",
                weights.bias.len(),
                kernel.ncols()
            )));
        }

        Ok(Self {
            kernel,
            bias: Array1::from_vec(weights.bias.clone()),
            activation: weights.activation,
        })
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.nrows()
    }

    pub fn output_dim(&self) -> usize {
        self.kernel.ncols()
    }

    pub fn forward(&self, input: &Array1<f64>) -> Array1<f64> {
        let activation = self.activation;
        (input.dot(&self.kernel) + &self.bias).mapv(|v| activation.apply(v))
    }
}

/// Recurrent stack followed by a dense head with one output
#[derive(Debug, Clone)]
pub struct SequenceNetwork {
    recurrent: Vec<LstmLayer>,
    head: Vec<DenseLayer>,
}

impl SequenceNetwork {
    /// Assemble a network, checking that every layer feeds the next
    pub fn new(recurrent: Vec<LstmLayer>, head: Vec<DenseLayer>) -> Result<Self> {
        let first = recurrent.first().ok_or_else(|| {
            ForecastError::ModelError("network needs at least one LSTM layer".to_string())
        })?;
        if first.input_dim() != 1 {
            return Err(ForecastError::ModelError(format!(
                "first LSTM layer expects {} features, the series has 1",
                first.input_dim()
            )));
        }

        let mut width = first.units();
        for (index, layer) in recurrent.iter().enumerate().skip(1) {
            if layer.input_dim() != width {
                return Err(ForecastError::ModelError(format!(
                    "LSTM layer {} expects {} inputs, previous layer has {} units",
                    index,
                    layer.input_dim(),
                    width
                )));
            }
            width = layer.units();
        }
        for (index, layer) in head.iter().enumerate() {
            if layer.input_dim() != width {
                return Err(ForecastError::ModelError(format!(
                    "dense layer {} expects {} inputs, got {}",
                    index,
                    layer.input_dim(),
                    width
                )));
            }
            width = layer.output_dim();
        }
        if width != 1 {
            return Err(ForecastError::ModelError(format!(
                "network must end in a single output, ends in {}",
                width
            )));
        }

        Ok(Self { recurrent, head })
    }

    pub fn recurrent_layers(&self) -> &[LstmLayer] {
        &self.recurrent
    }

    /// Run the window through every layer and return the scalar output
    pub fn forward(&self, window: &[f64]) -> Result<f64> {
        let mut sequence = Array2::from_shape_vec((window.len(), 1), window.to_vec())
            .map_err(|e| ForecastError::ModelError(e.to_string()))?;
        for layer in &self.recurrent {
            sequence = layer.forward(&sequence);
        }

        let last = sequence.nrows().checked_sub(1).ok_or_else(|| {
            ForecastError::ModelError("cannot run a network on an empty window".to_string())
        })?;
        let mut features = sequence.row(last).to_owned();
        for layer in &self.head {
            features = layer.forward(&features);
        }

        features
            .get(0)
            .copied()
            .ok_or_else(|| ForecastError::ModelError("network produced no output".to_string()))
    }
}

/// Build inference layers from serialized weights
pub fn build_layers(
    recurrent: &[LstmWeights],
    head: &[DenseWeights],
) -> Result<(Vec<LstmLayer>, Vec<DenseLayer>)> {
    let recurrent = recurrent
        .iter()
        .map(LstmLayer::from_weights)
        .collect::<Result<Vec<_>>>()?;
    let head = head
        .iter()
        .map(DenseLayer::from_weights)
        .collect::<Result<Vec<_>>>()?;
    Ok((recurrent, head))
}
