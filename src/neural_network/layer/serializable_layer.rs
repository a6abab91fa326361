use super::*;
use crate::error::IoError;
use ndarray::Array2;

/// Serializable description of a single layer, including its parameters.
///
/// # Variants
///
/// - `Dense` - Sizes, weights and optional bias of a Dense layer
/// - `ReLU` - Size of a ReLU layer
/// - `Softmax` - Size of a Softmax layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializableLayer {
    Dense(SerializableDenseLayer),
    ReLU { size: usize },
    Softmax { size: usize },
}

/// Serializable parameters of a Dense layer.
///
/// `weights` is stored row by row, one row per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableDenseLayer {
    pub input_size: usize,
    pub output_size: usize,
    pub weights: Vec<Vec<f32>>,
    pub bias: Option<Vec<f32>>,
    #[serde(default)]
    pub update_scheme: UpdateScheme,
}

impl SerializableLayer {
    /// Returns `true` if every stored parameter is finite.
    ///
    /// JSON has no representation for NaN or infinity, so only finite snapshots can be saved.
    pub fn has_finite_parameters(&self) -> bool {
        match self {
            SerializableLayer::Dense(dense) => {
                dense.weights.iter().flatten().all(|w| w.is_finite())
                    && dense.bias.iter().flatten().all(|b| b.is_finite())
            }
            SerializableLayer::ReLU { .. } | SerializableLayer::Softmax { .. } => true,
        }
    }

    /// Rebuilds the layer described by this value.
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Layer>)` - A freshly constructed layer with the stored parameters
    /// - `Err(IoError::FormatError)` - If the stored weights disagree with the stored sizes
    /// - `Err(IoError::Model)` - If the layer constructor rejects the stored sizes
    pub fn into_layer(self) -> Result<Box<dyn Layer>, IoError> {
        match self {
            SerializableLayer::Dense(dense) => Ok(Box::new(dense.into_dense()?)),
            SerializableLayer::ReLU { size } => Ok(Box::new(ReLU::new(size)?)),
            SerializableLayer::Softmax { size } => Ok(Box::new(Softmax::new(size)?)),
        }
    }
}

impl SerializableDenseLayer {
    fn into_dense(self) -> Result<Dense, IoError> {
        if self.weights.len() != self.output_size
            || self.weights.iter().any(|row| row.len() != self.input_size)
        {
            return Err(IoError::FormatError(format!(
                "Dense weights do not form a {}x{} matrix",
                self.output_size, self.input_size
            )));
        }

        let flat: Vec<f32> = self.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((self.output_size, self.input_size), flat)
            .map_err(|e| IoError::FormatError(e.to_string()))?;
        let bias = self.bias.map(Tensor::from_vec);

        Ok(Dense::from_parameters(weights, bias)?.with_update_scheme(self.update_scheme))
    }
}
