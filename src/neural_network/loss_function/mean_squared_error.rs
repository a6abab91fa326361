use crate::error::ModelError;
use crate::neural_network::Tensor;
use crate::neural_network::loss_function::SerializableCost;
use crate::neural_network::neural_network_trait::CostFunction;
use serde::{Deserialize, Serialize};

/// Mean Squared Error cost function
///
/// - loss = `(1 / size) · Σ (output_i - expected_i)²`
/// - gradient = `2 · (output - expected) / size`
///
/// The gradient is the exact derivative of the loss and is not scaled by the learning rate. The
/// learning rate only scales the reported loss.
///
/// # Example
///
/// ```rust
/// use digitnet::prelude::*;
/// use ndarray::array;
///
/// let mse = MeanSquaredError::new(3).unwrap();
/// let (gradient, loss) = mse
///     .compute_cost(&array![1.0, 2.0, 3.0], &array![1.0, 2.0, 0.0], 0.5)
///     .unwrap();
///
/// assert_eq!(gradient, array![0.0_f32, 0.0, 2.0]);
/// assert!((loss - 1.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeanSquaredError {
    size: usize,
}

impl MeanSquaredError {
    /// Creates a new MeanSquaredError for vectors of length `size`
    ///
    /// # Returns
    ///
    /// - `Ok(MeanSquaredError)` - The cost function
    /// - `Err(ModelError::ConfigurationError)` - If `size` is zero
    pub fn new(size: usize) -> Result<Self, ModelError> {
        if size == 0 {
            return Err(ModelError::ConfigurationError(
                "MeanSquaredError size must be greater than 0".to_string(),
            ));
        }
        Ok(Self { size })
    }
}

impl CostFunction for MeanSquaredError {
    fn size(&self) -> usize {
        self.size
    }

    fn compute_cost(
        &self,
        output: &Tensor,
        expected: &Tensor,
        learning_rate: f32,
    ) -> Result<(Tensor, f32), ModelError> {
        if output.len() != self.size {
            return Err(ModelError::ConfigurationError(format!(
                "MeanSquaredError output has length {}, expected {}",
                output.len(),
                self.size
            )));
        }
        if expected.len() != self.size {
            return Err(ModelError::ConfigurationError(format!(
                "MeanSquaredError expected vector has length {}, expected {}",
                expected.len(),
                self.size
            )));
        }
        if learning_rate.is_nan() || learning_rate <= 0.0 {
            return Err(ModelError::ConfigurationError(format!(
                "learning rate must be greater than 0, got {}",
                learning_rate
            )));
        }

        let n = self.size as f32;
        let diff = output - expected;

        let loss = diff.mapv(|x| x * x).sum() / n;
        let gradient = diff.mapv(|x| 2.0 * x / n);

        Ok((gradient, loss * learning_rate))
    }

    fn cost_type(&self) -> &str {
        "MeanSquaredError"
    }

    fn to_serializable(&self) -> SerializableCost {
        SerializableCost::MeanSquaredError { size: self.size }
    }
}
