use super::*;
use ndarray::{Array2, Axis};

/// Softmax activation layer.
///
/// Converts raw scores (logits) into a probability distribution:
/// softmax(x_i) = exp(x_i - max(x)) / sum_j(exp(x_j - max(x)))
///
/// Subtracting the maximum keeps `exp` from overflowing without changing the result.
///
/// `backward` applies the full Jacobian `J = diag(s) - s·sᵗ` of the cached output `s` to the
/// incoming derivatives, so one backward call costs `O(n²)`. Non-finite values are not clipped
/// and propagate as ordinary floating-point values.
///
/// # Fields
///
/// - `size` - Input and output vector length
/// - `history` - Cached input and output of the last forward pass
///
/// # Example
///
/// ```rust
/// use digitnet::prelude::*;
/// use ndarray::array;
///
/// let mut softmax = Softmax::new(3).unwrap();
/// let output = softmax.forward(&array![2.0, 1.0, 0.1]).unwrap();
/// assert!((output.sum() - 1.0).abs() < 1e-6);
/// ```
pub struct Softmax {
    size: usize,
    history: ForwardHistory,
}

impl Softmax {
    /// Creates a new Softmax activation layer.
    ///
    /// # Parameters
    ///
    /// - `size` - Number of classes
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new `Softmax` layer instance
    /// - `Err(ModelError::ConfigurationError)` - If `size` is zero
    pub fn new(size: usize) -> Result<Self, ModelError> {
        check_layer_size("Softmax", size, size)?;
        Ok(Softmax {
            size,
            history: ForwardHistory::Ready,
        })
    }

    /// Builds the Jacobian `diag(s) - s·sᵗ` of the last forward output `s`.
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - A (size, size) matrix with `s_i(1 - s_i)` on the diagonal and
    ///   `-s_i s_j` elsewhere
    /// - `Err(ModelError::UninitializedState)` - If `forward` has not run yet
    pub fn jacobian(&self) -> Result<Array2<f32>, ModelError> {
        let (_, output) = self.history.get("Softmax")?;
        Ok(Self::jacobian_of(output))
    }

    fn jacobian_of(s: &Tensor) -> Array2<f32> {
        let column = s.view().insert_axis(Axis(1));
        let row = s.view().insert_axis(Axis(0));
        Array2::from_diag(s) - column.dot(&row)
    }
}

impl Layer for Softmax {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        check_length("Softmax input", input, self.size)?;

        let max_val = input.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exponentials = input.mapv(|x| (x - max_val).exp());
        let sum = exponentials.sum();
        let output = exponentials / sum;

        self.history.record(input.clone(), output.clone());
        Ok(output)
    }

    fn backward(&mut self, derivatives: &Tensor) -> Result<Tensor, ModelError> {
        let (_, output) = self.history.get("Softmax")?;
        check_length("Softmax derivatives", derivatives, self.size)?;

        Ok(Self::jacobian_of(output).dot(derivatives))
    }

    fn layer_type(&self) -> &str {
        "Softmax"
    }

    fn to_serializable(&self) -> SerializableLayer {
        SerializableLayer::Softmax { size: self.size }
    }

    same_size_layer_functions!();
}
