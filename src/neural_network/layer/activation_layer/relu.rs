use super::*;

/// ReLU (Rectified Linear Unit) activation layer.
///
/// Applies `max(0, x)` element-wise. Input and output sizes are equal and the layer has no
/// parameters. During `backward` a derivative passes through unchanged where the cached input
/// was strictly positive and becomes `0.0` elsewhere.
///
/// # Fields
///
/// - `size` - Input and output vector length
/// - `history` - Cached input and output of the last forward pass
///
/// # Examples
///
/// ```rust
/// use digitnet::prelude::*;
/// use ndarray::array;
///
/// let mut relu = ReLU::new(3).unwrap();
/// let output = relu.forward(&array![4.0, 3.0, -1.0]).unwrap();
/// assert_eq!(output, array![4.0_f32, 3.0, 0.0]);
///
/// let grad = relu.backward(&array![1.0, -1.0, -2.0]).unwrap();
/// assert_eq!(grad, array![1.0_f32, -1.0, 0.0]);
/// ```
pub struct ReLU {
    size: usize,
    history: ForwardHistory,
}

impl ReLU {
    /// Creates a new ReLU activation layer.
    ///
    /// # Parameters
    ///
    /// - `size` - Input and output vector length
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new `ReLU` layer instance
    /// - `Err(ModelError::ConfigurationError)` - If `size` is zero
    pub fn new(size: usize) -> Result<Self, ModelError> {
        check_layer_size("ReLU", size, size)?;
        Ok(ReLU {
            size,
            history: ForwardHistory::Ready,
        })
    }
}

impl Layer for ReLU {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        check_length("ReLU input", input, self.size)?;

        let output = input.mapv(|x| if x > 0.0 { x } else { 0.0 });

        self.history.record(input.clone(), output.clone());
        Ok(output)
    }

    fn backward(&mut self, derivatives: &Tensor) -> Result<Tensor, ModelError> {
        let (input, _) = self.history.get("ReLU")?;
        check_length("ReLU derivatives", derivatives, self.size)?;

        let mut grad_input = derivatives.clone();
        grad_input.zip_mut_with(input, |grad, &inp| {
            if inp <= 0.0 {
                *grad = 0.0;
            }
        });

        Ok(grad_input)
    }

    fn layer_type(&self) -> &str {
        "ReLU"
    }

    fn to_serializable(&self) -> SerializableLayer {
        SerializableLayer::ReLU { size: self.size }
    }

    same_size_layer_functions!();
}
