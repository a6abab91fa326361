use crate::dataset::BatchSource;
use crate::error::ModelError;
use crate::neural_network::Tensor;
use crate::neural_network::layer::serializable_layer::SerializableLayer;
use crate::neural_network::loss_function::SerializableCost;

/// Defines the interface for neural network layers.
///
/// Every layer has an `(input_size, output_size)` pair fixed at construction. `forward` and
/// `backward` carry no default body, so a type cannot be used as a layer without providing both.
pub trait Layer {
    /// Performs forward propagation through the layer.
    ///
    /// Caches `input` and the computed output as this layer's forward history,
    /// replacing any earlier history.
    ///
    /// # Parameters
    ///
    /// - `input` - Vector of length `input_size()`
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Output vector of length `output_size()`
    /// - `Err(ModelError::ShapeMismatch)` - If `input` has the wrong length
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError>;

    /// Performs backward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// - `derivatives` - Gradient of the loss with respect to this layer's output
    ///
    /// # Returns
    ///
    /// - `Ok(Tensor)` - Gradient of the loss with respect to this layer's input
    /// - `Err(ModelError::UninitializedState)` - If `forward` has not run yet
    /// - `Err(ModelError::ShapeMismatch)` - If `derivatives` has the wrong length
    fn backward(&mut self, derivatives: &Tensor) -> Result<Tensor, ModelError>;

    /// Batched parameter update hook, called once after every batch.
    ///
    /// The default does nothing; layers that defer their update out of `backward` override it.
    ///
    /// # Parameters
    ///
    /// - `_batch_size` - Number of examples processed since the last call
    fn update(&mut self, _batch_size: usize) -> Result<(), ModelError> {
        Ok(())
    }

    /// Drops anything `backward` deferred for the next `update`.
    ///
    /// Called when a batch is abandoned part-way, so a failed batch leaves no trace in the
    /// parameters. The default does nothing.
    fn discard_pending(&mut self) {}

    /// Returns the configured input vector length.
    fn input_size(&self) -> usize;

    /// Returns the configured output vector length.
    fn output_size(&self) -> usize;

    /// Returns the type name of the layer (e.g. "Dense").
    fn layer_type(&self) -> &str;

    /// Returns the number of trainable parameters in the layer.
    fn param_count(&self) -> usize {
        0
    }

    /// Returns `true` once the layer holds forward history.
    fn is_forwarded(&self) -> bool;

    /// Returns an owned, serializable description of the layer and its parameters.
    fn to_serializable(&self) -> SerializableLayer;
}

/// Defines the interface for cost functions used in training.
pub trait CostFunction {
    /// Returns the configured expected-vector length.
    fn size(&self) -> usize;

    /// Compares `output` against `expected`.
    ///
    /// # Parameters
    ///
    /// - `output` - The network output
    /// - `expected` - The target vector
    /// - `learning_rate` - Scale applied to the reported loss
    ///
    /// # Returns
    ///
    /// - `Ok((Tensor, f32))` - Gradient with respect to `output`, and the learning-rate scaled loss
    /// - `Err(ModelError::ConfigurationError)` - On length mismatch or a non-positive learning rate
    fn compute_cost(
        &self,
        output: &Tensor,
        expected: &Tensor,
        learning_rate: f32,
    ) -> Result<(Tensor, f32), ModelError>;

    /// Returns the type name of the cost (e.g. "MeanSquaredError").
    fn cost_type(&self) -> &str;

    /// Returns an owned, serializable description of the cost.
    fn to_serializable(&self) -> SerializableCost;
}

/// Defines the interface of a trainable network.
pub trait Network {
    /// Validates that adjacent layers agree on their shared vector length.
    fn check_connection(&self) -> Result<(), ModelError>;

    /// Runs a forward pass through every layer and returns the final output.
    fn compute(&mut self, input: &Tensor) -> Result<Tensor, ModelError>;

    /// Trains on every batch `data` yields until it returns an empty batch.
    ///
    /// # Returns
    ///
    /// - `Ok(f32)` - Mean over batches of the per-batch mean (learning-rate scaled) loss
    fn train_one_epoch(&mut self, data: &mut dyn BatchSource) -> Result<f32, ModelError>;

    /// Fraction of examples in `data` whose argmax output equals the label; `0.0` with no data.
    fn evaluate(&mut self, data: &mut dyn BatchSource) -> Result<f32, ModelError>;
}
