use super::*;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Mean of the normal distribution weights are drawn from
const WEIGHT_INIT_MEAN: f32 = 0.0;

/// Standard deviation of the normal distribution weights are drawn from
const WEIGHT_INIT_STD: f32 = 0.01;

/// Dense (Fully Connected) layer implementation for neural networks.
///
/// Every output is the dot product of one weight row with the input, plus an optional bias:
/// `output = W · input (+ b)`.
///
/// Weights are drawn from a normal distribution with mean 0 and standard deviation 0.01, biases
/// start at zero. Use [`Dense::seeded`] for reproducible initialization.
///
/// During `backward` the layer computes the weight gradient (outer product of the incoming
/// derivatives and the cached input), the bias gradient (the incoming derivatives) and the
/// gradient for the previous layer (`Wᵗ · derivatives`, using the weights as they were before the
/// update). How the step is applied depends on the [`UpdateScheme`]:
///
/// - `PerExample` - `W -= grad_w` and `b -= grad_b` immediately inside `backward`
/// - `BatchAveraged` - gradients are summed, and `update(batch_size)` subtracts `sum / batch_size`
///
/// # Dimensions
///
/// - Input shape: (input_size,)
/// - Output shape: (output_size,)
///
/// # Fields
///
/// - `input_size` - Input dimension size
/// - `output_size` - Output dimension size
/// - `weights` - Weight matrix with shape (output_size, input_size)
/// - `bias` - Bias vector with shape (output_size,), `None` when bias is disabled
/// - `update_scheme` - When gradients are applied
/// - `grad_weights` - Accumulated weight gradients (batch-averaged scheme only)
/// - `grad_bias` - Accumulated bias gradients (batch-averaged scheme only)
/// - `history` - Cached input and output of the last forward pass
///
/// # Example
/// ```rust
/// use digitnet::prelude::*;
/// use ndarray::{Array2, array};
///
/// let mut dense = Dense::from_parameters(Array2::ones((3, 2)), None).unwrap();
/// let output = dense.forward(&array![4.0, 3.0]).unwrap();
/// assert_eq!(output, array![7.0_f32, 7.0, 7.0]);
///
/// let propagated = dense.backward(&array![1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(propagated, array![3.0_f32, 3.0]);
/// ```
pub struct Dense {
    input_size: usize,
    output_size: usize,
    weights: Array2<f32>,
    bias: Option<Tensor>,
    update_scheme: UpdateScheme,
    grad_weights: Option<Array2<f32>>,
    grad_bias: Option<Tensor>,
    history: ForwardHistory,
}

impl Dense {
    /// Creates a new dense layer with bias, initialized from the thread-local random generator.
    ///
    /// # Parameters
    ///
    /// - `input_size` - Number of inputs
    /// - `output_size` - Number of outputs
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new Dense layer instance
    /// - `Err(ModelError::ConfigurationError)` - If either size is zero
    pub fn new(input_size: usize, output_size: usize) -> Result<Self, ModelError> {
        Self::with_rng(input_size, output_size, &mut rand::rng())
    }

    /// Creates a new dense layer whose weights are drawn from a generator seeded with `seed`.
    ///
    /// Two layers built with the same sizes and seed hold identical weights.
    pub fn seeded(input_size: usize, output_size: usize, seed: u64) -> Result<Self, ModelError> {
        Self::with_rng(input_size, output_size, &mut StdRng::seed_from_u64(seed))
    }

    fn with_rng<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        check_layer_size("Dense", input_size, output_size)?;

        let normal = Normal::new(WEIGHT_INIT_MEAN, WEIGHT_INIT_STD)
            .map_err(|e| ModelError::ConfigurationError(e.to_string()))?;
        let weights =
            Array2::from_shape_simple_fn((output_size, input_size), || normal.sample(&mut *rng));

        debug!(input_size, output_size, "initialized dense layer");

        Ok(Self {
            input_size,
            output_size,
            weights,
            bias: Some(Tensor::zeros(output_size)),
            update_scheme: UpdateScheme::default(),
            grad_weights: None,
            grad_bias: None,
            history: ForwardHistory::Ready,
        })
    }

    /// Creates a dense layer from explicit parameters.
    ///
    /// # Parameters
    ///
    /// - `weights` - Weight matrix with shape (output_size, input_size)
    /// - `bias` - Optional bias vector of length output_size; `None` disables bias
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A Dense layer using the given parameters
    /// - `Err(ModelError::ConfigurationError)` - If the matrix is empty
    /// - `Err(ModelError::ShapeMismatch)` - If the bias length differs from the row count
    pub fn from_parameters(weights: Array2<f32>, bias: Option<Tensor>) -> Result<Self, ModelError> {
        let (output_size, input_size) = weights.dim();
        check_layer_size("Dense", input_size, output_size)?;
        if let Some(b) = &bias {
            check_length("Dense bias", b, output_size)?;
        }

        Ok(Self {
            input_size,
            output_size,
            weights,
            bias,
            update_scheme: UpdateScheme::default(),
            grad_weights: None,
            grad_bias: None,
            history: ForwardHistory::Ready,
        })
    }

    /// Disables the bias term.
    pub fn without_bias(mut self) -> Self {
        self.bias = None;
        self.grad_bias = None;
        self
    }

    /// Selects when gradients are applied to the parameters.
    pub fn with_update_scheme(mut self, update_scheme: UpdateScheme) -> Self {
        self.update_scheme = update_scheme;
        self
    }

    /// Returns the weight matrix with shape (output_size, input_size)
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Returns the bias vector, or `None` if bias is disabled
    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// Returns `true` if the layer adds a bias term
    pub fn uses_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Returns the configured update scheme
    pub fn update_scheme(&self) -> UpdateScheme {
        self.update_scheme
    }

    fn accumulate(&mut self, grad_w: Array2<f32>, grad_b: &Tensor) {
        match self.grad_weights.as_mut() {
            Some(acc) => *acc += &grad_w,
            None => self.grad_weights = Some(grad_w),
        }
        if self.bias.is_some() {
            match self.grad_bias.as_mut() {
                Some(acc) => *acc += grad_b,
                None => self.grad_bias = Some(grad_b.clone()),
            }
        }
    }
}

impl Layer for Dense {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        check_length("Dense input", input, self.input_size)?;

        let mut output = self.weights.dot(input);
        if let Some(bias) = &self.bias {
            output += bias;
        }

        self.history.record(input.clone(), output.clone());
        Ok(output)
    }

    fn backward(&mut self, derivatives: &Tensor) -> Result<Tensor, ModelError> {
        let (input, _) = self.history.get("Dense")?;
        check_length("Dense derivatives", derivatives, self.output_size)?;

        // (output_size, 1) · (1, input_size)
        let grad_w = derivatives
            .view()
            .insert_axis(Axis(1))
            .dot(&input.view().insert_axis(Axis(0)));

        // Propagate with the weights as they were during forward
        let propagated = self.weights.t().dot(derivatives);

        match self.update_scheme {
            UpdateScheme::PerExample => {
                self.weights -= &grad_w;
                if let Some(bias) = self.bias.as_mut() {
                    *bias -= derivatives;
                }
            }
            UpdateScheme::BatchAveraged => self.accumulate(grad_w, derivatives),
        }

        Ok(propagated)
    }

    fn update(&mut self, batch_size: usize) -> Result<(), ModelError> {
        if self.update_scheme == UpdateScheme::PerExample {
            return Ok(());
        }
        if batch_size == 0 {
            return Err(ModelError::ConfigurationError(
                "batch size passed to update must be greater than 0".to_string(),
            ));
        }

        let scale = -1.0 / batch_size as f32;
        if let Some(grad_w) = self.grad_weights.take() {
            self.weights.scaled_add(scale, &grad_w);
        }
        if let (Some(bias), Some(grad_b)) = (self.bias.as_mut(), self.grad_bias.take()) {
            bias.scaled_add(scale, &grad_b);
        }
        Ok(())
    }

    fn discard_pending(&mut self) {
        self.grad_weights = None;
        self.grad_bias = None;
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn layer_type(&self) -> &str {
        "Dense"
    }

    fn param_count(&self) -> usize {
        let bias_count = if self.bias.is_some() { self.output_size } else { 0 };
        self.input_size * self.output_size + bias_count
    }

    fn is_forwarded(&self) -> bool {
        self.history.is_forwarded()
    }

    fn to_serializable(&self) -> SerializableLayer {
        SerializableLayer::Dense(SerializableDenseLayer {
            input_size: self.input_size,
            output_size: self.output_size,
            weights: self.weights.outer_iter().map(|row| row.to_vec()).collect(),
            bias: self.bias.as_ref().map(|b| b.to_vec()),
            update_scheme: self.update_scheme,
        })
    }
}
