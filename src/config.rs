use crate::dataset::{IMAGE_SIZE, NUM_CLASSES};
use crate::error::{IoError, ModelError};
use crate::neural_network::{
    Dense, Layer, MeanSquaredError, ReLU, Sequential, Softmax, UpdateScheme,
};
use serde::{Deserialize, Serialize};
use serde_json::from_reader;
use std::path::Path;
use tracing::debug;

/// Settings for building and training the digit classifier.
///
/// Every field has a default, so a JSON config only needs the fields it changes.
///
/// # Fields
///
/// - `hidden_size` - Width of the hidden layer (default 16)
/// - `learning_rate` - Learning rate, must be greater than 0 (default 0.01)
/// - `batch_size` - Examples per batch, must be greater than 1 (default 10)
/// - `epochs` - Number of passes over the training data (default 10)
/// - `update_scheme` - When dense layers apply their gradients (default `PerExample`)
/// - `use_bias` - Whether dense layers add a bias term (default `true`)
/// - `seed` - Seed for weight initialization and shuffling; `None` draws weights from the
///   thread-local generator and keeps the file order
///
/// # Example
///
/// ```rust
/// use digitnet::config::TrainingConfig;
///
/// let config: TrainingConfig = serde_json::from_str(r#"{ "epochs": 3, "seed": 7 }"#).unwrap();
/// assert_eq!(config.epochs, 3);
/// assert_eq!(config.batch_size, 10);
///
/// let network = config.build_network().unwrap();
/// assert_eq!(network.layers().len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub hidden_size: usize,
    pub learning_rate: f32,
    pub batch_size: usize,
    pub epochs: usize,
    pub update_scheme: UpdateScheme,
    pub use_bias: bool,
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_size: 16,
            learning_rate: 0.01,
            batch_size: 10,
            epochs: 10,
            update_scheme: UpdateScheme::PerExample,
            use_bias: true,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Reads a JSON config file.
    ///
    /// # Returns
    ///
    /// - `Ok(TrainingConfig)` - The validated config
    /// - `Err(IoError::NotFound)` - If `path` does not exist
    /// - `Err(IoError::JsonError)` - If the file is not valid JSON for this struct
    /// - `Err(IoError::Model)` - If a value is out of range
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let reader = IoError::load_in_buf_reader(path.as_ref())?;
        let config: TrainingConfig = from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value is in range.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ModelError::ConfigurationError(format!(
                "learning rate must be finite and greater than 0, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size <= 1 {
            return Err(ModelError::ConfigurationError(format!(
                "batch size must be greater than 1, got {}",
                self.batch_size
            )));
        }
        if self.hidden_size == 0 {
            return Err(ModelError::ConfigurationError(
                "hidden size must be greater than 0".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(ModelError::ConfigurationError(
                "epochs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the digit classifier described by this config.
    ///
    /// The network is `Dense(784, h) → ReLU(h) → Dense(h, 10) → ReLU(10) → Softmax(10)` with a
    /// `MeanSquaredError(10)` cost. With a seed, the two dense layers are seeded with `seed` and
    /// `seed + 1`.
    pub fn build_network(&self) -> Result<Sequential, ModelError> {
        self.validate()?;

        let hidden = self.dense(IMAGE_SIZE, self.hidden_size, 0)?;
        let output = self.dense(self.hidden_size, NUM_CLASSES, 1)?;

        let network = Sequential::builder()
            .add(hidden)
            .add(ReLU::new(self.hidden_size)?)
            .add(output)
            .add(ReLU::new(NUM_CLASSES)?)
            .add(Softmax::new(NUM_CLASSES)?)
            .compile(MeanSquaredError::new(NUM_CLASSES)?, self.learning_rate)?;

        debug!(
            params = network.layers().iter().map(|l| l.param_count()).sum::<usize>(),
            "built digit classifier"
        );
        Ok(network)
    }

    fn dense(&self, input: usize, output: usize, offset: u64) -> Result<Dense, ModelError> {
        let dense = match self.seed {
            Some(seed) => Dense::seeded(input, output, seed.wrapping_add(offset))?,
            None => Dense::new(input, output)?,
        };
        let dense = if self.use_bias { dense } else { dense.without_bias() };
        Ok(dense.with_update_scheme(self.update_scheme))
    }
}
