use super::*;
use crate::dataset::{BatchSource, DataPair};
use crate::error::{IoError, ModelError};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Checks that every adjacent pair of layers agrees on its shared vector length.
///
/// # Returns
///
/// - `Ok(())` - If the chain is non-empty and
///   `layers[i].output_size() == layers[i + 1].input_size()` for every boundary
/// - `Err(ModelError::ConfigurationError)` - Naming the first mismatched boundary, or reporting
///   an empty chain
pub fn check_layer_connection(layers: &[Box<dyn Layer>]) -> Result<(), ModelError> {
    if layers.is_empty() {
        return Err(ModelError::ConfigurationError(
            "a network can't have 0 layers".to_string(),
        ));
    }

    for (index, pair) in layers.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        if current.output_size() != next.input_size() {
            return Err(ModelError::ConfigurationError(format!(
                "layers don't connect between layer {} ({}, output {}) and layer {} ({}, input {})",
                index,
                current.layer_type(),
                current.output_size(),
                index + 1,
                next.layer_type(),
                next.input_size()
            )));
        }
    }

    debug!(layers = layers.len(), "layer chain connects");
    Ok(())
}

/// On-disk representation of a [`Sequential`] network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableSequential {
    pub learning_rate: f32,
    pub cost: SerializableCost,
    pub layers: Vec<SerializableLayer>,
}

/// A sequential network that executes its layers in order.
///
/// The output of every layer is the input of the next one. Backward passes visit the layers in
/// strict reverse order. The layer chain is validated once at construction and cannot change
/// afterwards.
///
/// # Fields
///
/// - `layers` - The ordered layers, exclusively owned by the network
/// - `cost` - Cost comparing the final output with the one-hot expected vector
/// - `learning_rate` - Scale of the reported loss; must be greater than 0
///
/// # Example
/// ```rust
/// use digitnet::prelude::*;
/// use ndarray::Array1;
///
/// let mut model = Sequential::builder()
///     .add(Dense::seeded(4, 8, 1).unwrap())
///     .add(ReLU::new(8).unwrap())
///     .add(Dense::seeded(8, 3, 2).unwrap())
///     .add(Softmax::new(3).unwrap())
///     .compile(MeanSquaredError::new(3).unwrap(), 0.01)
///     .unwrap();
///
/// model.summary();
///
/// let output = model.compute(&Array1::ones(4)).unwrap();
/// assert!((output.sum() - 1.0).abs() < 1e-6);
/// ```
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
    cost: Box<dyn CostFunction>,
    learning_rate: f32,
}

/// Collects layers for a [`Sequential`] network.
///
/// Supports method chaining; `compile` validates the chain and produces the network.
#[derive(Default)]
pub struct SequentialBuilder {
    layers: Vec<Box<dyn Layer>>,
}

impl SequentialBuilder {
    /// Appends a layer to the chain
    pub fn add<L: Layer + 'static>(mut self, layer: L) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Validates the chain and builds the network.
    ///
    /// # Parameters
    ///
    /// - `cost` - The cost function used during training
    /// - `learning_rate` - Must be finite and greater than 0
    pub fn compile<C: CostFunction + 'static>(
        self,
        cost: C,
        learning_rate: f32,
    ) -> Result<Sequential, ModelError> {
        Sequential::new(self.layers, Box::new(cost), learning_rate)
    }
}

impl Sequential {
    /// Creates a network from an ordered list of layers.
    ///
    /// # Parameters
    ///
    /// - `layers` - Layers in execution order
    /// - `cost` - The cost function used during training
    /// - `learning_rate` - Must be finite and greater than 0
    ///
    /// # Returns
    ///
    /// - `Ok(Sequential)` - The validated network
    /// - `Err(ModelError::ConfigurationError)` - If `layers` is empty, the learning rate is not
    ///   positive, adjacent layers don't connect, or the cost size differs from the final
    ///   layer's output size
    pub fn new(
        layers: Vec<Box<dyn Layer>>,
        cost: Box<dyn CostFunction>,
        learning_rate: f32,
    ) -> Result<Self, ModelError> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ModelError::ConfigurationError(format!(
                "learning rate must be finite and greater than 0, got {}",
                learning_rate
            )));
        }

        check_layer_connection(&layers)?;

        // check_layer_connection guarantees at least one layer
        let final_size = layers[layers.len() - 1].output_size();
        if cost.size() != final_size {
            return Err(ModelError::ConfigurationError(format!(
                "{} expects vectors of length {}, but the final layer outputs {}",
                cost.cost_type(),
                cost.size(),
                final_size
            )));
        }

        debug!(
            layers = layers.len(),
            cost = cost.cost_type(),
            learning_rate,
            "constructed sequential network"
        );

        Ok(Self {
            layers,
            cost,
            learning_rate,
        })
    }

    /// Starts building a network with method chaining
    pub fn builder() -> SequentialBuilder {
        SequentialBuilder::default()
    }

    /// Returns the layers in execution order
    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Returns the cost function
    pub fn cost(&self) -> &dyn CostFunction {
        self.cost.as_ref()
    }

    /// Returns the learning rate
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Returns the network input size
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    /// Returns the network output size
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// Runs the network and returns the index of the largest output.
    pub fn predict(&mut self, input: &Tensor) -> Result<usize, ModelError> {
        let output = self.compute(input)?;
        argmax(&output).ok_or_else(|| {
            ModelError::UninitializedState("network produced an empty output".to_string())
        })
    }

    /// Trains on one batch of examples.
    ///
    /// Every pair runs forward, through the cost and backward on its own; afterwards every
    /// layer's `update` hook receives the batch size.
    ///
    /// # Returns
    ///
    /// - `Ok(f32)` - The mean learning-rate scaled loss over the batch, `0.0` for an empty batch
    /// - `Err(ModelError)` - If any layer or the cost fails; the batch is abandoned and every
    ///   layer drops the gradients it deferred for this batch
    pub fn train_batch(&mut self, batch: &[DataPair]) -> Result<f32, ModelError> {
        if batch.is_empty() {
            return Ok(0.0);
        }

        match self.accumulate_batch(batch) {
            Ok(batch_loss) => {
                for layer in self.layers.iter_mut() {
                    layer.update(batch.len())?;
                }
                Ok(batch_loss / batch.len() as f32)
            }
            Err(e) => {
                for layer in self.layers.iter_mut() {
                    layer.discard_pending();
                }
                debug!(error = %e, "abandoned training batch");
                Err(e)
            }
        }
    }

    /// Runs forward, cost and backward for every pair, returning the summed loss.
    fn accumulate_batch(&mut self, batch: &[DataPair]) -> Result<f32, ModelError> {
        let mut batch_loss = 0.0;
        for pair in batch {
            let expected = one_hot(pair.label, self.cost.size())?;
            let output = self.compute(&pair.input())?;

            let (mut grad, loss) = self
                .cost
                .compute_cost(&output, &expected, self.learning_rate)?;
            batch_loss += loss;

            for layer in self.layers.iter_mut().rev() {
                grad = layer.backward(&grad)?;
            }
        }
        Ok(batch_loss)
    }

    /// Same as [`Network::train_one_epoch`], advancing `progress` once per batch and showing the
    /// running mean loss as its message.
    pub fn train_one_epoch_with_progress(
        &mut self,
        data: &mut dyn BatchSource,
        progress: &ProgressBar,
    ) -> Result<f32, ModelError> {
        self.run_epoch(data, Some(progress))
    }

    fn run_epoch(
        &mut self,
        data: &mut dyn BatchSource,
        progress: Option<&ProgressBar>,
    ) -> Result<f32, ModelError> {
        let mut epoch_loss = 0.0;
        let mut batch_count = 0usize;

        loop {
            let batch = data.next_batch();
            if batch.is_empty() {
                break;
            }

            epoch_loss += self.train_batch(&batch)?;
            batch_count += 1;

            if let Some(bar) = progress {
                bar.set_message(format!("{:.6}", epoch_loss / batch_count as f32));
                bar.inc(1);
            }
        }

        let mean_loss = if batch_count == 0 {
            0.0
        } else {
            epoch_loss / batch_count as f32
        };

        info!(batches = batch_count, loss = mean_loss, "finished training epoch");
        Ok(mean_loss)
    }

    /// Prints a summary of the model's structure
    ///
    /// Displays each layer's information and parameter statistics in a tabular format
    pub fn summary(&self) {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"sequential\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        let mut total_params: usize = 0;
        for (i, layer) in self.layers.iter().enumerate() {
            let layer_name = if i == 0 {
                "Layer".to_string()
            } else {
                format!("Layer_{}", i)
            };
            total_params += layer.param_count();

            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({})", layer_name, layer.layer_type()),
                format!("({},)", layer.output_size()),
                layer.param_count()
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );
        // f32 parameters, 4 bytes each
        println!(" Total params: {} ({} B)", total_params, total_params * 4);
        println!(
            " Cost: {} | Learning rate: {}",
            self.cost.cost_type(),
            self.learning_rate
        );
    }

    /// Returns an owned, serializable snapshot of the whole network.
    pub fn to_serializable(&self) -> SerializableSequential {
        SerializableSequential {
            learning_rate: self.learning_rate,
            cost: self.cost.to_serializable(),
            layers: self.layers.iter().map(|l| l.to_serializable()).collect(),
        }
    }

    /// Rebuilds a network from a snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(Sequential)` - A network computing the same outputs as the one the snapshot came from
    /// - `Err(IoError::FormatError)` - If the snapshot does not describe a valid network
    pub fn from_serializable(snapshot: SerializableSequential) -> Result<Self, IoError> {
        let layers = snapshot
            .layers
            .into_iter()
            .map(SerializableLayer::into_layer)
            .collect::<Result<Vec<_>, _>>()?;
        let cost = snapshot.cost.into_cost()?;

        Sequential::new(layers, cost, snapshot.learning_rate)
            .map_err(|e| IoError::FormatError(format!("stored network is invalid: {}", e)))
    }

    /// Saves sizes, parameters, cost and learning rate to a JSON file at `path`.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Model successfully saved to file
    /// - `Err(IoError::FormatError)` - A parameter is NaN or infinite; nothing is written
    /// - `Err(IoError::StdIoError)` - File creation or write operation failed
    /// - `Err(IoError::JsonError)` - Serialization to JSON failed
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        let path = path.as_ref();
        let snapshot = self.to_serializable();
        if let Some(index) = snapshot
            .layers
            .iter()
            .position(|layer| !layer.has_finite_parameters())
        {
            return Err(IoError::FormatError(format!(
                "layer {} holds non-finite parameters and cannot be saved",
                index
            )));
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        to_writer_pretty(&mut writer, &snapshot)?;

        // Ensure all data is written to disk
        writer.flush()?;

        info!(path = %path.display(), "saved network");
        Ok(())
    }

    /// Loads a network previously written by [`Sequential::save_to_path`].
    ///
    /// # Returns
    ///
    /// - `Ok(Sequential)` - The reconstructed network
    /// - `Err(IoError::NotFound)` - If `path` does not exist
    /// - `Err(IoError::JsonError)` - If the file is not a serialized network
    /// - `Err(IoError::FormatError)` - If the stored layers do not form a valid network
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let path = path.as_ref();
        let reader = IoError::load_in_buf_reader(path)?;
        let snapshot: SerializableSequential = from_reader(reader)?;

        let network = Self::from_serializable(snapshot)?;
        info!(path = %path.display(), layers = network.layers.len(), "loaded network");
        Ok(network)
    }
}

impl Network for Sequential {
    fn check_connection(&self) -> Result<(), ModelError> {
        check_layer_connection(&self.layers)
    }

    fn compute(&mut self, input: &Tensor) -> Result<Tensor, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::UninitializedState(
                "network has no layers".to_string(),
            ));
        }

        let mut output = input.clone();
        for layer in self.layers.iter_mut() {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    fn train_one_epoch(&mut self, data: &mut dyn BatchSource) -> Result<f32, ModelError> {
        self.run_epoch(data, None)
    }

    fn evaluate(&mut self, data: &mut dyn BatchSource) -> Result<f32, ModelError> {
        let mut correct = 0usize;
        let mut total = 0usize;

        loop {
            let batch = data.next_batch();
            if batch.is_empty() {
                break;
            }

            for pair in &batch {
                if self.predict(&pair.input())? == pair.label {
                    correct += 1;
                }
                total += 1;
            }
        }

        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f32 / total as f32
        };

        info!(correct, total, accuracy, "finished evaluation");
        Ok(accuracy)
    }
}
