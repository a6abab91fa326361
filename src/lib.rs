//! A from-scratch feed-forward neural network trainer for handwritten digit classification.
//!
//! Inputs are 784-element vectors (28x28 pixels scaled to `[0, 1]`), outputs are 10-way class
//! scores. Networks are strictly sequential pipelines of Dense, ReLU and Softmax layers trained
//! with mini-batch gradient descent against a mean-squared-error cost.

/// Error types shared across the crate.
///
/// - `ModelError` - Shape mismatches, missing forward history and invalid configuration
/// - `IoError` - Missing files and malformed model or dataset files
pub mod error;

pub use error::{IoError, ModelError};

/// Layers, cost functions and the sequential network.
///
/// # Core Components
///
/// ## Layer Types
/// - **Dense**: Fully connected layer `W · x + b` with normal-distributed initial weights
/// - **ReLU**: Element-wise `max(0, x)`
/// - **Softmax**: Numerically stable normalized exponential with an exact Jacobian backward pass
///
/// ## Cost Functions
/// - **MeanSquaredError**: Mean of squared differences and its exact gradient
///
/// ## Network
/// - **Sequential**: Validated linear chain of layers with inference, epoch training,
///   evaluation and JSON persistence
///
/// # Examples
/// ```rust
/// use digitnet::prelude::*;
/// use ndarray::array;
///
/// let mut model = Sequential::builder()
///     .add(Dense::seeded(2, 4, 42).unwrap())
///     .add(ReLU::new(4).unwrap())
///     .add(Dense::seeded(4, 2, 43).unwrap())
///     .add(Softmax::new(2).unwrap())
///     .compile(MeanSquaredError::new(2).unwrap(), 0.01)
///     .unwrap();
///
/// let class = model.predict(&array![0.5, 0.25]).unwrap();
/// assert!(class < 2);
/// ```
pub mod neural_network;

/// Labeled MNIST images and the batch sources that feed them to a network.
///
/// - `MnistImage` - Raw `[0, 255]` pixels with a normalized `[0, 1]` view
/// - `DataPair` - A label plus its image
/// - `BatchSource` - Ordered, restartable stream of fixed-size batches
/// - `InMemoryDataset` / `MnistDataloader` - In-memory and CSV-backed batch sources
pub mod dataset;

/// Training configuration and the factory that builds the digit classifier.
pub mod config;

/// A convenience module that re-exports the most commonly used types and traits from this crate.
///
/// # Examples
/// ```rust
/// use digitnet::prelude::*;
/// ```
pub mod prelude;
