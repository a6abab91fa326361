use crate::neural_network::Tensor;

/// Fixed-size batches held in memory, with optional per-reset shuffling
pub mod in_memory_dataset;
/// Loader for the headerless `label,pixel0,...,pixel783` MNIST CSV format
pub mod mnist_dataloader;
/// A single 28x28 grayscale digit image
pub mod mnist_image;

pub use in_memory_dataset::*;
pub use mnist_dataloader::*;
pub use mnist_image::*;

/// Side length of an MNIST image in pixels
pub const IMAGE_SIDE: usize = 28;

/// Number of pixels in an MNIST image, and the network input size
pub const IMAGE_SIZE: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Number of digit classes, and the network output size
pub const NUM_CLASSES: usize = 10;

/// A labeled training or evaluation example.
///
/// # Fields
///
/// - `label` - The digit shown in the image, in `0..NUM_CLASSES`
/// - `image` - The image itself
#[derive(Debug, Clone, PartialEq)]
pub struct DataPair {
    pub label: usize,
    pub image: MnistImage,
}

impl DataPair {
    /// Creates a new labeled example
    pub fn new(label: usize, image: MnistImage) -> Self {
        Self { label, image }
    }

    /// Returns the normalized network input for this example
    pub fn input(&self) -> Tensor {
        self.image.normalized()
    }
}

/// An ordered, restartable stream of fixed-size batches.
///
/// An exhausted stream yields an empty batch, which marks the end of an epoch. The final batch
/// may hold fewer than `batch_size()` pairs.
pub trait BatchSource {
    /// Returns the configured batch size
    fn batch_size(&self) -> usize;

    /// Returns the next batch, or an empty `Vec` once the stream is exhausted
    fn next_batch(&mut self) -> Vec<DataPair>;

    /// Restarts the stream from its beginning
    fn reset(&mut self);
}
