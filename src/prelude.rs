pub use crate::config::TrainingConfig;
pub use crate::dataset::{
    BatchSource, DataPair, IMAGE_SIZE, InMemoryDataset, MnistDataloader, MnistImage, NUM_CLASSES,
};
pub use crate::error::{IoError, ModelError};
pub use crate::neural_network::{
    CostFunction, Dense, ForwardHistory, Layer, MeanSquaredError, Network, ReLU, Sequential,
    Softmax, Tensor, UpdateScheme, argmax, one_hot,
};
