use super::*;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Activation layers (ReLU, Softmax)
pub mod activation_layer;
/// Dense (fully connected) layer
pub mod dense;
/// Per-layer cached forward history
pub mod forward_history;
/// Owned, serializable layer descriptions used for persistence
pub mod serializable_layer;

pub use activation_layer::*;
pub use dense::*;
pub use forward_history::*;
pub use serializable_layer::*;

/// When a parameterized layer applies its gradient-descent step.
///
/// # Variants
///
/// - `PerExample` - Parameters are updated inside every `backward` call (online SGD)
/// - `BatchAveraged` - Gradients are accumulated by `backward` and applied once per batch
///   by `update(batch_size)`, scaled by `1 / batch_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpdateScheme {
    #[default]
    PerExample,
    BatchAveraged,
}

/// Checks that `vector` has exactly `expected` entries.
fn check_length(what: &str, vector: &Tensor, expected: usize) -> Result<(), ModelError> {
    if vector.len() != expected {
        return Err(ModelError::shape(what, expected, vector.len()));
    }
    Ok(())
}

/// Rejects zero-sized layers at construction.
fn check_layer_size(layer: &str, input_size: usize, output_size: usize) -> Result<(), ModelError> {
    if input_size == 0 || output_size == 0 {
        return Err(ModelError::ConfigurationError(format!(
            "{} layer sizes must be greater than 0, got ({}, {})",
            layer, input_size, output_size
        )));
    }
    Ok(())
}
