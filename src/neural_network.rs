/// Module that contains neural network layer implementations
pub mod layer;
/// Module that contains cost (loss) function implementations
pub mod loss_function;
/// Module that contains the capability traits shared by layers, costs and networks
pub mod neural_network_trait;
/// Module that contains the sequential network and its persistence
pub mod sequential;

pub use layer::*;
pub use loss_function::*;
pub use neural_network_trait::*;
pub use sequential::*;

use ndarray::Array1;

/// Type alias for the 1-D vectors flowing through the network
pub type Tensor = Array1<f32>;

/// Index of the largest component of `values`.
///
/// Ties resolve to the lowest index; an empty vector yields `None`.
pub fn argmax(values: &Tensor) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// One-hot encodes `label` into a vector of length `size`.
///
/// # Returns
///
/// - `Ok(Tensor)` - `1.0` at index `label`, `0.0` elsewhere
/// - `Err(ModelError::ShapeMismatch)` - If `label >= size`
pub fn one_hot(label: usize, size: usize) -> Result<Tensor, crate::ModelError> {
    if label >= size {
        return Err(crate::ModelError::ShapeMismatch(format!(
            "label {} is outside the one-hot range 0..{}",
            label, size
        )));
    }
    let mut expected = Tensor::zeros(size);
    expected[label] = 1.0;
    Ok(expected)
}
