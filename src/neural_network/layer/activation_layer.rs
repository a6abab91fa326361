use super::*;

/// Generates the size and history accessors shared by parameter-free, size-preserving layers.
///
/// Expects the layer struct to have `size: usize` and `history: ForwardHistory` fields.
macro_rules! same_size_layer_functions {
    () => {
        fn input_size(&self) -> usize {
            self.size
        }

        fn output_size(&self) -> usize {
            self.size
        }

        fn is_forwarded(&self) -> bool {
            self.history.is_forwarded()
        }
    };
}

/// ReLU (Rectified Linear Unit) activation layer
pub mod relu;
/// Softmax activation layer
pub mod softmax;

pub use relu::*;
pub use softmax::*;
