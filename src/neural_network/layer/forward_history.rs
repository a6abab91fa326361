use crate::error::ModelError;
use crate::neural_network::Tensor;

/// The most recent forward activation of a layer.
///
/// A layer starts in `Ready` and moves to `Forwarded` on its first `forward` call; every later
/// `forward` replaces the cached vectors. `backward` is only legal in `Forwarded`.
///
/// # Variants
///
/// - `Ready` - Sizes are set but no forward pass has happened
/// - `Forwarded` - Owned copies of the last input and output
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ForwardHistory {
    #[default]
    Ready,
    Forwarded { input: Tensor, output: Tensor },
}

impl ForwardHistory {
    /// Replaces the history with a new input/output pair.
    pub fn record(&mut self, input: Tensor, output: Tensor) {
        *self = ForwardHistory::Forwarded { input, output };
    }

    /// Returns `true` in the `Forwarded` state.
    pub fn is_forwarded(&self) -> bool {
        matches!(self, ForwardHistory::Forwarded { .. })
    }

    /// Borrows the cached `(input, output)` pair.
    ///
    /// # Parameters
    ///
    /// - `layer` - Layer name used in the error message
    ///
    /// # Returns
    ///
    /// - `Ok((&Tensor, &Tensor))` - The last forward input and output
    /// - `Err(ModelError::UninitializedState)` - If no forward pass has happened
    pub fn get(&self, layer: &str) -> Result<(&Tensor, &Tensor), ModelError> {
        match self {
            ForwardHistory::Forwarded { input, output } => Ok((input, output)),
            ForwardHistory::Ready => Err(ModelError::UninitializedState(format!(
                "{} layer has no forward history; run forward before backward",
                layer
            ))),
        }
    }
}
