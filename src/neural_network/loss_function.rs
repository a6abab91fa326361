use crate::error::ModelError;
use crate::neural_network::CostFunction;
use serde::{Deserialize, Serialize};

/// Mean Squared Error cost function
pub mod mean_squared_error;

pub use mean_squared_error::*;

/// Serializable description of a cost function.
///
/// # Variants
///
/// - `MeanSquaredError` - Configured vector length of a `MeanSquaredError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SerializableCost {
    MeanSquaredError { size: usize },
}

impl SerializableCost {
    /// Rebuilds the cost function described by this value.
    pub fn into_cost(self) -> Result<Box<dyn CostFunction>, ModelError> {
        match self {
            SerializableCost::MeanSquaredError { size } => {
                Ok(Box::new(MeanSquaredError::new(size)?))
            }
        }
    }
}
