use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types that can occur during layer, cost and network operations
///
/// # Variants
///
/// - `ShapeMismatch` - A vector length disagrees with a layer's or cost's configured size
/// - `UninitializedState` - An operation needs state that does not exist yet, e.g. `backward`
///   before `forward`
/// - `ConfigurationError` - Invalid construction parameters such as a non-positive learning rate
///   or a broken layer chain
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Uninitialized state: {0}")]
    UninitializedState(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl ModelError {
    /// Builds a `ShapeMismatch` describing which vector had the wrong length.
    pub(crate) fn shape(what: &str, expected: usize, actual: usize) -> Self {
        ModelError::ShapeMismatch(format!(
            "{} has length {}, expected {}",
            what, actual, expected
        ))
    }
}

/// Input/Output error types that can occur during model persistence and dataset loading
///
/// # Variants
///
/// - `NotFound` - The file to load does not exist
/// - `StdIoError` - Wraps standard I/O errors from file system operations
/// - `JsonError` - Wraps JSON serialization/deserialization errors
/// - `CsvError` - Wraps errors from reading a dataset CSV file
/// - `FormatError` - The file parsed but does not describe a valid network
/// - `Model` - A model error raised while rebuilding or configuring a loaded object
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Format error: {0}")]
    FormatError(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IoError {
    /// Makes sure `path` exists, returning `IoError::NotFound` otherwise.
    pub fn ensure_exists(path: &Path) -> Result<(), IoError> {
        if path.exists() {
            Ok(())
        } else {
            Err(IoError::NotFound(path.to_path_buf()))
        }
    }

    /// Opens `path` in a buffered reader, mapping a missing file to `IoError::NotFound`.
    pub fn load_in_buf_reader(path: &Path) -> Result<BufReader<File>, IoError> {
        Self::ensure_exists(path)?;
        let file = File::open(path)?;
        Ok(BufReader::new(file))
    }
}
