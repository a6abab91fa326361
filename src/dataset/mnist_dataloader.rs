use super::*;
use crate::error::{IoError, ModelError};
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads labeled digits from an MNIST CSV file.
///
/// Each row is `label,pixel0,...,pixel783` with no header. Rows with the wrong number of fields,
/// non-integer values or a label outside `0..NUM_CLASSES` are skipped with a warning. The file is
/// read once on construction; batches are then served from memory.
///
/// # Example
///
/// ```rust,no_run
/// use digitnet::dataset::*;
///
/// let mut loader = MnistDataloader::new("mnist/data/mnist_train.csv", 10).unwrap();
/// let batch = loader.next_batch();
/// println!("first batch holds {} digits", batch.len());
/// ```
#[derive(Debug, Clone)]
pub struct MnistDataloader {
    path: PathBuf,
    data: InMemoryDataset,
}

impl MnistDataloader {
    /// Opens and parses `path`.
    ///
    /// # Parameters
    ///
    /// - `path` - Location of the CSV file
    /// - `batch_size` - Pairs per batch, must be greater than 1
    ///
    /// # Returns
    ///
    /// - `Ok(MnistDataloader)` - The loader, positioned at the first row
    /// - `Err(IoError::Model)` - If `batch_size` is not greater than 1
    /// - `Err(IoError::NotFound)` - If `path` does not exist
    /// - `Err(IoError::CsvError)` - If the file cannot be read as CSV
    pub fn new<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Self, IoError> {
        let path = path.as_ref();
        // Validate the batch size before touching the file
        InMemoryDataset::new(Vec::new(), batch_size)?;
        IoError::ensure_exists(path)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut pairs = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            match parse_record(&record) {
                Ok(pair) => pairs.push(pair),
                Err(reason) => warn!(line = line + 1, %reason, "skipping malformed MNIST record"),
            }
        }

        debug!(path = %path.display(), records = pairs.len(), batch_size, "loaded MNIST CSV");

        Ok(Self {
            path: path.to_path_buf(),
            data: InMemoryDataset::new(pairs, batch_size)?,
        })
    }

    /// Reshuffles the row order on every reset, seeded by `seed`.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.data = self.data.with_shuffle(seed);
        self
    }

    /// Returns the file this loader was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of valid rows
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file held no valid rows
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the row at `index`, regardless of the stream position
    pub fn get(&self, index: usize) -> Option<&DataPair> {
        self.data.get(index)
    }
}

impl BatchSource for MnistDataloader {
    fn batch_size(&self) -> usize {
        self.data.batch_size()
    }

    fn next_batch(&mut self) -> Vec<DataPair> {
        self.data.next_batch()
    }

    fn reset(&mut self) {
        self.data.reset();
    }
}

/// Parses one `label,pixels...` row.
fn parse_record(record: &StringRecord) -> Result<DataPair, ModelError> {
    if record.len() != 1 + IMAGE_SIZE {
        return Err(ModelError::shape("CSV record", 1 + IMAGE_SIZE, record.len()));
    }

    let values = record
        .iter()
        .map(|field| field.trim().parse::<i64>())
        .collect::<Result<Vec<i64>, _>>()
        .map_err(|e| ModelError::ConfigurationError(format!("non-integer field: {}", e)))?;

    let label = values[0];
    if !(0..NUM_CLASSES as i64).contains(&label) {
        return Err(ModelError::ConfigurationError(format!(
            "label {} is outside 0..{}",
            label, NUM_CLASSES
        )));
    }

    let image = MnistImage::new(values[1..].to_vec())?;
    Ok(DataPair::new(label as usize, image))
}
