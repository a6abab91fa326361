use super::*;
use crate::error::ModelError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// A [`BatchSource`] over pairs held in memory.
///
/// Batches are handed out in order; `reset` rewinds to the first pair. When shuffling is enabled
/// the pair order is reshuffled on every reset, so every epoch visits the data in a new order.
///
/// # Example
///
/// ```rust
/// use digitnet::dataset::*;
///
/// let image = MnistImage::new(vec![0; IMAGE_SIZE]).unwrap();
/// let pairs = vec![DataPair::new(3, image); 5];
/// let mut data = InMemoryDataset::new(pairs, 2).unwrap();
///
/// assert_eq!(data.next_batch().len(), 2);
/// assert_eq!(data.next_batch().len(), 2);
/// assert_eq!(data.next_batch().len(), 1);
/// assert!(data.next_batch().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    pairs: Vec<DataPair>,
    batch_size: usize,
    cursor: usize,
    shuffle_rng: Option<StdRng>,
}

impl InMemoryDataset {
    /// Creates a dataset over `pairs`.
    ///
    /// # Returns
    ///
    /// - `Ok(InMemoryDataset)` - The dataset, positioned at its first pair
    /// - `Err(ModelError::ConfigurationError)` - If `batch_size` is not greater than 1
    pub fn new(pairs: Vec<DataPair>, batch_size: usize) -> Result<Self, ModelError> {
        if batch_size <= 1 {
            return Err(ModelError::ConfigurationError(format!(
                "batch size must be greater than 1, got {}",
                batch_size
            )));
        }

        Ok(Self {
            pairs,
            batch_size,
            cursor: 0,
            shuffle_rng: None,
        })
    }

    /// Enables shuffling with a generator seeded by `seed` and shuffles right away.
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_rng = Some(StdRng::seed_from_u64(seed));
        self.reset();
        self
    }

    /// Returns the number of pairs in the dataset
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the dataset holds no pairs
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns the pair at `index`, regardless of the stream position
    pub fn get(&self, index: usize) -> Option<&DataPair> {
        self.pairs.get(index)
    }
}

impl BatchSource for InMemoryDataset {
    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn next_batch(&mut self) -> Vec<DataPair> {
        let end = (self.cursor + self.batch_size).min(self.pairs.len());
        let batch = self.pairs[self.cursor..end].to_vec();
        self.cursor = end;
        batch
    }

    fn reset(&mut self) {
        self.cursor = 0;
        if let Some(rng) = self.shuffle_rng.as_mut() {
            self.pairs.shuffle(rng);
        }
    }
}
