use super::IMAGE_SIZE;
use crate::error::ModelError;
use crate::neural_network::Tensor;

/// Largest raw pixel intensity
const MAX_PIXEL: f32 = 255.0;

/// A 28x28 grayscale image as stored in the MNIST dataset.
///
/// Raw pixel values are clamped to `[0, 255]` on construction. The network only ever consumes
/// the normalized form, `pixel / 255.0`.
///
/// # Example
///
/// ```rust
/// use digitnet::dataset::{IMAGE_SIZE, MnistImage};
///
/// let image = MnistImage::new(vec![300; IMAGE_SIZE]).unwrap();
/// assert_eq!(image.pixels()[0], 255);
/// assert_eq!(image.normalized()[0], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MnistImage {
    pixels: Vec<u8>,
}

impl MnistImage {
    /// Creates an image from raw pixel values.
    ///
    /// # Parameters
    ///
    /// - `pixels` - Exactly `IMAGE_SIZE` values; anything outside `[0, 255]` is clamped
    ///
    /// # Returns
    ///
    /// - `Ok(MnistImage)` - The image
    /// - `Err(ModelError::ShapeMismatch)` - If `pixels` does not hold exactly `IMAGE_SIZE` values
    pub fn new(pixels: Vec<i64>) -> Result<Self, ModelError> {
        if pixels.len() != IMAGE_SIZE {
            return Err(ModelError::shape("image pixel data", IMAGE_SIZE, pixels.len()));
        }

        Ok(Self {
            pixels: pixels.into_iter().map(|p| p.clamp(0, 255) as u8).collect(),
        })
    }

    /// Returns the raw pixel values in `[0, 255]`
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the pixel values scaled to `[0, 1]`
    pub fn normalized(&self) -> Tensor {
        self.pixels.iter().map(|&p| p as f32 / MAX_PIXEL).collect()
    }
}
