use image::DynamicImage;
use ndarray::Array4;

use super::error::ClassifierError;
use super::prediction::ClassificationResult;
use super::utils::{decode_image, preprocess, InputLayout};

/// An image model that maps a preprocessed batch to class probabilities.
///
/// The provided methods implement the full prediction path:
/// 1. Decode the uploaded bytes (PNG or JPEG only)
/// 2. Resize, scale to `[0, 1]` and add the batch dimension
/// 3. Run the model
/// 4. Pick the most probable label
///
/// Implementations must be read-only after construction so a single instance
/// can serve every request in the process.
pub trait ImageModel: Send + Sync {
    /// Side length of the square input the model expects
    fn input_size(&self) -> u32;

    /// Tensor layout of the model input
    fn input_layout(&self) -> InputLayout;

    /// Runs the model on a batch of one and returns one probability per label,
    /// in `Label::ALL` order.
    fn forward(&self, batch: Array4<f32>) -> Result<Vec<f32>, ClassifierError>;

    /// Classifies an already decoded image.
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationResult, ClassifierError> {
        let batch = preprocess(image, self.input_size(), self.input_layout());
        let probabilities = self.forward(batch)?;
        ClassificationResult::from_probabilities(&probabilities)
    }

    /// Decodes and classifies raw upload bytes.
    ///
    /// # Errors
    /// - `ValidationError` if the upload is empty
    /// - `ImageError` if the bytes are not a readable PNG or JPEG image
    /// - `ModelError` / `PredictionError` if inference fails
    fn classify_bytes(&self, bytes: &[u8]) -> Result<ClassificationResult, ClassifierError> {
        let image = decode_image(bytes)?;
        self.classify(&image)
    }
}
