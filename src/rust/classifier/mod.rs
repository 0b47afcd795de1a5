mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod inference;
mod label;
mod prediction;
mod utils;

pub use builder::ClassifierBuilder;
pub use classifier::WasteClassifier;
pub use error::ClassifierError;
pub use inference::ImageModel;
pub use label::{Label, ParseLabelError};
pub use prediction::ClassificationResult;
pub use utils::{decode_image, preprocess, InputLayout, DEFAULT_INPUT_SIZE};

/// Information about a loaded classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    pub model_path: String,
    pub input_size: u32,
    pub input_layout: InputLayout,
    pub class_labels: Vec<Label>,
}
