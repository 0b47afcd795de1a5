use crate::classifier::{Label, DEFAULT_INPUT_SIZE};

/// Remote location of the pretrained waste classifier.
pub const DEFAULT_MODEL_URL: &str =
    "https://drive.google.com/uc?export=download&id=1UMKoI_y3mZhOyFi-RurNNuyOsqT6BcuX";

/// Represents the available built-in models in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinModel {
    /// Transfer-learned image classifier over the six waste categories
    ///
    /// Characteristics:
    /// - Input: 224x224 RGB, intensities scaled to [0, 1]
    /// - Output: softmax over `Label::ALL`
    WasteNet,
}

/// Characteristics of a model including its input geometry and output space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCharacteristics {
    /// Side length of the square input image
    pub input_size: u32,
    /// Number of classes in the output probability vector
    pub num_classes: usize,
}

/// Where a model artifact lives locally and remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Directory name under the models directory
    pub name: String,
    /// File name of the artifact inside that directory
    pub file_name: String,
    pub model_url: String,
    /// Optional SHA-256 of the artifact; no integrity check when absent
    pub model_hash: Option<String>,
}

impl BuiltinModel {
    /// Get the characteristics of the model
    pub fn characteristics(&self) -> ModelCharacteristics {
        match self {
            Self::WasteNet => ModelCharacteristics {
                input_size: DEFAULT_INPUT_SIZE,
                num_classes: Label::COUNT,
            },
        }
    }

    pub fn get_model_info(&self) -> ModelInfo {
        match self {
            Self::WasteNet => ModelInfo {
                name: "wastenet".to_string(),
                file_name: "model.onnx".to_string(),
                model_url: DEFAULT_MODEL_URL.to_string(),
                model_hash: None,
            },
        }
    }
}
