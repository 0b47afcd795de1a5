use std::collections::HashMap;
use std::sync::Arc;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;

use super::error::ClassifierError;
use super::inference::ImageModel;
use super::label::Label;
use super::utils::InputLayout;

/// A thread-safe waste classifier backed by an ONNX Runtime session.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync` because all of its fields are thread-safe:
/// - `String`, `InputLayout` and `u32` are plain data
/// - `Session` is wrapped in `Arc`
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use wastesort::{ImageModel, WasteClassifier};
///
/// let classifier = WasteClassifier::builder()
///     .with_custom_model("models/wastenet/model.onnx")?
///     .build()?;
///
/// let bytes = std::fs::read("bottle.jpg")?;
/// let result = classifier.classify_bytes(&bytes)?;
/// println!("{}", result);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct WasteClassifier {
    pub model_path: String,
    pub session: Arc<Session>,
    pub input_name: String,
    pub input_layout: InputLayout,
    pub input_size: u32,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<WasteClassifier>();
    }
};

impl WasteClassifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            model_path: self.model_path.clone(),
            input_size: self.input_size,
            input_layout: self.input_layout,
            class_labels: Label::ALL.to_vec(),
        }
    }
}

impl ImageModel for WasteClassifier {
    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn input_layout(&self) -> InputLayout {
        self.input_layout
    }

    fn forward(&self, batch: Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let input_dyn = batch.into_dyn();
        let input = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input)
                .map_err(|e| ClassifierError::ModelError(format!("Failed to create input tensor: {}", e)))?,
        );

        let outputs = self.session.run(input_tensors)
            .map_err(|e| ClassifierError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::ModelError(format!("Failed to extract output tensor: {}", e)))?;

        Ok(output_tensor.iter().copied().collect())
    }
}
