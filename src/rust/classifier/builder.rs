use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use ort::session::Session;
use ort::value::ValueType;

use super::classifier::WasteClassifier;
use super::error::ClassifierError;
use super::label::Label;
use super::utils::{InputLayout, DEFAULT_INPUT_SIZE};
use crate::models::{BuiltinModel, ModelCharacteristics};
use crate::runtime::{create_session_builder, RuntimeConfig};
use crate::ModelManager;

/// A builder for constructing a WasteClassifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    model_path: Option<PathBuf>,
    session: Option<Session>,
    layout_override: Option<InputLayout>,
    expected: Option<ModelCharacteristics>,
    runtime_config: RuntimeConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    pub fn new() -> Self {
        Self {
            model_path: None,
            session: None,
            layout_override: None,
            expected: None,
            runtime_config: RuntimeConfig::default(),
        }
    }

    /// Sets the runtime configuration for ONNX model execution.
    /// Must be called before the model is loaded to take effect.
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Forces the input tensor layout instead of inferring it from the model graph.
    pub fn with_input_layout(mut self, layout: InputLayout) -> Self {
        self.layout_override = Some(layout);
        self
    }

    /// Requires the loaded graph to match a known model's input size and class count.
    pub fn with_expected_characteristics(mut self, characteristics: ModelCharacteristics) -> Self {
        self.expected = Some(characteristics);
        self
    }

    /// Loads a built-in model from the default models directory.
    /// The graph must match the model's published characteristics.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - A model is already set
    ///   - The model is not downloaded
    ///   - The model failed to load
    pub fn with_model(self, model: BuiltinModel) -> Result<Self, ClassifierError> {
        let manager = ModelManager::new_default()
            .map_err(|e| ClassifierError::BuildError(format!("Failed to create model manager: {}", e)))?;
        let info = model.get_model_info();

        if !manager.is_model_downloaded(&info) {
            return Err(ClassifierError::BuildError(format!(
                "Model '{:?}' is not downloaded. Please download it first using ModelManager::ensure_model_downloaded()",
                model
            )));
        }

        let model_path = manager.get_model_path(&info);
        self.with_expected_characteristics(model.characteristics())
            .with_custom_model(model_path)
    }

    /// Loads an ONNX model from an explicit path.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - The path is empty or does not exist
    ///   - A model is already set
    ///   - ONNX Runtime cannot load the file
    pub fn with_custom_model(mut self, model_path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if model_path.as_os_str().is_empty() {
            return Err(ClassifierError::BuildError("Model path cannot be empty".to_string()));
        }
        if self.model_path.is_some() {
            return Err(ClassifierError::BuildError("Model path already set".to_string()));
        }
        if !model_path.exists() {
            return Err(ClassifierError::BuildError(format!("Model file not found: {}", model_path.display())));
        }

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(model_path)
            .map_err(|e| {
                error!("Failed to load model {}: {}", model_path.display(), e);
                ClassifierError::ModelError(format!("Failed to load model: {}", e))
            })?;
        info!("Model loaded from {}", model_path.display());

        self.model_path = Some(model_path.to_path_buf());
        self.session = Some(session);
        Ok(self)
    }

    /// Builds and returns the final WasteClassifier instance
    ///
    /// # Returns
    /// * `Result<WasteClassifier, ClassifierError>` - The classifier if successful, or an error if:
    ///   - No model has been loaded
    ///   - The model does not take a single 4-D image tensor
    ///   - The model output does not have one score per waste category
    pub fn build(mut self) -> Result<WasteClassifier, ClassifierError> {
        let session = self.session.take()
            .ok_or_else(|| ClassifierError::BuildError("No ONNX model loaded".into()))?;
        let model_path = self.model_path.take()
            .ok_or_else(|| ClassifierError::BuildError("Model path must be set".into()))?;

        let num_classes = self.expected.as_ref().map_or(Label::COUNT, |c| c.num_classes);
        let (input_name, input_dims) = Self::validate_model(&session, num_classes)?;
        let input_layout = match self.layout_override {
            Some(layout) => layout,
            None => InputLayout::infer(&input_dims)?,
        };
        let input_size = Self::resolve_input_size(&input_dims, input_layout, self.expected.as_ref())?;
        info!(
            "Model structure validated: input '{}' {:?}, layout {:?}, size {}",
            input_name, input_dims, input_layout, input_size
        );

        Ok(WasteClassifier {
            model_path: model_path.to_string_lossy().to_string(),
            session: Arc::new(session),
            input_name,
            input_layout,
            input_size,
        })
    }

    /// Validates that the model has the expected input/output structure and
    /// returns the input name and shape.
    fn validate_model(
        session: &Session,
        num_classes: usize,
    ) -> Result<(String, Vec<i64>), ClassifierError> {
        let input = match session.inputs.as_slice() {
            [input] => input,
            inputs => {
                return Err(ClassifierError::ModelError(format!(
                    "Model must have exactly 1 image input, found {}",
                    inputs.len()
                )))
            }
        };
        let input_dims = match &input.input_type {
            ValueType::Tensor { dimensions, .. } => dimensions.clone(),
            other => {
                return Err(ClassifierError::ModelError(format!(
                    "Model input '{}' must be a tensor, found {:?}",
                    input.name, other
                )))
            }
        };
        if input_dims.len() != 4 {
            return Err(ClassifierError::ModelError(format!(
                "Model input must be 4-D, found shape {:?}",
                input_dims
            )));
        }

        let output = session.outputs.first()
            .ok_or_else(|| ClassifierError::ModelError("Model must have at least 1 output".to_string()))?;
        if let ValueType::Tensor { dimensions, .. } = &output.output_type {
            if let Some(&classes) = dimensions.last() {
                if classes > 0 && classes as usize != num_classes {
                    return Err(ClassifierError::ModelError(format!(
                        "Model predicts {} classes but {} waste categories are defined",
                        classes, num_classes
                    )));
                }
            }
        }

        Ok((input.name.clone(), input_dims))
    }

    /// Square input size for the graph. A static size must agree with the
    /// expected characteristics; a dynamic one falls back to them, or to 224.
    fn resolve_input_size(
        dims: &[i64],
        layout: InputLayout,
        expected: Option<&ModelCharacteristics>,
    ) -> Result<u32, ClassifierError> {
        match (layout.spatial_size(dims), expected) {
            (Some(size), Some(c)) if size != c.input_size => Err(ClassifierError::ModelError(format!(
                "Model takes {0}x{0} images but {1}x{1} was expected",
                size, c.input_size
            ))),
            (Some(size), _) => Ok(size),
            (None, Some(c)) => Ok(c.input_size),
            (None, None) => Ok(DEFAULT_INPUT_SIZE),
        }
    }
}
