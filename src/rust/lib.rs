//! Waste image classification with disposal guidance.
//!
//! An uploaded photo is resized to the model's input geometry, scaled to `[0, 1]`
//! and run through an ONNX image classifier. The winning [`Label`] is then used
//! to look up static guidance in the [`KnowledgeBase`].
//!
//! # Basic Usage
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use wastesort::{
//!     BuiltinModel, ImageModel, KnowledgeBase, ModelManager, ModelSlot, RuntimeConfig,
//! };
//!
//! let manager = ModelManager::new_default()?;
//! let info = BuiltinModel::WasteNet.get_model_info();
//! let slot = ModelSlot::new(manager, info, RuntimeConfig::default());
//! let model = slot.ensure_model().await?;
//!
//! let bytes = std::fs::read("bottle.jpg")?;
//! let result = model.classify_bytes(&bytes)?;
//! let info = KnowledgeBase::builtin().lookup(result.label);
//! println!("{} - {}", result, info.description);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A loaded model is read-only and shared through `Arc`; the [`ModelSlot`] loads
//! it once per process and hands out clones of the same handle.

pub mod classifier;
pub mod config;
pub mod knowledge;
pub mod model_manager;
pub mod model_slot;
pub mod models;
mod runtime;
pub mod web;

pub use classifier::{
    ClassificationResult, ClassifierBuilder, ClassifierError, ClassifierInfo, ImageModel,
    InputLayout, Label, WasteClassifier,
};
pub use config::ServerConfig;
pub use knowledge::{CategoryInfo, KnowledgeBase, KnowledgeError, LinkKind, ReferenceLink};
pub use model_manager::{ArtifactFetcher, HttpFetcher, ModelError, ModelManager};
pub use model_slot::{ModelHandle, ModelSlot, ModelStatus};
pub use models::{BuiltinModel, ModelCharacteristics, ModelInfo};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
