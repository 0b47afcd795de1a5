use std::sync::Arc;

use crate::knowledge::KnowledgeBase;
use crate::model_manager::{ArtifactFetcher, HttpFetcher};
use crate::model_slot::ModelSlot;

/// Shared state for the axum handlers.
pub struct AppState<F = HttpFetcher> {
    /// The process-wide model, loaded on demand
    pub slot: Arc<ModelSlot<F>>,
    pub knowledge: &'static KnowledgeBase,
    /// Largest accepted image file, in bytes
    pub max_upload_bytes: usize,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            knowledge: self.knowledge,
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

impl<F: ArtifactFetcher> AppState<F> {
    pub fn new(slot: Arc<ModelSlot<F>>, max_upload_bytes: usize) -> Self {
        Self {
            slot,
            knowledge: KnowledgeBase::builtin(),
            max_upload_bytes,
        }
    }
}
