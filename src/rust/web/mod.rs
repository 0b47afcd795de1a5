//! Upload page and category pages, rendered on the server.

pub mod render;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::model_manager::ArtifactFetcher;

pub use routes::{classify_upload, is_accepted_extension, UploadError};
pub use state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router<F: ArtifactFetcher + 'static>(state: AppState<F>) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    Router::new()
        .route("/", get(routes::index::<F>))
        .route("/model/download", post(routes::download_model::<F>))
        .route("/classify", post(routes::classify::<F>))
        .route("/categories/:label", get(routes::category::<F>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
