use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{info, warn};

use super::render::{
    render_category_page, render_not_found, render_page, Notice, NoticeLevel, PageView,
    UploadOutcome,
};
use super::state::AppState;
use crate::classifier::{ClassifierError, ImageModel};
use crate::model_manager::{ArtifactFetcher, ModelError};

/// File extensions accepted by the upload form.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No image was uploaded.")]
    MissingFile,
    #[error("Unsupported file type '{0}'. Please upload a JPG, JPEG or PNG image.")]
    UnsupportedExtension(String),
    #[error("Image is {size} bytes, larger than the {limit} byte limit.")]
    TooLarge { size: usize, limit: usize },
    #[error("The model is not available yet. Download it first.")]
    ModelUnavailable,
    #[error("{0}")]
    Model(#[from] ModelError),
    #[error("{0}")]
    Classifier(#[from] ClassifierError),
    #[error("Classification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::UnsupportedExtension(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Classifier(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            Self::Model(_) | Self::Classifier(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn is_accepted_extension(file_name: &str) -> bool {
    FsPath::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.iter().any(|accepted| ext.eq_ignore_ascii_case(accepted)))
        .unwrap_or(false)
}

/// Validates, classifies and annotates one uploaded file.
pub async fn classify_upload<F: ArtifactFetcher>(
    state: &AppState<F>,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<UploadOutcome, UploadError> {
    if file_name.is_empty() && bytes.is_empty() {
        return Err(UploadError::MissingFile);
    }
    if !is_accepted_extension(file_name) {
        return Err(UploadError::UnsupportedExtension(file_name.to_string()));
    }
    if bytes.len() > state.max_upload_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            limit: state.max_upload_bytes,
        });
    }

    let model = match state.slot.get() {
        Some(model) => model,
        None => state.slot.load_if_present().await?.ok_or(UploadError::ModelUnavailable)?,
    };

    let (result, bytes) = tokio::task::spawn_blocking(move || {
        let result = model.classify_bytes(&bytes);
        (result, bytes)
    })
    .await?;
    let result = result?;

    let mime = image::guess_format(&bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");
    let image_data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));

    info!("Classified {} as {}", file_name, result);
    Ok(UploadOutcome {
        file_name: file_name.to_string(),
        image_data_uri,
        info: state.knowledge.lookup(result.label),
        result,
    })
}

fn page<F: ArtifactFetcher>(
    state: &AppState<F>,
    status: StatusCode,
    notices: Vec<Notice>,
    outcome: Option<&UploadOutcome>,
) -> (StatusCode, Html<String>) {
    let view = PageView {
        status: state.slot.status(),
        notices,
        outcome,
    };
    (status, Html(render_page(&view)))
}

pub async fn index<F: ArtifactFetcher>(State(state): State<AppState<F>>) -> (StatusCode, Html<String>) {
    page(&state, StatusCode::OK, Vec::new(), None)
}

pub async fn download_model<F: ArtifactFetcher>(State(state): State<AppState<F>>) -> (StatusCode, Html<String>) {
    info!("Model provisioning requested");
    match state.slot.ensure_model().await {
        Ok(_) => page(
            &state,
            StatusCode::OK,
            vec![Notice::new(NoticeLevel::Success, "Model downloaded and loaded successfully.")],
            None,
        ),
        Err(e) if e.is_download_failure() => {
            warn!("Model download failed: {}", e);
            page(
                &state,
                StatusCode::BAD_GATEWAY,
                vec![Notice::new(NoticeLevel::Warning, format!("Model download failed: {}. Please try again.", e))],
                None,
            )
        }
        Err(e) => {
            log::error!("Model provisioning failed: {}", e);
            page(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                vec![Notice::new(NoticeLevel::Error, e.to_string())],
                None,
            )
        }
    }
}

pub async fn classify<F: ArtifactFetcher>(
    State(state): State<AppState<F>>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("image") {
                    continue;
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((file_name, bytes.to_vec())),
                    Err(e) => {
                        warn!("Failed to read upload: {}", e);
                        return page(&state, e.status(), vec![Notice::new(NoticeLevel::Error, e.body_text())], None);
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed upload: {}", e);
                return page(&state, e.status(), vec![Notice::new(NoticeLevel::Error, e.body_text())], None);
            }
        }
    }

    let Some((file_name, bytes)) = upload else {
        let err = UploadError::MissingFile;
        return page(&state, err.status_code(), vec![Notice::new(NoticeLevel::Error, err.to_string())], None);
    };

    match classify_upload(&state, &file_name, bytes).await {
        Ok(outcome) => page(&state, StatusCode::OK, Vec::new(), Some(&outcome)),
        Err(e) => {
            warn!("Upload {} rejected: {}", file_name, e);
            page(&state, e.status_code(), vec![Notice::new(NoticeLevel::Error, e.to_string())], None)
        }
    }
}

pub async fn category<F: ArtifactFetcher>(
    State(state): State<AppState<F>>,
    Path(name): Path<String>,
) -> (StatusCode, Html<String>) {
    match state.knowledge.get(&name) {
        Ok((label, info)) => (StatusCode::OK, Html(render_category_page(label, info))),
        Err(e) => (StatusCode::NOT_FOUND, Html(render_not_found(&e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        assert!(is_accepted_extension("bottle.jpg"));
        assert!(is_accepted_extension("bottle.JPEG"));
        assert!(is_accepted_extension("scan.Png"));
        assert!(!is_accepted_extension("anim.gif"));
        assert!(!is_accepted_extension("noextension"));
        assert!(!is_accepted_extension(""));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(UploadError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::TooLarge { size: 11, limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            UploadError::UnsupportedExtension("a.gif".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            UploadError::Classifier(ClassifierError::ImageError("bad".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UploadError::Classifier(ClassifierError::ModelError("bad".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
