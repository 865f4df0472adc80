use crate::constants::{DOCX_CONTENT_TYPE, PROCESSED_PREFIX};
use crate::error::{ErrorResponse, HttpAppError};
use crate::session::SessionToken;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
};
use smartdoc_core::{AppError, UploadedFile};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// File name offered to the browser: the stored name without its id prefix.
fn download_name(file: &UploadedFile) -> String {
    let id_prefix = format!("{}_", file.id);
    let base = file.filename.strip_prefix(&id_prefix).unwrap_or(&file.filename);
    if file.is_processed() {
        format!("{}{}", PROCESSED_PREFIX, base)
    } else {
        base.to_string()
    }
}

#[utoipa::path(
    get,
    path = "/api/download/{file_id}",
    tag = "documents",
    params(
        ("file_id" = String, Path, description = "Id returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "The processed document if there is one, else the upload",
            content_type = "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        (status = 404, description = "File not in session or missing on disk", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, session), fields(file_id = %file_id, operation = "download"))]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    Path(file_id): Path<String>,
) -> Result<Response<Body>, HttpAppError> {
    let file = state.sessions.lookup(&session.0, &file_id).await?;
    let path = state.storage.resolve(file.effective_filename())?;

    let handle = match tokio::fs::File::open(&path).await {
        Ok(handle) => handle,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "File not found at path");
            return Err(AppError::NotFound("File not found on server".to_string()).into());
        }
        Err(e) => return Err(AppError::from(e).into()),
    };

    tracing::debug!(path = %path.display(), "Streaming document");

    let content_disposition = format!("attachment; filename=\"{}\"", download_name(&file));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, DOCX_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .body(Body::from_stream(ReaderStream::new(handle)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
