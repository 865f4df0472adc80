use crate::error::{ErrorResponse, HttpAppError};
use crate::session::SessionToken;
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use smartdoc_core::{AppError, UploadedFile};
use smartdoc_storage::secure_filename;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub file_id: Uuid,
    /// Sanitized name of the uploaded document
    pub filename: String,
    pub message: String,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Pull the single `file` field out of the form. Returns (client file name, bytes).
async fn extract_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        file = Some((filename, data.to_vec()));
    }

    let (filename, data) = file.ok_or_else(|| AppError::InvalidInput("No file part".to_string()))?;
    if filename.trim().is_empty() {
        return Err(AppError::InvalidInput("No selected file".to_string()));
    }
    Ok((filename, data))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document uploaded", body = UploadResponse),
        (status = 400, description = "Missing file, wrong type or not a .docx", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, session, multipart), fields(operation = "upload"))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let (client_filename, data) = extract_file_field(multipart).await?;

    state.validator.validate(&client_filename, &data)?;

    let safe_name = secure_filename(&client_filename);
    if safe_name.is_empty() {
        return Err(AppError::InvalidInput("Invalid file name".to_string()).into());
    }

    let file_id = Uuid::new_v4();
    let stored_name = format!("{}_{}", file_id, safe_name);
    state.storage.write(&stored_name, &data).await?;

    let record = UploadedFile {
        id: file_id,
        filename: stored_name,
        processed_filename: None,
        created_at: Utc::now(),
    };
    state.sessions.register(&session.0, record).await?;

    tracing::info!(
        file_id = %file_id,
        filename = %safe_name,
        size_bytes = data.len(),
        "Document uploaded"
    );

    Ok(Json(UploadResponse {
        file_id,
        filename: safe_name,
        message: "File uploaded successfully".to_string(),
    }))
}
