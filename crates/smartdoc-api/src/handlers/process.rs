use crate::constants::PROCESSED_PREFIX;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::session::SessionToken;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use smartdoc_core::AppError;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    pub file_id: String,
    /// Free-text formatting instructions
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProcessResponse {
    pub message: String,
    pub file_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/process",
    tag = "documents",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Processed copy recorded", body = ProcessResponse),
        (status = 400, description = "Missing instructions or malformed body", body = ErrorResponse),
        (status = 404, description = "File not in session or missing on disk", body = ErrorResponse),
        (status = 503, description = "No formatting backend configured", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, session, request), fields(file_id = %request.file_id, operation = "process"))]
pub async fn process_document(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    ValidatedJson(request): ValidatedJson<ProcessRequest>,
) -> Result<Json<ProcessResponse>, HttpAppError> {
    let instructions = request.instructions.trim();
    if instructions.is_empty() {
        return Err(AppError::InvalidInput("No formatting instructions provided".to_string()).into());
    }

    let file = state.sessions.lookup(&session.0, &request.file_id).await?;

    let source_name = file.effective_filename();
    let source = state.storage.resolve(source_name)?;
    if !state.storage.exists(source_name).await? {
        tracing::error!(path = %source.display(), "File not found at path");
        return Err(AppError::NotFound("File not found on server".to_string()).into());
    }

    let processed_name = format!("{}{}", PROCESSED_PREFIX, file.filename);
    let destination = state.storage.resolve(&processed_name)?;

    let outcome = state
        .formatter
        .format(&source, &destination, instructions)
        .await?;

    if !state.storage.exists(&processed_name).await? {
        return Err(AppError::Internal(format!(
            "Formatting reported success but wrote no file at {}",
            destination.display()
        ))
        .into());
    }

    state
        .sessions
        .set_processed(&session.0, file.id, processed_name)
        .await?;

    tracing::info!(file_id = %file.id, "Document processed");

    Ok(Json(ProcessResponse {
        message: outcome.message,
        file_id: file.id,
    }))
}
