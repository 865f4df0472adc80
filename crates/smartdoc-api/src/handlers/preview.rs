use crate::error::{ErrorResponse, HttpAppError};
use crate::session::SessionToken;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use smartdoc_core::SanitizedPreview;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/preview/{file_id}",
    tag = "preview",
    params(
        ("file_id" = String, Path, description = "Id returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "Sanitized HTML preview", body = SanitizedPreview),
        (status = 404, description = "File not in session or missing on disk", body = ErrorResponse),
        (status = 500, description = "Conversion or sanitization failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, session), fields(file_id = %file_id, operation = "preview"))]
pub async fn preview_document(
    State(state): State<Arc<AppState>>,
    session: SessionToken,
    Path(file_id): Path<String>,
) -> Result<Json<SanitizedPreview>, HttpAppError> {
    let file = state.sessions.lookup(&session.0, &file_id).await?;
    let preview = state.assembler.assemble(&file).await?;
    Ok(Json(preview))
}
