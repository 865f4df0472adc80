use crate::error::{ErrorBody, ErrorResponse};
use crate::handlers::{download, preview, process, upload};
use smartdoc_core::SanitizedPreview;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SmartDoc Formatter API",
        description = "Upload .docx documents, preview them as sanitized HTML and download the result."
    ),
    paths(
        upload::upload_document,
        preview::preview_document,
        download::download_document,
        process::process_document,
    ),
    components(schemas(
        SanitizedPreview,
        upload::UploadResponse,
        process::ProcessRequest,
        process::ProcessResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "documents", description = "Upload, formatting and download"),
        (name = "preview", description = "HTML preview of uploaded documents"),
    )
)]
pub struct ApiDoc;
