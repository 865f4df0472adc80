use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw output of the structural converter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    pub html: String,
    /// Non-fatal diagnostics, in document order.
    pub messages: Vec<String>,
}

/// Sanitized HTML preview returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SanitizedPreview {
    /// Sanitized fragment wrapped in a single `div.document-preview`.
    pub html: String,
    pub messages: Vec<String>,
    pub is_processed: bool,
}
