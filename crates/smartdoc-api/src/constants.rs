//! API constants

/// Prefix every API route is nested under
pub const API_PREFIX: &str = "/api";

/// Content type served for downloaded documents
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Name prefix of a document produced by the formatting service
pub const PROCESSED_PREFIX: &str = "processed_";

/// Slack on top of the upload limit for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
