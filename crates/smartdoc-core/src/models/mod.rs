//! Domain models

pub mod document;
pub mod preview;

pub use document::UploadedFile;
pub use preview::{ConversionResult, SanitizedPreview};
