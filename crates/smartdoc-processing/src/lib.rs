//! SmartDoc Processing Library
//!
//! The document preview pipeline: upload validation, DOCX to HTML conversion,
//! HTML sanitization and assembly of the final preview payload.

pub mod document;
pub mod preview;
pub mod sanitizer;
pub mod validator;

pub use document::converter::{self, ConversionError};
pub use document::style_map::{StyleMap, StyleMapping, StyleMatcher, DEFAULT_STYLE_MAP};
pub use preview::{PreviewAssembler, PREVIEW_CONTAINER_CLASS};
pub use sanitizer::{HtmlSanitizer, SanitizationError};
pub use validator::{DocumentValidator, ValidationError};
