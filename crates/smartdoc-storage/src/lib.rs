//! SmartDoc Storage Library
//!
//! Everything that turns a client-supplied file name into bytes on disk lives here.
//!
//! # Storage layout
//!
//! All documents sit flat in a single storage root (`UPLOAD_FOLDER`). Names are
//! sanitized with [`secure_filename`] and uploads are prefixed with a UUID so two
//! sessions uploading `report.docx` never collide:
//!
//! - **Upload**: `{uuid}_{sanitized_name}`
//! - **Processed copy**: `processed_{uuid}_{sanitized_name}`
//!
//! Names must not contain `..` components or be absolute. Path construction is
//! centralized in [`PathResolver`] so every caller gets the same containment check.

pub mod local;
pub mod resolver;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use resolver::{secure_filename, PathResolver};
pub use traits::{Storage, StorageError, StorageResult};
