use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A document uploaded during a session.
///
/// `filename` and `processed_filename` are names relative to the storage root,
/// never full paths. Only the path resolver turns them into filesystem paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: Uuid,
    pub filename: String,
    /// Name of the edited copy, set once a formatting request succeeds.
    pub processed_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            processed_filename: None,
            created_at: Utc::now(),
        }
    }

    /// The processed copy when one exists, otherwise the original upload.
    /// An empty processed name counts as absent.
    pub fn effective_filename(&self) -> &str {
        match self.processed_filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.filename,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed_filename
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }
}
