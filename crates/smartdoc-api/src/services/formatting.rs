//! Boundary to the document formatting service.
//!
//! Formatting rewrites a stored document according to free-text instructions and
//! writes the result to a new file. The model-backed implementation lives outside
//! this service; without one, formatting requests answer 503.

use async_trait::async_trait;
use smartdoc_core::AppError;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingOutcome {
    /// Human-readable summary returned to the client
    pub message: String,
}

#[async_trait]
pub trait FormattingAgent: Send + Sync {
    /// Apply `instructions` to the document at `source`, writing the result to
    /// `destination`. Both paths are already resolved inside the storage root.
    async fn format(
        &self,
        source: &Path,
        destination: &Path,
        instructions: &str,
    ) -> Result<FormattingOutcome, AppError>;
}

/// Agent used when no formatting backend is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredFormattingAgent;

#[async_trait]
impl FormattingAgent for UnconfiguredFormattingAgent {
    async fn format(
        &self,
        _source: &Path,
        _destination: &Path,
        _instructions: &str,
    ) -> Result<FormattingOutcome, AppError> {
        Err(AppError::ServiceUnavailable(
            "Document formatting service is not configured".to_string(),
        ))
    }
}
