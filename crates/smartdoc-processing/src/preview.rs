//! Preview assembly: resolve, convert, sanitize, wrap.

use crate::document::converter::{self, ConversionError};
use crate::document::style_map::StyleMap;
use crate::sanitizer::{HtmlSanitizer, SanitizationError};
use smartdoc_core::{AppError, SanitizedPreview, UploadedFile};
use smartdoc_storage::Storage;
use std::sync::Arc;

/// CSS class of the single element wrapping every preview.
pub const PREVIEW_CONTAINER_CLASS: &str = "document-preview";

/// Orchestrates the preview pipeline for one uploaded document.
///
/// Holds no per-request state; one instance is shared by all requests.
#[derive(Clone)]
pub struct PreviewAssembler {
    storage: Arc<dyn Storage>,
    style_map: StyleMap,
    sanitizer: Arc<HtmlSanitizer>,
}

impl PreviewAssembler {
    pub fn new(storage: Arc<dyn Storage>, style_map: StyleMap) -> Self {
        Self {
            storage,
            style_map,
            sanitizer: Arc::new(HtmlSanitizer::new()),
        }
    }

    /// Build the sanitized preview for `file`.
    ///
    /// Uses the processed copy when one exists. Fails with `InvalidPath` for a
    /// name outside the storage root, `NotFound` when the file is missing on disk,
    /// `Conversion` for unreadable or empty documents and `Sanitization` when
    /// nothing survives sanitization.
    #[tracing::instrument(skip(self, file), fields(file_id = %file.id, is_processed = file.is_processed()))]
    pub async fn assemble(&self, file: &UploadedFile) -> Result<SanitizedPreview, AppError> {
        let filename = file.effective_filename();
        let path = self.storage.resolve(filename)?;

        if !self.storage.exists(filename).await? {
            tracing::error!(stage = "resolve", path = %path.display(), "File not found at path");
            return Err(AppError::NotFound("File not found on server".to_string()));
        }

        tracing::info!(stage = "convert", path = %path.display(), "Starting document conversion");
        let style_map = self.style_map;
        let conversion =
            tokio::task::spawn_blocking(move || converter::convert(&path, &style_map))
                .await
                .map_err(|e| AppError::Internal(format!("Conversion task failed: {}", e)))?
                .map_err(|e| {
                    tracing::error!(stage = "convert", error = %e, "Document conversion error");
                    AppError::from(e)
                })?;

        for message in &conversion.messages {
            tracing::warn!(stage = "convert", message = %message, "Conversion message");
        }

        if conversion.html.is_empty() {
            tracing::error!(stage = "convert", "Conversion produced empty HTML");
            return Err(ConversionError::EmptyDocument.into());
        }

        let sanitizer = self.sanitizer.clone();
        let raw_html = conversion.html;
        let clean_html = tokio::task::spawn_blocking(move || sanitizer.sanitize(&raw_html))
            .await
            .map_err(|e| AppError::Internal(format!("Sanitization task failed: {}", e)))?;

        if clean_html.trim().is_empty() {
            tracing::error!(stage = "sanitize", "HTML sanitization produced empty result");
            return Err(AppError::sanitization(
                "empty result",
                SanitizationError::EmptyOutput,
            ));
        }

        tracing::info!(
            stage = "assemble",
            html_bytes = clean_html.len(),
            messages = conversion.messages.len(),
            "Document preview ready"
        );

        Ok(SanitizedPreview {
            html: wrap(&clean_html),
            messages: conversion.messages,
            is_processed: file.is_processed(),
        })
    }
}

fn wrap(fragment: &str) -> String {
    format!("<div class=\"{}\">{}</div>", PREVIEW_CONTAINER_CLASS, fragment)
}
