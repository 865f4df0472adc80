//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::services::{CleanupService, FormattingAgent, UnconfiguredFormattingAgent};
use crate::session::SessionRegistry;
use crate::state::AppState;
use anyhow::{Context, Result};
use smartdoc_core::Config;
use smartdoc_processing::{DocumentValidator, PreviewAssembler, StyleMap};
use smartdoc_storage::{LocalStorage, Storage};
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .context("Failed to initialize telemetry")?;

    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    let state = build_state(config.clone(), Arc::new(UnconfiguredFormattingAgent)).await?;

    if config.cleanup_interval_secs > 0 {
        let cleanup = Arc::new(CleanupService::new(
            state.storage.clone(),
            state.sessions.clone(),
            config.file_cleanup_after(),
            Duration::from_secs(config.cleanup_interval_secs),
        ));
        cleanup.start();
        tracing::info!(
            interval_secs = config.cleanup_interval_secs,
            max_file_age_secs = config.file_cleanup_after_secs,
            "Stale file cleanup enabled"
        );
    } else {
        tracing::info!("Stale file cleanup disabled");
    }

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Build the shared state: storage root, session registry and the preview pipeline.
pub async fn build_state(
    config: Config,
    formatter: Arc<dyn FormattingAgent>,
) -> Result<Arc<AppState>> {
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(config.upload_folder.clone())
            .await
            .with_context(|| {
                format!(
                    "Failed to prepare upload folder {}",
                    config.upload_folder.display()
                )
            })?,
    );
    tracing::info!(root = %storage.root().display(), "Local storage ready");

    let assembler = PreviewAssembler::new(storage.clone(), StyleMap::default());
    let validator = DocumentValidator::new(
        config.max_content_length_bytes,
        config.allowed_extensions.clone(),
    );
    let sessions = SessionRegistry::new(config.session_lifetime());

    Ok(Arc::new(AppState {
        config,
        storage,
        sessions,
        assembler,
        validator,
        formatter,
    }))
}
