use crate::resolver::PathResolver;
use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    resolver: PathResolver,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the root directory if needed.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for document storage (e.g., "static/uploads")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let canonical = fs::canonicalize(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to canonicalize storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            resolver: PathResolver::new(canonical),
        })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn root(&self) -> &Path {
        self.resolver.root()
    }

    fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        self.resolver.resolve(filename)
    }

    async fn write(&self, filename: &str, data: &[u8]) -> StorageResult<PathBuf> {
        let path = self.resolve(filename)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(path)
    }

    async fn exists(&self, filename: &str) -> StorageResult<bool> {
        let path = self.resolve(filename)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to stat file");
                Err(StorageError::IoError(e))
            }
        }
    }

    async fn delete(&self, filename: &str) -> StorageResult<()> {
        let path = self.resolve(filename)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn purge_older_than(&self, age: Duration) -> StorageResult<usize> {
        let now = SystemTime::now();
        let mut entries = fs::read_dir(self.root()).await?;
        let mut removed = 0usize;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to stat file");
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }

            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let file_age = now.duration_since(modified).unwrap_or_default();
            if file_age <= age {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => {
                    removed += 1;
                    tracing::info!(
                        path = %path.display(),
                        age_secs = file_age.as_secs(),
                        "Deleted stale upload"
                    );
                }
                // Already gone, e.g. removed by a concurrent request.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to delete stale upload");
                }
            }
        }

        Ok(removed)
    }
}
