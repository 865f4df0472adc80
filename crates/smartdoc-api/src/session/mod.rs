//! Session file registry
//!
//! Server-side session state keyed by the opaque token carried in the session cookie.
//! Each session owns the ordered list of documents uploaded in it. The registry lives
//! in `AppState`; handlers reach it through the [`SessionToken`] the session middleware
//! attaches to every request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use smartdoc_core::{AppError, UploadedFile};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::HttpAppError;

const FILE_NOT_IN_SESSION: &str = "File not found in session";

/// Token of the session the current request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("Session token missing from request; session middleware not applied");
                HttpAppError(AppError::SessionUninitialized)
            })
    }
}

#[derive(Debug)]
struct Session {
    files: Vec<UploadedFile>,
    last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            files: Vec::new(),
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, lifetime: Duration) -> bool {
        self.last_seen.elapsed() > lifetime
    }
}

/// In-memory registry of sessions and their uploaded files.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    lifetime: Duration,
}

impl SessionRegistry {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            lifetime,
        }
    }

    /// Resume the session named by `token`, or start a new one with an empty file list.
    ///
    /// Unknown and expired tokens are never adopted; a fresh token is minted instead.
    /// Returns the token of the live session.
    pub async fn start_or_resume(&self, token: Option<&str>) -> String {
        let mut sessions = self.sessions.write().await;

        if let Some(token) = token {
            match sessions.get_mut(token) {
                Some(session) if !session.is_expired(self.lifetime) => {
                    session.last_seen = Instant::now();
                    return token.to_string();
                }
                Some(_) => {
                    sessions.remove(token);
                    tracing::debug!("Expired session replaced");
                }
                None => {}
            }
        }

        let token = Uuid::new_v4().simple().to_string();
        sessions.insert(token.clone(), Session::new());
        tracing::debug!(active_sessions = sessions.len(), "Session started");
        token
    }

    /// Find a file by id in the session's list.
    ///
    /// `SessionUninitialized` when the session has no file list at all, `NotFound` when
    /// the id is malformed or not part of this session.
    pub async fn lookup(&self, token: &str, file_id: &str) -> Result<UploadedFile, AppError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token).ok_or(AppError::SessionUninitialized)?;

        let id = Uuid::parse_str(file_id)
            .map_err(|_| AppError::NotFound(FILE_NOT_IN_SESSION.to_string()))?;

        session
            .files
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(FILE_NOT_IN_SESSION.to_string()))
    }

    /// Append a record. Records with the same file name are kept side by side.
    pub async fn register(&self, token: &str, file: UploadedFile) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(token)
            .ok_or(AppError::SessionUninitialized)?;
        session.files.push(file);
        Ok(())
    }

    /// Record the processed copy of a file. Returns the updated record.
    pub async fn set_processed(
        &self,
        token: &str,
        file_id: Uuid,
        processed_filename: String,
    ) -> Result<UploadedFile, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(token)
            .ok_or(AppError::SessionUninitialized)?;

        let file = session
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::NotFound(FILE_NOT_IN_SESSION.to_string()))?;
        file.processed_filename = Some(processed_filename);
        Ok(file.clone())
    }

    /// Drop sessions idle past their lifetime. Returns how many were removed.
    pub async fn prune_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.lifetime));
        before - sessions.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_new_session_has_empty_file_list() {
        let registry = registry();
        let token = registry.start_or_resume(None).await;
        let err = registry
            .lookup(&token, &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_token_is_uninitialized() {
        let registry = registry();
        let err = registry
            .lookup("never-issued", &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionUninitialized));

        let err = registry
            .register("never-issued", UploadedFile::new("a.docx"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SessionUninitialized));
    }

    #[tokio::test]
    async fn test_resume_keeps_token_and_files() {
        let registry = registry();
        let token = registry.start_or_resume(None).await;
        let file = UploadedFile::new("a.docx");
        registry.register(&token, file.clone()).await.unwrap();

        let resumed = registry.start_or_resume(Some(&token)).await;
        assert_eq!(resumed, token);
        assert_eq!(
            registry.lookup(&token, &file.id.to_string()).await.unwrap(),
            file
        );
    }

    #[tokio::test]
    async fn test_client_chosen_token_is_not_adopted() {
        let registry = registry();
        let token = registry.start_or_resume(Some("attacker-chosen")).await;
        assert_ne!(token, "attacker-chosen");
    }

    #[tokio::test]
    async fn test_files_are_isolated_per_session() {
        let registry = registry();
        let alice = registry.start_or_resume(None).await;
        let bob = registry.start_or_resume(None).await;
        let file = UploadedFile::new("a.docx");
        registry.register(&alice, file.clone()).await.unwrap();

        let err = registry
            .lookup(&bob, &file.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_does_not_deduplicate_by_name() {
        let registry = registry();
        let token = registry.start_or_resume(None).await;
        let first = UploadedFile::new("same.docx");
        let second = UploadedFile::new("same.docx");
        registry.register(&token, first.clone()).await.unwrap();
        registry.register(&token, second.clone()).await.unwrap();

        assert_eq!(registry.lookup(&token, &first.id.to_string()).await.unwrap(), first);
        assert_eq!(registry.lookup(&token, &second.id.to_string()).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let registry = registry();
        let token = registry.start_or_resume(None).await;
        let err = registry.lookup(&token, "not-a-uuid").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "File not found in session"));
    }

    #[tokio::test]
    async fn test_set_processed_updates_record() {
        let registry = registry();
        let token = registry.start_or_resume(None).await;
        let file = UploadedFile::new("a.docx");
        registry.register(&token, file.clone()).await.unwrap();

        let updated = registry
            .set_processed(&token, file.id, "processed_a.docx".to_string())
            .await
            .unwrap();
        assert!(updated.is_processed());
        assert_eq!(
            registry
                .lookup(&token, &file.id.to_string())
                .await
                .unwrap()
                .effective_filename(),
            "processed_a.docx"
        );
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned_and_not_resumed() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let token = registry.start_or_resume(None).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_ne!(registry.start_or_resume(Some(&token)).await, token);

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(registry.prune_expired().await, 1);
        assert_eq!(registry.active_sessions().await, 0);
    }
}
