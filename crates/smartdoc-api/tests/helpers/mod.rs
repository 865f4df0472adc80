//! Test helpers: build AppState and router for integration tests.
//!
//! Every test app gets its own temporary upload folder.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use smartdoc_api::constants;
use smartdoc_api::services::{FormattingAgent, FormattingOutcome, UnconfiguredFormattingAgent};
use smartdoc_api::setup::{self, routes};
use smartdoc_api::state::AppState;
use smartdoc_core::{AppError, Config};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const SESSION_COOKIE: &str = "smartdoc_session";

/// API path with the `/api` prefix.
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, shared state and the owned upload folder.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Upload `data` as `filename` in a new session. Returns the response and the
    /// `Cookie` header value that resumes that session.
    pub async fn upload(&self, filename: &str, data: Vec<u8>) -> (TestResponse, String) {
        let response = upload_with_cookie(&self.server, None, filename, data).await;
        let cookie = session_cookie(&response);
        (response, cookie)
    }
}

pub fn test_config(upload_folder: &Path) -> Config {
    Config {
        upload_folder: upload_folder.to_path_buf(),
        session_cookie_name: SESSION_COOKIE.to_string(),
        cleanup_interval_secs: 0,
        http_rate_limit_per_minute: 10_000,
        ..Config::default()
    }
}

/// Agent that "formats" by copying the source document unchanged.
pub struct CopyingFormattingAgent;

#[async_trait]
impl FormattingAgent for CopyingFormattingAgent {
    async fn format(
        &self,
        source: &Path,
        destination: &Path,
        instructions: &str,
    ) -> Result<FormattingOutcome, AppError> {
        tokio::fs::copy(source, destination).await?;
        Ok(FormattingOutcome {
            message: format!("Applied: {}", instructions),
        })
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Arc::new(UnconfiguredFormattingAgent), |config| config).await
}

pub async fn setup_test_app_with(
    formatter: Arc<dyn FormattingAgent>,
    configure: impl FnOnce(Config) -> Config,
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = configure(test_config(temp_dir.path()));

    let state = setup::build_state(config.clone(), formatter)
        .await
        .expect("Failed to build state");
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// API routes mounted without the session middleware.
pub async fn setup_app_without_sessions() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(temp_dir.path());
    let state = setup::build_state(config, Arc::new(UnconfiguredFormattingAgent))
        .await
        .expect("Failed to build state");

    let app = axum::Router::new()
        .nest(constants::API_PREFIX, routes::api_router())
        .with_state(state.clone());
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

pub async fn upload_with_cookie(
    client: &TestServer,
    cookie: Option<&str>,
    filename: &str,
    data: Vec<u8>,
) -> TestResponse {
    let part = Part::bytes(data)
        .file_name(filename.to_string())
        .mime_type(constants::DOCX_CONTENT_TYPE);
    let form = MultipartForm::new().add_part("file", part);

    let mut request = client.post(&api_path("/upload"));
    if let Some(cookie) = cookie {
        request = request.add_header("Cookie", cookie.to_string());
    }
    request.multipart(form).await
}

/// `name=token` pair from the response's session `Set-Cookie` header.
pub fn session_cookie(response: &TestResponse) -> String {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", SESSION_COOKIE)))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
        .expect("response should set the session cookie")
}

/// `file_id` from a successful upload response.
pub fn file_id(response: &TestResponse) -> String {
    let body: serde_json::Value = response.json();
    body["file_id"]
        .as_str()
        .expect("upload response should carry file_id")
        .to_string()
}
