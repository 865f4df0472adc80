use crate::session::{SessionRegistry, SessionToken};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use smartdoc_core::Config;
use std::sync::Arc;

/// Session cookie settings
#[derive(Clone)]
pub struct SessionCookieConfig {
    pub name: String,
    pub max_age_secs: u64,
    pub secure: bool,
}

impl SessionCookieConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.session_cookie_name.clone(),
            max_age_secs: config.session_lifetime_secs,
            secure: config.session_cookie_secure,
        }
    }

    fn set_cookie_value(&self, token: &str) -> String {
        let secure_flag = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax; HttpOnly{}",
            self.name, token, self.max_age_secs, secure_flag
        )
    }
}

#[derive(Clone)]
pub struct SessionLayerState {
    pub registry: SessionRegistry,
    pub cookie: SessionCookieConfig,
}

/// Value of the cookie `name` from the `Cookie` header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookie_str| cookie_str.split(';'))
        .map(str::trim)
        .find_map(|part| part.strip_prefix(prefix.as_str()))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Session middleware
///
/// Resumes the session named by the session cookie or starts one with an empty file
/// list, exposes its token to handlers as a [`SessionToken`] extension, and refreshes
/// the cookie on every response so the idle lifetime slides.
pub async fn session_middleware(
    State(state): State<Arc<SessionLayerState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = cookie_value(request.headers(), &state.cookie.name);
    let token = state.registry.start_or_resume(presented.as_deref()).await;

    request
        .extensions_mut()
        .insert(SessionToken(token.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&state.cookie.set_cookie_value(&token)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_finds_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; smartdoc_session=abc123; other=1"),
        );
        assert_eq!(
            cookie_value(&headers, "smartdoc_session"),
            Some("abc123".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_cookie_value_ignores_prefix_collisions() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("xsmartdoc_session=nope; smartdoc_session="),
        );
        assert_eq!(cookie_value(&headers, "smartdoc_session"), None);
    }

    #[test]
    fn test_set_cookie_flags() {
        let cookie = SessionCookieConfig {
            name: "smartdoc_session".to_string(),
            max_age_secs: 3600,
            secure: true,
        };
        assert_eq!(
            cookie.set_cookie_value("tok"),
            "smartdoc_session=tok; Path=/; Max-Age=3600; SameSite=Lax; HttpOnly; Secure"
        );
    }
}
