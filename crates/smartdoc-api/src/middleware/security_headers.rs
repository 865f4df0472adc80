use axum::http::{header, HeaderValue};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Origins the preview page loads fonts and stylesheets from
const ASSET_CDN: &str = "https://cdnjs.cloudflare.com";

/// Security headers configuration
#[derive(Clone)]
pub struct SecurityHeadersConfig {
    pub is_production: bool,
    csp: Option<HeaderValue>,
}

impl SecurityHeadersConfig {
    pub fn new(is_production: bool) -> Self {
        Self {
            is_production,
            csp: HeaderValue::from_str(&build_csp()).ok(),
        }
    }
}

/// Content-Security-Policy for the preview page. Must allow inline styles: sanitized
/// previews keep `style` attributes.
fn build_csp() -> String {
    [
        "default-src 'self'".to_string(),
        "script-src 'self' 'unsafe-inline' 'unsafe-eval'".to_string(),
        format!("style-src 'self' 'unsafe-inline' {}", ASSET_CDN),
        format!("font-src 'self' {}", ASSET_CDN),
        "img-src 'self' data:".to_string(),
        "connect-src 'self'".to_string(),
    ]
    .join("; ")
}

/// Adds the security headers to every response.
pub async fn security_headers_middleware(
    State(config): State<Arc<SecurityHeadersConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    // The frontend embeds previews from the same origin
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));

    if config.is_production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    if let Some(csp) = &config.csp {
        headers.insert(header::CONTENT_SECURITY_POLICY, csp.clone());
    }

    // Previews are per-session
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store, private"));

    response
}
