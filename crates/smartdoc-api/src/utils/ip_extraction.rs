//! Client IP extraction for per-client rate limiting.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Best-effort client address: `X-Forwarded-For` (honoring `trusted_proxy_count`),
/// then `X-Real-IP`, then the socket peer. `"unknown"` when none of them yields a
/// valid IP.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> String {
    header_str(headers, "x-forwarded-for")
        .and_then(|chain| from_forwarded_for(chain, trusted_proxy_count))
        .or_else(|| header_str(headers, "x-real-ip").and_then(|ip| parse_ip(ip.trim())))
        .or_else(|| socket_addr.map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

fn parse_ip(s: &str) -> Option<IpAddr> {
    s.parse().ok()
}

/// `client, proxy1, proxy2`: skip the last `trusted_proxy_count` hops. With no trusted
/// proxies, or a chain shorter than expected, only the hop closest to us is used.
fn from_forwarded_for(chain: &str, trusted_proxy_count: usize) -> Option<IpAddr> {
    let hops: Vec<&str> = chain
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let hop = if trusted_proxy_count == 0 || hops.len() <= trusted_proxy_count {
        hops.last()?
    } else {
        hops.get(hops.len() - trusted_proxy_count - 1)?
    };
    parse_ip(hop)
}
