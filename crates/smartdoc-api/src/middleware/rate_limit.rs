use crate::error::HttpAppError;
use crate::utils::ip_extraction::extract_client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use smartdoc_core::AppError;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone)]
struct RateLimitBucket {
    count: u32,
    reset_at: Instant,
}

impl RateLimitBucket {
    fn new(window: Duration) -> Self {
        Self {
            count: 0,
            reset_at: Instant::now() + window,
        }
    }

    fn check_and_increment(&mut self, limit: u32, window: Duration) -> (bool, u32) {
        let now = Instant::now();

        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + window;
        }

        if self.count < limit {
            self.count += 1;
            (true, limit.saturating_sub(self.count))
        } else {
            (false, 0)
        }
    }

    fn reset_in(&self) -> Duration {
        self.reset_at.saturating_duration_since(Instant::now())
    }
}

/// Fixed-window per-client rate limiter
///
/// Buckets are spread over several shards, each behind its own mutex, so concurrent
/// clients rarely contend on the same lock.
#[derive(Clone)]
pub struct HttpRateLimiter {
    shards: Vec<Arc<Mutex<HashMap<String, RateLimitBucket>>>>,
    limit_per_minute: u32,
    window: Duration,
    max_buckets: usize,
    trusted_proxy_count: usize,
}

impl HttpRateLimiter {
    /// Create a new rate limiter with the default shard count (16 shards)
    pub fn new(limit_per_minute: u32) -> Self {
        Self::with_shards(limit_per_minute, 16)
    }

    pub fn with_shards(limit_per_minute: u32, shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Arc::new(Mutex::new(HashMap::new())))
            .collect();
        Self {
            shards,
            limit_per_minute,
            window: Duration::from_secs(60),
            max_buckets: 10_000,
            trusted_proxy_count: 1,
        }
    }

    /// Number of reverse proxies whose `X-Forwarded-For` entries are trusted
    pub fn with_trusted_proxies(mut self, count: usize) -> Self {
        self.trusted_proxy_count = count;
        self
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }

    fn shard_for(&self, key: &str) -> &Arc<Mutex<HashMap<String, RateLimitBucket>>> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Count one request for `key`. `Ok(remaining)` when allowed, `Err(reset_in)` otherwise.
    pub async fn check_rate_limit(&self, key: &str) -> Result<u32, Duration> {
        let mut buckets = self.shard_for(key).lock().await;

        if buckets.len() >= self.max_buckets {
            let now = Instant::now();
            buckets.retain(|_, bucket| bucket.reset_at > now);

            if buckets.len() >= self.max_buckets {
                let oldest = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.reset_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    buckets.remove(&oldest);
                    tracing::debug!(
                        remaining_buckets = buckets.len(),
                        "Evicted oldest rate limit bucket due to capacity limit"
                    );
                }
            }
        }

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::new(self.window));

        let (allowed, remaining) = bucket.check_and_increment(self.limit_per_minute, self.window);
        if allowed {
            Ok(remaining)
        } else {
            Err(bucket.reset_in())
        }
    }

    /// Remove buckets whose window ended more than one window ago
    pub async fn cleanup_expired_buckets(&self) -> usize {
        let now = Instant::now();
        let mut total_cleaned = 0;

        for shard in &self.shards {
            let mut buckets = shard.lock().await;
            let before = buckets.len();
            buckets.retain(|_, bucket| {
                bucket.reset_at > now || now.duration_since(bucket.reset_at) < self.window
            });
            total_cleaned += before - buckets.len();
        }

        if total_cleaned > 0 {
            tracing::debug!(
                buckets_cleaned = total_cleaned,
                "Cleaned up expired rate limit buckets"
            );
        }
        total_cleaned
    }

    /// Periodically drop stale buckets
    pub fn start_cleanup(self: Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.cleanup_expired_buckets().await;
            }
        })
    }
}

fn insert_header(response: &mut Response, name: &'static str, value: u64) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        response.headers_mut().insert(name, header_value);
    }
}

/// HTTP rate limiting middleware
///
/// Keys requests by client IP and adds `X-RateLimit-Limit` / `X-RateLimit-Remaining`
/// to every response. Over the limit, answers `429 Too Many Requests` in the error
/// envelope with `Retry-After`.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<HttpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        rate_limiter.trusted_proxy_count,
    );
    let key = format!("ip:{}", ip);
    let limit = rate_limiter.limit_per_minute;

    match rate_limiter.check_rate_limit(&key).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            insert_header(&mut response, "X-RateLimit-Limit", limit.into());
            insert_header(&mut response, "X-RateLimit-Remaining", remaining.into());
            response
        }
        Err(reset_in) => {
            tracing::warn!(
                client = %key,
                path = %request.uri().path(),
                limit,
                "Rate limit exceeded"
            );

            let mut response = HttpAppError(AppError::RateLimited {
                retry_after_secs: reset_in.as_secs().max(1),
            })
            .into_response();
            insert_header(&mut response, "X-RateLimit-Limit", limit.into());
            insert_header(&mut response, "X-RateLimit-Remaining", 0);
            response
        }
    }
}
