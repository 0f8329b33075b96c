use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

const ANONYMOUS_CALLER: &str = "";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// API key auth settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("key_count", &self.api_keys.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Builds auth config from `XOPT_API_KEYS` (comma-separated bearer tokens).
    ///
    /// In development, empty/missing keys disable auth for local iteration.
    /// In non-development envs, empty/missing keys fail startup.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("XOPT_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        keys.sort();
        keys.dedup();

        if keys.is_empty() {
            if is_development {
                tracing::warn!(
                    "XOPT_API_KEYS not set; bearer auth disabled in development environment"
                );
                return Ok(Self::disabled());
            }

            anyhow::bail!(
                "XOPT_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            api_keys: Arc::new(keys),
            enabled: true,
        })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(Vec::new()),
            enabled: false,
        }
    }

    /// Compares against every key without short-circuiting.
    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(subtle::Choice::from(0), |acc, key| {
                acc | key.as_bytes().ct_eq(token.as_bytes())
            })
            .into()
    }

    /// The rate-limit key for a presented token.
    ///
    /// Only tokens that pass auth get their own window; unknown tokens and
    /// all callers while auth is disabled share the anonymous window.
    fn caller_key<'a>(&self, token: Option<&'a str>) -> &'a str {
        match token {
            Some(token) if self.enabled && self.allows(token) => token,
            _ => ANONYMOUS_CALLER,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter for the protected routes, one window per caller.
///
/// Callers holding a configured bearer token are counted separately; every
/// other request shares a single anonymous window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    windows: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `caller`; `false` once the window is spent.
    async fn admit(&self, caller: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().await;
        // Expired windows are dropped so the map stays bounded by active callers.
        windows.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = windows
            .entry(caller.to_owned())
            .or_insert(RateLimitWindow {
                started_at: now,
                count: 0,
            });
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
    meta: MiddlewareMeta,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct MiddlewareMeta {
    request_id: Option<String>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

fn reject(req: &Request, status: StatusCode, code: &'static str, message: &'static str) -> Response {
    let request_id = req.extensions().get::<RequestId>().map(|id| id.0.clone());
    (
        status,
        Json(MiddlewareErrorBody {
            error: MiddlewareError { code, message },
            meta: MiddlewareMeta {
                request_id,
                timestamp: chrono::Utc::now(),
            },
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => reject(
            &req,
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Middleware enforcing the per-caller request limit.
pub async fn enforce_rate_limit(
    State((rate_limit, auth)): State<(RateLimitState, AuthState)>,
    req: Request,
    next: Next,
) -> Response {
    let caller = auth
        .caller_key(extract_bearer_token(req.headers().get(AUTHORIZATION)))
        .to_owned();

    if !rate_limit.admit(&caller, Instant::now()).await {
        tracing::warn!(
            anonymous = caller == ANONYMOUS_CALLER,
            max_requests = rate_limit.max_requests,
            "rate limit exceeded"
        );
        return reject(
            &req,
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded; retry after the current window",
        );
    }

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
        assert_eq!(extract_bearer_token(None), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_keys("", true).expect("dev should allow missing keys");
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_keys(" , ", false).is_err());
    }

    #[test]
    fn auth_state_matches_any_configured_key() {
        let state = AuthState::from_keys("alpha, beta", false).expect("keys");
        assert!(state.enabled);
        assert!(state.allows("alpha"));
        assert!(state.allows("beta"));
        assert!(!state.allows("gamma"));
        assert!(!state.allows("alph"));
        assert!(!state.allows(""));
    }

    #[test]
    fn auth_state_debug_hides_keys() {
        let state = AuthState::from_keys("secret-token", false).expect("keys");
        let rendered = format!("{state:?}");
        assert!(!rendered.contains("secret-token"));
    }

    #[tokio::test]
    async fn rate_limit_counts_each_caller_separately() {
        let limit = RateLimitState::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limit.admit("alpha", now).await);
        assert!(limit.admit("alpha", now).await);
        assert!(!limit.admit("alpha", now).await);
        assert!(limit.admit("beta", now).await);
        assert!(limit.admit(ANONYMOUS_CALLER, now).await);
    }

    #[tokio::test]
    async fn rate_limit_window_resets_after_expiry() {
        let limit = RateLimitState::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limit.admit("alpha", start).await);
        assert!(!limit.admit("alpha", start + Duration::from_secs(59)).await);
        assert!(limit.admit("alpha", start + Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn unknown_tokens_share_the_anonymous_window() {
        let auth = AuthState::from_keys("alpha", false).expect("keys");
        let limit = RateLimitState::new(2, Duration::from_secs(60));
        let now = Instant::now();
        let mut admitted = 0;
        for i in 0..50 {
            let token = format!("made-up-{i}");
            if limit.admit(auth.caller_key(Some(token.as_str())), now).await {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 2);
        assert_eq!(limit.windows.lock().await.len(), 1);
        assert!(limit.admit(auth.caller_key(Some("alpha")), now).await);
    }

    #[test]
    fn caller_key_ignores_tokens_while_auth_is_disabled() {
        let auth = AuthState::disabled();
        assert_eq!(auth.caller_key(Some("anything")), ANONYMOUS_CALLER);
        assert_eq!(auth.caller_key(None), ANONYMOUS_CALLER);

        let auth = AuthState::from_keys("alpha", false).expect("keys");
        assert_eq!(auth.caller_key(Some("alpha")), "alpha");
        assert_eq!(auth.caller_key(Some("beta")), ANONYMOUS_CALLER);
    }

    #[tokio::test]
    async fn expired_windows_are_dropped() {
        let limit = RateLimitState::new(5, Duration::from_secs(1));
        let start = Instant::now();
        assert!(limit.admit("alpha", start).await);
        assert!(limit.admit("beta", start + Duration::from_secs(2)).await);
        assert_eq!(limit.windows.lock().await.len(), 1);
    }
}
