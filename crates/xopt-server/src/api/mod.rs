mod analytics;
mod clients;
mod generate;
mod ideas;
mod keywords;
mod library;
mod logs;
mod profile;
mod strategy;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;
use xopt_core::{Client, CoreError, Rating, YearMonth};
use xopt_db::DbError;
use xopt_generate::{GenerateError, GeneratorClient};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// `None` when no API key is configured.
    pub generator: Option<Arc<GeneratorClient>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    generator: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "generator_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            "generator_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Wraps `data` in the success envelope.
pub(super) fn respond<T: Serialize>(req_id: RequestId, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) fn validation_error(request_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(request_id, "validation_error", message)
}

pub(super) fn not_found(request_id: &str, what: &str, id: Uuid) -> ApiError {
    ApiError::new(request_id, "not_found", format!("{what} '{id}' not found"))
}

pub(super) fn map_db_error(request_id: String, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        DbError::Validation(message) => ApiError::new(request_id, "validation_error", message),
        e if e.is_unique_violation() => {
            ApiError::new(request_id, "conflict", "a record with those values already exists")
        }
        e if e.is_foreign_key_violation() => ApiError::new(
            request_id,
            "validation_error",
            "referenced record does not exist",
        ),
        e => {
            tracing::error!(error = %e, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

pub(super) fn map_generate_error(request_id: String, error: &GenerateError) -> ApiError {
    match error {
        GenerateError::NotConfigured => ApiError::new(
            request_id,
            "generator_unavailable",
            "text generation is not configured",
        ),
        e => {
            tracing::warn!(error = %e, "generation failed");
            ApiError::new(request_id, "generator_error", e.to_string())
        }
    }
}

/// Parses a stored enum key, reporting the field name on failure.
pub(super) fn parse_key<T>(request_id: &str, field: &str, value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = CoreError>,
{
    value
        .trim()
        .parse()
        .map_err(|e: CoreError| validation_error(request_id, format!("{field}: {e}")))
}

pub(super) fn parse_optional_key<T>(
    request_id: &str,
    field: &str,
    value: Option<&str>,
) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = CoreError>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_key(request_id, field, v).map(Some),
    }
}

/// `YYYY-MM`, defaulting to the current month.
pub(super) fn parse_month(request_id: &str, value: Option<&str>) -> Result<YearMonth, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(YearMonth::current()),
        Some(v) => v
            .parse()
            .map_err(|e: CoreError| validation_error(request_id, e.to_string())),
    }
}

/// Trims `value` and enforces a length of 1–200 characters.
pub(super) fn validate_name(request_id: &str, field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > 200 {
        return Err(validation_error(
            request_id,
            format!("{field} must be 1–200 characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Blank strings count as absent.
pub(super) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve a client id, returning 404 if it does not exist.
pub(super) async fn resolve_client(
    pool: &PgPool,
    id: Uuid,
    request_id: &str,
) -> Result<Client, ApiError> {
    xopt_db::get_client(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .ok_or_else(|| not_found(request_id, "client", id))
}

/// A rate with its five-step rating.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub(super) struct RatedValue {
    pub rate: f64,
    pub rating: Rating,
    pub symbol: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub(super) struct RatingPair {
    pub profile_click: RatedValue,
    pub follow: RatedValue,
}

impl RatingPair {
    pub(super) fn from_rates(profile_click_rate: f64, follow_rate: f64) -> Self {
        let rated = |rate: f64, rating: Rating| RatedValue {
            rate,
            rating,
            symbol: rating.symbol(),
        };
        Self {
            profile_click: rated(
                profile_click_rate,
                xopt_core::profile_click_rating(profile_click_rate),
            ),
            follow: rated(follow_rate, xopt_core::follow_rate_rating(follow_rate)),
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/api/v1/clients/{id}",
            get(clients::get_client)
                .patch(clients::update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/api/v1/clients/{id}/profile",
            get(profile::get_profile).put(profile::put_profile),
        )
        .route(
            "/api/v1/clients/{id}/strategy",
            get(strategy::get_strategy).put(strategy::put_strategy),
        )
        .route("/api/v1/strategy/sections", get(strategy::list_sections))
        .route(
            "/api/v1/clients/{id}/ideas",
            get(ideas::list_ideas).post(ideas::create_idea),
        )
        .route(
            "/api/v1/ideas/{idea_id}",
            get(ideas::get_idea)
                .patch(ideas::update_idea)
                .delete(ideas::delete_idea),
        )
        .route(
            "/api/v1/clients/{id}/keywords",
            get(keywords::list_keywords).post(keywords::create_keywords),
        )
        .route(
            "/api/v1/keywords/{kw_id}",
            patch(keywords::update_keyword).delete(keywords::delete_keyword),
        )
        .route("/api/v1/keywords/{kw_id}/use", post(keywords::use_keyword))
        .route(
            "/api/v1/clients/{id}/logs",
            get(logs::list_logs).post(logs::create_log),
        )
        .route(
            "/api/v1/logs/{log_id}",
            put(logs::update_log).delete(logs::delete_log),
        )
        .route(
            "/api/v1/clients/{id}/analytics",
            get(analytics::monthly_analytics),
        )
        .route(
            "/api/v1/hooks",
            get(library::list_hooks).post(library::create_hook),
        )
        .route(
            "/api/v1/hooks/{id}",
            patch(library::update_hook).delete(library::delete_hook),
        )
        .route("/api/v1/hooks/{id}/use", post(library::use_hook))
        .route(
            "/api/v1/templates",
            get(library::list_templates).post(library::create_template),
        )
        .route(
            "/api/v1/templates/{id}",
            patch(library::update_template).delete(library::delete_template),
        )
        .route("/api/v1/templates/{id}/use", post(library::use_template))
        .route("/api/v1/library/categories", get(library::list_categories))
        .route(
            "/api/v1/clients/{id}/generate/profile",
            post(generate::generate_profile),
        )
        .route(
            "/api/v1/clients/{id}/generate/strategy-section",
            post(generate::generate_strategy_section),
        )
        .route(
            "/api/v1/clients/{id}/generate/keywords",
            post(generate::generate_keywords),
        )
        .route(
            "/api/v1/clients/{id}/generate/post",
            post(generate::generate_post),
        )
        .route(
            "/api/v1/clients/{id}/generate/structured-post",
            post(generate::generate_structured_post),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    (rate_limit, auth.clone()),
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let generator = if state.generator.is_some() {
        "configured"
    } else {
        "disabled"
    };

    match xopt_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                    generator,
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                        generator,
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
