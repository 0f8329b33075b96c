//! Daily log handlers. Every row is returned with its two ratings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xopt_core::{DailyCounters, DailyLogRecord, PostCategory, YearMonth};

use crate::middleware::RequestId;

use super::{
    map_db_error, non_blank, not_found, parse_month, parse_optional_key, resolve_client, respond,
    validation_error, ApiError, ApiResponse, AppState, RatingPair,
};

#[derive(Debug, Deserialize)]
pub(super) struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LogRequest {
    pub post_idea_id: Option<Uuid>,
    pub log_date: NaiveDate,
    pub post_type: Option<String>,
    pub content: Option<String>,
    #[serde(flatten)]
    pub counters: DailyCounters,
    pub tweet_url: Option<String>,
    pub analytics_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LogItem {
    #[serde(flatten)]
    pub record: DailyLogRecord,
    pub ratings: RatingPair,
}

impl From<DailyLogRecord> for LogItem {
    fn from(record: DailyLogRecord) -> Self {
        let ratings = RatingPair::from_rates(record.profile_click_rate, record.follow_rate);
        Self { record, ratings }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LogList {
    pub month: YearMonth,
    pub logs: Vec<LogItem>,
}

fn validate_log(request_id: &str, body: &LogRequest) -> Result<Option<PostCategory>, ApiError> {
    body.counters
        .validate()
        .map_err(|e| validation_error(request_id, e.to_string()))?;
    parse_optional_key(request_id, "post_type", body.post_type.as_deref())
}

/// A linked idea must belong to the same client as the log.
async fn check_linked_idea(
    pool: &sqlx::PgPool,
    client_id: Uuid,
    post_idea_id: Option<Uuid>,
    request_id: &str,
) -> Result<(), ApiError> {
    let Some(idea_id) = post_idea_id else {
        return Ok(());
    };
    let idea = xopt_db::get_post_idea(pool, idea_id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?;
    match idea {
        Some(idea) if idea.client_id == client_id => Ok(()),
        _ => Err(validation_error(
            request_id,
            format!("post_idea_id '{idea_id}' is not an idea of this client"),
        )),
    }
}

fn new_log(body: &LogRequest, post_type: Option<PostCategory>) -> xopt_db::NewDailyLog<'_> {
    xopt_db::NewDailyLog {
        post_idea_id: body.post_idea_id,
        log_date: body.log_date,
        post_type,
        content: non_blank(body.content.as_deref()),
        counters: body.counters,
        tweet_url: non_blank(body.tweet_url.as_deref()),
        analytics_url: non_blank(body.analytics_url.as_deref()),
    }
}

pub(super) async fn list_logs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<LogList>>, ApiError> {
    let rid = &req_id.0;
    let month = parse_month(rid, query.month.as_deref())?;
    resolve_client(&state.pool, id, rid).await?;
    let records =
        xopt_db::list_daily_logs_for_month(&state.pool, id, month, xopt_db::LogOrder::LogDate)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(
        req_id,
        LogList {
            month,
            logs: records.into_iter().map(LogItem::from).collect(),
        },
    ))
}

pub(super) async fn create_log(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<LogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LogItem>>), ApiError> {
    let rid = &req_id.0;
    let post_type = validate_log(rid, &body)?;
    resolve_client(&state.pool, id, rid).await?;
    check_linked_idea(&state.pool, id, body.post_idea_id, rid).await?;
    let record = xopt_db::create_daily_log(&state.pool, id, &new_log(&body, post_type))
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(client_id = %id, log_id = %record.id, log_date = %record.log_date, "daily log recorded");
    Ok((StatusCode::CREATED, respond(req_id, LogItem::from(record))))
}

/// Replaces every field of a log; rates are recomputed.
pub(super) async fn update_log(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(log_id): Path<Uuid>,
    Json(body): Json<LogRequest>,
) -> Result<Json<ApiResponse<LogItem>>, ApiError> {
    let rid = &req_id.0;
    let post_type = validate_log(rid, &body)?;
    let existing = xopt_db::get_daily_log(&state.pool, log_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| not_found(rid, "log", log_id))?;
    check_linked_idea(&state.pool, existing.client_id, body.post_idea_id, rid).await?;
    let record = xopt_db::update_daily_log(&state.pool, log_id, &new_log(&body, post_type))
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "log", log_id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, LogItem::from(record)))
}

pub(super) async fn delete_log(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(log_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = xopt_db::delete_daily_log(&state.pool, log_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(not_found(rid, "log", log_id));
    }
    Ok(respond(req_id, serde_json::json!({ "deleted": true })))
}
