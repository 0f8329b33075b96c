//! Keyword suggestion handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use xopt_core::{KeywordCategory, KeywordStatus, KeywordSuggestion};

use crate::middleware::RequestId;

use super::{
    map_db_error, non_blank, not_found, parse_key, parse_optional_key, resolve_client, respond,
    validation_error, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct KeywordsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeywordInput {
    pub theme: String,
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub hooks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateKeywordsRequest {
    pub keywords: Vec<KeywordInput>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateKeywordRequest {
    pub status: String,
}

#[derive(Debug)]
struct ValidKeyword {
    theme: String,
    description: Option<String>,
    category: KeywordCategory,
    hooks: Vec<String>,
}

fn validate_keywords(
    request_id: &str,
    inputs: &[KeywordInput],
) -> Result<Vec<ValidKeyword>, ApiError> {
    if inputs.is_empty() {
        return Err(validation_error(request_id, "keywords must not be empty"));
    }
    inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            let theme = non_blank(Some(input.theme.as_str())).ok_or_else(|| {
                validation_error(request_id, format!("keywords[{idx}].theme must not be empty"))
            })?;
            Ok(ValidKeyword {
                theme: theme.to_owned(),
                description: non_blank(input.description.as_deref()).map(ToOwned::to_owned),
                category: parse_key(request_id, &format!("keywords[{idx}].category"), &input.category)?,
                hooks: input
                    .hooks
                    .iter()
                    .filter_map(|h| non_blank(Some(h.as_str())))
                    .map(ToOwned::to_owned)
                    .collect(),
            })
        })
        .collect()
}

pub(super) async fn list_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<KeywordsQuery>,
) -> Result<Json<ApiResponse<Vec<KeywordSuggestion>>>, ApiError> {
    let rid = &req_id.0;
    let status: Option<KeywordStatus> =
        parse_optional_key(rid, "status", query.status.as_deref())?;
    resolve_client(&state.pool, id, rid).await?;
    let keywords = xopt_db::list_keywords(&state.pool, id, status)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(req_id, keywords))
}

/// Saves a batch of keywords (typically a generated set) in one transaction.
pub(super) async fn create_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateKeywordsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<KeywordSuggestion>>>), ApiError> {
    let rid = &req_id.0;
    let valid = validate_keywords(rid, &body.keywords)?;
    resolve_client(&state.pool, id, rid).await?;

    let new: Vec<xopt_db::NewKeyword<'_>> = valid
        .iter()
        .map(|k| xopt_db::NewKeyword {
            theme: &k.theme,
            description: k.description.as_deref(),
            category: k.category,
            hooks: &k.hooks,
        })
        .collect();
    let saved = xopt_db::create_keywords(&state.pool, id, &new)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(client_id = %id, count = saved.len(), "keywords saved");
    Ok((StatusCode::CREATED, respond(req_id, saved)))
}

pub(super) async fn use_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kw_id): Path<Uuid>,
) -> Result<Json<ApiResponse<KeywordSuggestion>>, ApiError> {
    let rid = &req_id.0;
    let keyword = xopt_db::mark_keyword_used(&state.pool, kw_id)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "keyword", kw_id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, keyword))
}

/// Archives a keyword or restores it to `unused`.
pub(super) async fn update_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kw_id): Path<Uuid>,
    Json(body): Json<UpdateKeywordRequest>,
) -> Result<Json<ApiResponse<KeywordSuggestion>>, ApiError> {
    let rid = &req_id.0;
    let status: KeywordStatus = parse_key(rid, "status", &body.status)?;
    let keyword = xopt_db::set_keyword_status(&state.pool, kw_id, status)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "keyword", kw_id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, keyword))
}

pub(super) async fn delete_keyword(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(kw_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = xopt_db::delete_keyword(&state.pool, kw_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(not_found(rid, "keyword", kw_id));
    }
    Ok(respond(req_id, serde_json::json!({ "deleted": true })))
}
