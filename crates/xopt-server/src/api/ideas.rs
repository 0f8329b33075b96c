//! Post idea handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use xopt_core::{IdeaFilter, IdeaStatus, PostCategory, PostIdea};

use crate::middleware::RequestId;

use super::clients::double_option;
use super::{
    map_db_error, non_blank, not_found, parse_key, parse_optional_key, resolve_client, respond,
    validation_error, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct IdeasQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateIdeaRequest {
    pub category: String,
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Keyword the idea was written from; marked used on save.
    pub keyword_id: Option<Uuid>,
}

#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateIdeaRequest {
    pub category: Option<String>,
    #[serde(default, with = "double_option")]
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    #[serde(default, with = "double_option")]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "double_option")]
    pub posted_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "double_option")]
    pub post_id: Option<Option<String>>,
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    xopt_core::parse_tags(&tags.join(","))
}

fn validate_content(request_id: &str, content: &str) -> Result<(), ApiError> {
    if content.trim().is_empty() {
        return Err(validation_error(request_id, "content must not be empty"));
    }
    Ok(())
}

fn build_filter(request_id: &str, query: &IdeasQuery) -> Result<IdeaFilter, ApiError> {
    Ok(IdeaFilter {
        search: non_blank(query.q.as_deref()).map(ToOwned::to_owned),
        category: parse_optional_key(request_id, "category", query.category.as_deref())?,
        status: parse_optional_key(request_id, "status", query.status.as_deref())?,
    })
}

async fn resolve_idea(
    pool: &sqlx::PgPool,
    id: Uuid,
    request_id: &str,
) -> Result<PostIdea, ApiError> {
    xopt_db::get_post_idea(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .ok_or_else(|| not_found(request_id, "idea", id))
}

pub(super) async fn list_ideas(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Query(query): Query<IdeasQuery>,
) -> Result<Json<ApiResponse<Vec<PostIdea>>>, ApiError> {
    let rid = &req_id.0;
    let filter = build_filter(rid, &query)?;
    resolve_client(&state.pool, id, rid).await?;
    let ideas = xopt_db::list_post_ideas(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(req_id, filter.apply(ideas)))
}

pub(super) async fn get_idea(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<ApiResponse<PostIdea>>, ApiError> {
    let idea = resolve_idea(&state.pool, idea_id, &req_id.0).await?;
    Ok(respond(req_id, idea))
}

pub(super) async fn create_idea(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostIdea>>), ApiError> {
    let rid = &req_id.0;
    let category: PostCategory = parse_key(rid, "category", &body.category)?;
    let status: IdeaStatus =
        parse_optional_key(rid, "status", body.status.as_deref())?.unwrap_or(IdeaStatus::Draft);
    validate_content(rid, &body.content)?;
    resolve_client(&state.pool, id, rid).await?;

    let tags = clean_tags(&body.tags);
    let new_idea = xopt_db::NewPostIdea {
        client_id: id,
        category,
        title: non_blank(body.title.as_deref()),
        content: &body.content,
        tags: &tags,
        status,
        scheduled_at: body.scheduled_at,
    };

    let idea = match body.keyword_id {
        Some(keyword_id) => {
            let (idea, keyword) =
                xopt_db::create_post_idea_from_keyword(&state.pool, &new_idea, keyword_id)
                    .await
                    .map_err(|e| match e {
                        xopt_db::DbError::NotFound => not_found(rid, "keyword", keyword_id),
                        other => map_db_error(rid.clone(), &other),
                    })?;
            tracing::info!(
                keyword_id = %keyword.id,
                used_count = keyword.used_count,
                "keyword marked used"
            );
            idea
        }
        None => xopt_db::create_post_idea(&state.pool, &new_idea)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?,
    };

    Ok((StatusCode::CREATED, respond(req_id, idea)))
}

pub(super) async fn update_idea(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(idea_id): Path<Uuid>,
    Json(body): Json<UpdateIdeaRequest>,
) -> Result<Json<ApiResponse<PostIdea>>, ApiError> {
    let rid = &req_id.0;
    let category: Option<PostCategory> =
        parse_optional_key(rid, "category", body.category.as_deref())?;
    let status: Option<IdeaStatus> = parse_optional_key(rid, "status", body.status.as_deref())?;
    if let Some(ref content) = body.content {
        validate_content(rid, content)?;
    }
    let tags = body.tags.as_deref().map(clean_tags);

    let update = xopt_db::PostIdeaUpdate {
        category,
        title: body.title.as_ref().map(|t| non_blank(t.as_deref())),
        content: body.content.as_deref(),
        tags: tags.as_deref(),
        status,
        scheduled_at: body.scheduled_at,
        posted_at: body.posted_at,
        post_id: body.post_id.as_ref().map(|p| non_blank(p.as_deref())),
    };

    let idea = xopt_db::update_post_idea(&state.pool, idea_id, &update)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "idea", idea_id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, idea))
}

pub(super) async fn delete_idea(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(idea_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = xopt_db::delete_post_idea(&state.pool, idea_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(not_found(rid, "idea", idea_id));
    }
    Ok(respond(req_id, serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_blank_ones_dropped() {
        let tags = vec![" 朝活 ".to_string(), String::new(), "副業".to_string()];
        assert_eq!(clean_tags(&tags), vec!["朝活".to_string(), "副業".to_string()]);
    }

    #[test]
    fn filter_rejects_unknown_status() {
        let query = IdeasQuery {
            q: None,
            category: None,
            status: Some("archived".to_string()),
        };
        let err = build_filter("req-1", &query).unwrap_err();
        assert_eq!(err.error.code, "validation_error");
    }

    #[test]
    fn filter_ignores_blank_search() {
        let query = IdeasQuery {
            q: Some("  ".to_string()),
            category: Some("useful".to_string()),
            status: None,
        };
        let filter = build_filter("req-1", &query).expect("valid");
        assert_eq!(filter.search, None);
        assert_eq!(filter.category, Some(PostCategory::Useful));
    }
}
