//! Generation handlers. Results are drafts: nothing here is persisted except
//! the usage counters of the hook and template a structured post was built from.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use xopt_core::{PostCategory, PostHook, PostTemplate, ProfileDesignInput, StrategyContent, StrategySection};
use xopt_generate::{
    Brief, GenerateError, GeneratedPost, GeneratedProfile, GeneratorClient, KeywordIdea,
    PostRequest, StructuredPost, StructuredPostRequest,
};

use crate::middleware::RequestId;

use super::{
    map_db_error, map_generate_error, non_blank, not_found, parse_key, parse_optional_key,
    resolve_client, respond, validation_error, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct SectionRequest {
    pub section: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SectionDraft {
    pub section: StrategySection,
    pub label: &'static str,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PostBody {
    pub theme: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct StructuredPostBody {
    pub theme: Option<String>,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub custom_instructions: Option<String>,
    pub hook_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
}

/// Stored client context, owned so a [`Brief`] can borrow from it.
#[derive(Debug, Default)]
struct ClientContext {
    profile: Option<ProfileDesignInput>,
    strategy: Option<StrategyContent>,
}

impl ClientContext {
    fn brief(&self) -> Brief<'_> {
        Brief {
            profile: self.profile.as_ref(),
            strategy: self.strategy.as_ref(),
        }
    }
}

fn generator(state: &AppState, request_id: &str) -> Result<Arc<GeneratorClient>, ApiError> {
    state
        .generator
        .clone()
        .ok_or_else(|| map_generate_error(request_id.to_owned(), &GenerateError::NotConfigured))
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(ToOwned::to_owned)
}

async fn load_context(pool: &PgPool, id: Uuid, request_id: &str) -> Result<ClientContext, ApiError> {
    resolve_client(pool, id, request_id).await?;
    let profile = xopt_db::get_profile_design(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?;
    let strategy = xopt_db::get_brand_strategy(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?;
    Ok(ClientContext {
        profile: profile.as_ref().map(ProfileDesignInput::from),
        strategy: strategy.map(|s| s.content),
    })
}

fn post_request(
    request_id: &str,
    body: &PostBody,
    existing_ideas: Vec<String>,
) -> Result<PostRequest, ApiError> {
    let category: Option<PostCategory> =
        parse_optional_key(request_id, "category", body.category.as_deref())?;
    Ok(PostRequest {
        theme: owned(body.theme.as_deref()),
        category,
        tone: owned(body.tone.as_deref()),
        existing_ideas,
    })
}

fn structured_request(
    request_id: &str,
    body: &StructuredPostBody,
) -> Result<StructuredPostRequest, ApiError> {
    let category: Option<PostCategory> =
        parse_optional_key(request_id, "category", body.category.as_deref())?;
    Ok(StructuredPostRequest {
        theme: owned(body.theme.as_deref()),
        category,
        tone: owned(body.tone.as_deref()),
        custom_instructions: owned(body.custom_instructions.as_deref()),
    })
}

/// Drafts profile text, header copy and a pinned tweet from the stored
/// design, or from an empty design if none was saved yet.
pub(super) async fn generate_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GeneratedProfile>>, ApiError> {
    let rid = &req_id.0;
    let generator = generator(&state, rid)?;
    let context = load_context(&state.pool, id, rid).await?;
    let design = context.profile.unwrap_or_default();

    let profile = generator
        .generate_profile(&design)
        .await
        .map_err(|e| map_generate_error(rid.clone(), &e))?;
    tracing::info!(client_id = %id, "profile drafted");
    Ok(respond(req_id, profile))
}

pub(super) async fn generate_strategy_section(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<SectionRequest>,
) -> Result<Json<ApiResponse<SectionDraft>>, ApiError> {
    let rid = &req_id.0;
    let section: StrategySection = parse_key(rid, "section", &body.section)?;
    let generator = generator(&state, rid)?;
    let context = load_context(&state.pool, id, rid).await?;

    let content = generator
        .generate_strategy_section(section, context.brief())
        .await
        .map_err(|e| map_generate_error(rid.clone(), &e))?;
    tracing::info!(client_id = %id, section = section.key(), "strategy section drafted");
    Ok(respond(
        req_id,
        SectionDraft {
            section,
            label: section.label(),
            content,
        },
    ))
}

/// Suggests new keyword themes. Requires a saved profile design; themes
/// matching existing idea titles or keywords are dropped.
pub(super) async fn generate_keywords(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<KeywordIdea>>>, ApiError> {
    let rid = &req_id.0;
    let generator = generator(&state, rid)?;
    let context = load_context(&state.pool, id, rid).await?;
    if context.profile.is_none() {
        return Err(validation_error(
            rid,
            "a profile design is required before generating keywords",
        ));
    }

    let mut existing = xopt_db::list_idea_titles(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    existing.extend(
        xopt_db::list_keyword_themes(&state.pool, id)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?,
    );
    existing.sort();
    existing.dedup();

    let ideas = generator
        .generate_keywords(context.brief(), &existing)
        .await
        .map_err(|e| map_generate_error(rid.clone(), &e))?;
    tracing::info!(client_id = %id, count = ideas.len(), "keywords drafted");
    Ok(respond(req_id, ideas))
}

pub(super) async fn generate_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<PostBody>,
) -> Result<Json<ApiResponse<GeneratedPost>>, ApiError> {
    let rid = &req_id.0;
    let generator = generator(&state, rid)?;
    let context = load_context(&state.pool, id, rid).await?;
    let titles = xopt_db::list_idea_titles(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let request = post_request(rid, &body, titles)?;

    let post = generator
        .generate_post(&request, context.brief())
        .await
        .map_err(|e| map_generate_error(rid.clone(), &e))?;
    tracing::info!(client_id = %id, characters = post.character_count, "post drafted");
    Ok(respond(req_id, post))
}

/// An active hook visible to `client_id`; another client's hook is a 404.
async fn active_hook(
    pool: &PgPool,
    client_id: Uuid,
    id: Uuid,
    request_id: &str,
) -> Result<PostHook, ApiError> {
    xopt_db::get_hook(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .filter(|h| h.is_active && h.available_to(client_id))
        .ok_or_else(|| not_found(request_id, "hook", id))
}

async fn active_template(
    pool: &PgPool,
    client_id: Uuid,
    id: Uuid,
    request_id: &str,
) -> Result<PostTemplate, ApiError> {
    xopt_db::get_template(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .filter(|t| t.is_active && t.available_to(client_id))
        .ok_or_else(|| not_found(request_id, "template", id))
}

/// Drafts a post from an optional hook and template, then counts one use of each.
pub(super) async fn generate_structured_post(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<StructuredPostBody>,
) -> Result<Json<ApiResponse<StructuredPost>>, ApiError> {
    let rid = &req_id.0;
    let request = structured_request(rid, &body)?;
    let generator = generator(&state, rid)?;
    let context = load_context(&state.pool, id, rid).await?;

    let hook = match body.hook_id {
        Some(hook_id) => Some(active_hook(&state.pool, id, hook_id, rid).await?),
        None => None,
    };
    let template = match body.template_id {
        Some(template_id) => Some(active_template(&state.pool, id, template_id, rid).await?),
        None => None,
    };

    let post = generator
        .generate_structured_post(&request, context.brief(), hook.as_ref(), template.as_ref())
        .await
        .map_err(|e| map_generate_error(rid.clone(), &e))?;

    // The draft is already paid for; a failed counter update only warns.
    if let Some(hook) = &hook {
        if let Err(e) = xopt_db::increment_hook_usage(&state.pool, hook.id).await {
            tracing::warn!(hook_id = %hook.id, error = %e, "failed to count hook usage");
        }
    }
    if let Some(template) = &template {
        if let Err(e) = xopt_db::increment_template_usage(&state.pool, template.id).await {
            tracing::warn!(template_id = %template.id, error = %e, "failed to count template usage");
        }
    }

    tracing::info!(
        client_id = %id,
        template = ?post.structure_used.template_name,
        characters = post.character_count,
        "structured post drafted"
    );
    Ok(respond(req_id, post))
}
