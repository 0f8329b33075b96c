//! Hook and template library handlers.
//!
//! System entries are seeded from the library file and are read-only here;
//! user entries can be edited and hidden. Nothing is ever hard-deleted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use xopt_core::{HookCategory, PostHook, PostTemplate, TemplateCategory, TemplateStructurePart};

use crate::middleware::RequestId;

use super::clients::double_option;
use super::{
    map_db_error, non_blank, not_found, parse_key, parse_optional_key, respond, validate_name,
    validation_error, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct LibraryQuery {
    pub category: Option<String>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateHookRequest {
    pub client_id: Option<Uuid>,
    pub category: String,
    pub hook_text: String,
    pub description: Option<String>,
    pub example_usage: Option<String>,
}

#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateHookRequest {
    pub category: Option<String>,
    pub hook_text: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub example_usage: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateTemplateRequest {
    pub client_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub structure: Vec<TemplateStructurePart>,
    #[serde(default)]
    pub has_reply_thread: bool,
    #[serde(default)]
    pub reply_structure: Vec<TemplateStructurePart>,
}

#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateTemplateRequest {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub structure: Option<Vec<TemplateStructurePart>>,
    pub has_reply_thread: Option<bool>,
    pub reply_structure: Option<Vec<TemplateStructurePart>>,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryItem {
    key: &'static str,
    label: &'static str,
    color: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct LibraryCategories {
    hooks: Vec<CategoryItem>,
    templates: Vec<CategoryItem>,
}

fn validate_hook_text(request_id: &str, text: &str) -> Result<String, ApiError> {
    non_blank(Some(text))
        .map(ToOwned::to_owned)
        .ok_or_else(|| validation_error(request_id, "hook_text must not be empty"))
}

fn validate_parts(
    request_id: &str,
    field: &str,
    parts: &[TemplateStructurePart],
) -> Result<(), ApiError> {
    for (idx, part) in parts.iter().enumerate() {
        if part.name.trim().is_empty() {
            return Err(validation_error(
                request_id,
                format!("{field}[{idx}].name must not be empty"),
            ));
        }
        if part.char_limit.is_some_and(|limit| limit <= 0) {
            return Err(validation_error(
                request_id,
                format!("{field}[{idx}].char_limit must be positive"),
            ));
        }
    }
    Ok(())
}

/// Checks a template's final shape: a non-empty structure, and a reply
/// structure whenever a reply thread is declared.
fn validate_template_shape(
    request_id: &str,
    structure: &[TemplateStructurePart],
    has_reply_thread: bool,
    reply_structure: &[TemplateStructurePart],
) -> Result<(), ApiError> {
    if structure.is_empty() {
        return Err(validation_error(request_id, "structure must not be empty"));
    }
    validate_parts(request_id, "structure", structure)?;
    if has_reply_thread && reply_structure.is_empty() {
        return Err(validation_error(
            request_id,
            "reply_structure is required when has_reply_thread is true",
        ));
    }
    validate_parts(request_id, "reply_structure", reply_structure)
}

fn reject_system(request_id: &str, what: &str, is_system: bool) -> Result<(), ApiError> {
    if is_system {
        return Err(validation_error(
            request_id,
            format!("system {what}s cannot be modified"),
        ));
    }
    Ok(())
}

async fn resolve_hook(pool: &sqlx::PgPool, id: Uuid, request_id: &str) -> Result<PostHook, ApiError> {
    xopt_db::get_hook(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .filter(|h| h.is_active)
        .ok_or_else(|| not_found(request_id, "hook", id))
}

async fn resolve_template(
    pool: &sqlx::PgPool,
    id: Uuid,
    request_id: &str,
) -> Result<PostTemplate, ApiError> {
    xopt_db::get_template(pool, id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .filter(|t| t.is_active)
        .ok_or_else(|| not_found(request_id, "template", id))
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

pub(super) async fn list_hooks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<ApiResponse<Vec<PostHook>>>, ApiError> {
    let rid = &req_id.0;
    let category: Option<HookCategory> =
        parse_optional_key(rid, "category", query.category.as_deref())?;
    let hooks = xopt_db::list_active_hooks(&state.pool, category, query.client_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(req_id, hooks))
}

pub(super) async fn create_hook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateHookRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostHook>>), ApiError> {
    let rid = &req_id.0;
    let category: HookCategory = parse_key(rid, "category", &body.category)?;
    let hook_text = validate_hook_text(rid, &body.hook_text)?;

    let hook = xopt_db::create_hook(
        &state.pool,
        &xopt_db::NewHook {
            client_id: body.client_id,
            category,
            hook_text: &hook_text,
            description: non_blank(body.description.as_deref()),
            example_usage: non_blank(body.example_usage.as_deref()),
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(hook_id = %hook.id, category = %category, "hook created");
    Ok((StatusCode::CREATED, respond(req_id, hook)))
}

pub(super) async fn update_hook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateHookRequest>,
) -> Result<Json<ApiResponse<PostHook>>, ApiError> {
    let rid = &req_id.0;
    let category: Option<HookCategory> =
        parse_optional_key(rid, "category", body.category.as_deref())?;
    let hook_text = body
        .hook_text
        .as_deref()
        .map(|t| validate_hook_text(rid, t))
        .transpose()?;

    let existing = resolve_hook(&state.pool, id, rid).await?;
    reject_system(rid, "hook", existing.is_system)?;

    let update = xopt_db::HookUpdate {
        category,
        hook_text: hook_text.as_deref(),
        description: body.description.as_ref().map(|d| non_blank(d.as_deref())),
        example_usage: body.example_usage.as_ref().map(|e| non_blank(e.as_deref())),
    };
    let hook = xopt_db::update_hook(&state.pool, id, &update)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "hook", id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, hook))
}

/// Hides a user hook. System hooks are rejected.
pub(super) async fn delete_hook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let existing = resolve_hook(&state.pool, id, rid).await?;
    reject_system(rid, "hook", existing.is_system)?;

    let hidden = xopt_db::deactivate_hook(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !hidden {
        return Err(not_found(rid, "hook", id));
    }
    tracing::info!(hook_id = %id, "hook deactivated");
    Ok(respond(req_id, serde_json::json!({ "deleted": true })))
}

pub(super) async fn use_hook(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PostHook>>, ApiError> {
    let rid = &req_id.0;
    let hook = xopt_db::increment_hook_usage(&state.pool, id)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "hook", id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, hook))
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub(super) async fn list_templates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LibraryQuery>,
) -> Result<Json<ApiResponse<Vec<PostTemplate>>>, ApiError> {
    let rid = &req_id.0;
    let category: Option<TemplateCategory> =
        parse_optional_key(rid, "category", query.category.as_deref())?;
    let templates = xopt_db::list_active_templates(&state.pool, category, query.client_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(req_id, templates))
}

pub(super) async fn create_template(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostTemplate>>), ApiError> {
    let rid = &req_id.0;
    let name = validate_name(rid, "name", &body.name)?;
    let category: TemplateCategory = parse_key(rid, "category", &body.category)?;
    validate_template_shape(
        rid,
        &body.structure,
        body.has_reply_thread,
        &body.reply_structure,
    )?;

    let template = xopt_db::create_template(
        &state.pool,
        &xopt_db::NewTemplate {
            client_id: body.client_id,
            name: &name,
            description: non_blank(body.description.as_deref()),
            category,
            structure: &body.structure,
            has_reply_thread: body.has_reply_thread,
            reply_structure: &body.reply_structure,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(template_id = %template.id, category = %category, "template created");
    Ok((StatusCode::CREATED, respond(req_id, template)))
}

pub(super) async fn update_template(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTemplateRequest>,
) -> Result<Json<ApiResponse<PostTemplate>>, ApiError> {
    let rid = &req_id.0;
    let name = body
        .name
        .as_deref()
        .map(|n| validate_name(rid, "name", n))
        .transpose()?;
    let category: Option<TemplateCategory> =
        parse_optional_key(rid, "category", body.category.as_deref())?;

    let existing = resolve_template(&state.pool, id, rid).await?;
    reject_system(rid, "template", existing.is_system)?;

    // Validate the shape the template will have after the patch.
    validate_template_shape(
        rid,
        body.structure
            .as_deref()
            .unwrap_or(existing.structure.as_slice()),
        body.has_reply_thread.unwrap_or(existing.has_reply_thread),
        body.reply_structure
            .as_deref()
            .unwrap_or(existing.reply_structure.as_slice()),
    )?;

    let update = xopt_db::TemplateUpdate {
        name: name.as_deref(),
        description: body.description.as_ref().map(|d| non_blank(d.as_deref())),
        category,
        structure: body.structure.as_deref(),
        has_reply_thread: body.has_reply_thread,
        reply_structure: body.reply_structure.as_deref(),
    };
    let template = xopt_db::update_template(&state.pool, id, &update)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "template", id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, template))
}

/// Hides a user template. System templates are rejected.
pub(super) async fn delete_template(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let existing = resolve_template(&state.pool, id, rid).await?;
    reject_system(rid, "template", existing.is_system)?;

    let hidden = xopt_db::deactivate_template(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !hidden {
        return Err(not_found(rid, "template", id));
    }
    tracing::info!(template_id = %id, "template deactivated");
    Ok(respond(req_id, serde_json::json!({ "deleted": true })))
}

pub(super) async fn use_template(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PostTemplate>>, ApiError> {
    let rid = &req_id.0;
    let template = xopt_db::increment_template_usage(&state.pool, id)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "template", id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, template))
}

pub(super) async fn list_categories(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<LibraryCategories>> {
    respond(req_id, library_categories())
}

fn library_categories() -> LibraryCategories {
    LibraryCategories {
        hooks: HookCategory::ALL
            .iter()
            .map(|c| CategoryItem {
                key: c.as_str(),
                label: c.label(),
                color: c.color(),
            })
            .collect(),
        templates: TemplateCategory::ALL
            .iter()
            .map(|c| CategoryItem {
                key: c.as_str(),
                label: c.label(),
                color: c.color(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(order: i32, name: &str, char_limit: Option<i32>) -> TemplateStructurePart {
        TemplateStructurePart {
            order,
            name: name.to_string(),
            prompt: "書く".to_string(),
            char_limit,
        }
    }

    #[test]
    fn categories_cover_every_variant() {
        let categories = library_categories();
        assert_eq!(categories.hooks.len(), 7);
        assert_eq!(categories.templates.len(), 5);
        assert_eq!(categories.hooks[0].key, "urgent");
        assert_eq!(categories.hooks[0].color, "#ef4444");
    }

    #[test]
    fn template_shape_requires_structure() {
        let err = validate_template_shape("req", &[], false, &[]).unwrap_err();
        assert_eq!(err.error.message, "structure must not be empty");
    }

    #[test]
    fn template_shape_requires_reply_structure_for_threads() {
        let structure = vec![part(1, "フック", Some(40))];
        assert!(validate_template_shape("req", &structure, true, &[]).is_err());
        assert!(validate_template_shape("req", &structure, false, &[]).is_ok());
    }

    #[test]
    fn template_parts_must_be_named_with_positive_limits() {
        let err = validate_template_shape("req", &[part(1, " ", None)], false, &[]).unwrap_err();
        assert!(err.error.message.contains("structure[0].name"));
        let err =
            validate_template_shape("req", &[part(1, "本文", Some(0))], false, &[]).unwrap_err();
        assert!(err.error.message.contains("char_limit"));
    }

    #[test]
    fn system_entries_are_read_only() {
        assert!(reject_system("req", "hook", true).is_err());
        assert!(reject_system("req", "hook", false).is_ok());
    }

    #[test]
    fn blank_hook_text_is_rejected() {
        assert!(validate_hook_text("req", "   ").is_err());
        assert_eq!(validate_hook_text("req", " 実は ").expect("valid"), "実は");
    }
}
