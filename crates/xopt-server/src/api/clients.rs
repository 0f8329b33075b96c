//! Client (managed X account) handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use xopt_core::Client;

use crate::middleware::RequestId;

use super::{
    map_db_error, non_blank, not_found, resolve_client, respond, validate_name, ApiError,
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct CreateClientRequest {
    pub name: String,
    pub x_handle: Option<String>,
    pub x_user_id: Option<String>,
}

// Outer None = field absent (keep), Some(None) = explicitly cleared.
#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdateClientRequest {
    pub name: Option<String>,
    #[serde(default, with = "double_option")]
    pub x_handle: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub x_user_id: Option<Option<String>>,
}

/// Distinguishes an absent field from an explicit `null`.
pub(super) mod double_option {
    use serde::{Deserialize, Deserializer};

    #[allow(clippy::option_option)]
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Handles are stored without the leading `@`.
fn normalize_handle(handle: Option<&str>) -> Option<String> {
    non_blank(handle).map(|h| h.trim_start_matches('@').to_owned())
}

pub(super) async fn list_clients(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = xopt_db::list_clients(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(respond(req_id, clients))
}

pub(super) async fn get_client(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Client>>, ApiError> {
    let client = resolve_client(&state.pool, id, &req_id.0).await?;
    Ok(respond(req_id, client))
}

pub(super) async fn create_client(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Client>>), ApiError> {
    let rid = &req_id.0;
    let name = validate_name(rid, "name", &body.name)?;
    let handle = normalize_handle(body.x_handle.as_deref());

    let client = xopt_db::create_client(
        &state.pool,
        &name,
        handle.as_deref(),
        non_blank(body.x_user_id.as_deref()),
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(client_id = %client.id, "client created");
    Ok((StatusCode::CREATED, respond(req_id, client)))
}

pub(super) async fn update_client(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, ApiError> {
    let rid = &req_id.0;
    let name = body
        .name
        .as_deref()
        .map(|n| validate_name(rid, "name", n))
        .transpose()?;
    let handle = body
        .x_handle
        .as_ref()
        .map(|h| normalize_handle(h.as_deref()));

    let update = xopt_db::ClientUpdate {
        name: name.as_deref(),
        x_handle: handle.as_ref().map(Option::as_deref),
        x_user_id: body
            .x_user_id
            .as_ref()
            .map(|v| non_blank(v.as_deref())),
    };

    let client = xopt_db::update_client(&state.pool, id, update)
        .await
        .map_err(|e| match e {
            xopt_db::DbError::NotFound => not_found(rid, "client", id),
            other => map_db_error(rid.clone(), &other),
        })?;
    Ok(respond(req_id, client))
}

pub(super) async fn delete_client(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let deleted = xopt_db::delete_client(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(not_found(rid, "client", id));
    }

    tracing::info!(client_id = %id, "client deleted");
    Ok(respond(req_id, serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_stored_without_at_sign() {
        assert_eq!(normalize_handle(Some("@xopt")), Some("xopt".to_string()));
        assert_eq!(normalize_handle(Some("  ")), None);
        assert_eq!(normalize_handle(None), None);
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let body: UpdateClientRequest =
            serde_json::from_str(r#"{"x_handle": null}"#).expect("parse");
        assert_eq!(body.x_handle, Some(None));
        assert_eq!(body.x_user_id, None);
        assert_eq!(body.name, None);
    }
}
