//! Profile design handlers: one design per client, replaced wholesale on PUT.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use xopt_core::{ProfileDesign, ProfileDesignInput};

use crate::middleware::RequestId;

use super::{map_db_error, resolve_client, respond, ApiError, ApiResponse, AppState};

/// Returns `null` data when the client has no design yet.
pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Option<ProfileDesign>>>, ApiError> {
    let rid = &req_id.0;
    resolve_client(&state.pool, id, rid).await?;
    let design = xopt_db::get_profile_design(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(req_id, design))
}

pub(super) async fn put_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProfileDesignInput>,
) -> Result<Json<ApiResponse<ProfileDesign>>, ApiError> {
    let rid = &req_id.0;
    resolve_client(&state.pool, id, rid).await?;
    let design = xopt_db::upsert_profile_design(&state.pool, id, &body)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(client_id = %id, "profile design saved");
    Ok(respond(req_id, design))
}
