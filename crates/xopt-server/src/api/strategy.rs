//! Brand strategy handlers and the section catalogue.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;
use xopt_core::{BrandStrategy, StrategyCategory, StrategyContent, StrategySection};

use crate::middleware::RequestId;

use super::{map_db_error, resolve_client, respond, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StrategyData {
    #[serde(flatten)]
    pub strategy: Option<BrandStrategy>,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct SectionGroup {
    key: StrategyCategory,
    label: &'static str,
    sections: Vec<SectionItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct SectionItem {
    key: &'static str,
    label: &'static str,
    description: &'static str,
}

fn strategy_data(strategy: Option<BrandStrategy>) -> StrategyData {
    let (completed, total) = strategy
        .as_ref()
        .map_or((0, StrategySection::ALL.len()), |s| s.content.completion());
    StrategyData {
        strategy,
        completed,
        total,
    }
}

pub(super) async fn get_strategy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StrategyData>>, ApiError> {
    let rid = &req_id.0;
    resolve_client(&state.pool, id, rid).await?;
    let strategy = xopt_db::get_brand_strategy(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(respond(req_id, strategy_data(strategy)))
}

pub(super) async fn put_strategy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<StrategyContent>,
) -> Result<Json<ApiResponse<StrategyData>>, ApiError> {
    let rid = &req_id.0;
    resolve_client(&state.pool, id, rid).await?;
    let strategy = xopt_db::upsert_brand_strategy(&state.pool, id, &body)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let (completed, total) = strategy.content.completion();
    tracing::info!(client_id = %id, completed, total, "brand strategy saved");
    Ok(respond(req_id, strategy_data(Some(strategy))))
}

/// Section catalogue grouped by category, in display order.
pub(super) async fn list_sections(
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<SectionGroup>>> {
    let groups = StrategyCategory::ALL
        .iter()
        .map(|&category| SectionGroup {
            key: category,
            label: category.label(),
            sections: StrategySection::in_category(category)
                .map(|section| SectionItem {
                    key: section.key(),
                    label: section.label(),
                    description: section.description(),
                })
                .collect(),
        })
        .collect();
    respond(req_id, groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_strategy_reports_zero_completion() {
        let data = strategy_data(None);
        assert_eq!(data.completed, 0);
        assert_eq!(data.total, 22);
    }
}
