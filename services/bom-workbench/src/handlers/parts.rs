//! Part Handlers
//!
//! Manual add, update and delete outside a revision session.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;
use ykk_models::{PartDraft, PartId, PartPatch, PartRecord};
use ykk_utils::PortalError;

use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::state::AppState;

/// POST /api/v1/boms/:bom_id/parts
pub async fn add_part(
    State(state): State<AppState>,
    ApiPath(bom_id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<PartDraft>,
) -> ApiResult<(StatusCode, Json<PartRecord>)> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;

    let id = entry.store.add(draft)?;
    let part = entry
        .store
        .get(id)
        .cloned()
        .ok_or_else(|| PortalError::internal(format!("part {} missing after insert", id)))?;

    Ok((StatusCode::CREATED, Json(part)))
}

/// PATCH /api/v1/boms/:bom_id/parts/:part_id
pub async fn update_part(
    State(state): State<AppState>,
    ApiPath((bom_id, part_id)): ApiPath<(Uuid, PartId)>,
    ApiJson(patch): ApiJson<PartPatch>,
) -> ApiResult<Json<PartRecord>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    let part = entry.store.update(part_id, patch)?.clone();
    Ok(Json(part))
}

/// DELETE /api/v1/boms/:bom_id/parts/:part_id
pub async fn delete_part(
    State(state): State<AppState>,
    ApiPath((bom_id, part_id)): ApiPath<(Uuid, PartId)>,
) -> ApiResult<Json<PartRecord>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    let removed = entry.store.delete(part_id)?;
    Ok(Json(removed))
}
