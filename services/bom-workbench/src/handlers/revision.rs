//! Revision Handlers
//!
//! Drive the per-BOM revision session: begin, edit cells, save for review,
//! confirm, go back or cancel.

use axum::{
    extract::State,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use ykk_models::{PartField, PartId, PartRecord};
use ykk_utils::{Change, RevisionState, SaveOutcome};

use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::state::{AppState, BomEntry};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionView {
    pub state: RevisionState,
    /// Working copy while a session is open, committed parts otherwise
    pub parts: Vec<PartRecord>,
    pub changes: Vec<Change>,
}

impl From<&BomEntry> for RevisionView {
    fn from(entry: &BomEntry) -> Self {
        let parts = match entry.session.state() {
            RevisionState::Idle => entry.store.list().to_vec(),
            _ => entry.session.working_copy().to_vec(),
        };
        Self {
            state: entry.session.state(),
            parts,
            changes: entry.session.pending_changes().to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    pub part_id: PartId,
    pub field: PartField,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub committed: Vec<Change>,
    pub parts: Vec<PartRecord>,
}

/// GET /api/v1/boms/:bom_id/revision
pub async fn get_revision(State(state): State<AppState>, ApiPath(bom_id): ApiPath<Uuid>) -> ApiResult<Json<RevisionView>> {
    let catalog = state.catalog.read().await;
    Ok(Json(RevisionView::from(catalog.get(bom_id)?)))
}

/// POST /api/v1/boms/:bom_id/revision
pub async fn begin_revision(State(state): State<AppState>, ApiPath(bom_id): ApiPath<Uuid>) -> ApiResult<Json<RevisionView>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    entry.session.begin(&mut entry.store)?;
    Ok(Json(RevisionView::from(&*entry)))
}

/// PUT /api/v1/boms/:bom_id/revision/cells
pub async fn edit_revision_cell(
    State(state): State<AppState>,
    ApiPath(bom_id): ApiPath<Uuid>,
    ApiJson(edit): ApiJson<CellEdit>,
) -> ApiResult<Json<RevisionView>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    entry.session.edit_cell(edit.part_id, edit.field, &edit.value)?;
    Ok(Json(RevisionView::from(&*entry)))
}

/// POST /api/v1/boms/:bom_id/revision/save
pub async fn save_revision(State(state): State<AppState>, ApiPath(bom_id): ApiPath<Uuid>) -> ApiResult<Json<SaveOutcome>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    let outcome = entry.session.save(&mut entry.store)?;
    Ok(Json(outcome))
}

/// POST /api/v1/boms/:bom_id/revision/confirm
pub async fn confirm_revision(
    State(state): State<AppState>,
    ApiPath(bom_id): ApiPath<Uuid>,
) -> ApiResult<Json<ConfirmResponse>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    let committed = entry.session.confirm(&mut entry.store)?;
    state.metrics.revisions_committed.inc();

    tracing::info!(bom_id = %bom_id, changes = committed.len(), "Revision confirmed");
    Ok(Json(ConfirmResponse {
        committed,
        parts: entry.store.list().to_vec(),
    }))
}

/// POST /api/v1/boms/:bom_id/revision/back
pub async fn back_to_editing(State(state): State<AppState>, ApiPath(bom_id): ApiPath<Uuid>) -> ApiResult<Json<RevisionView>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    entry.session.back()?;
    Ok(Json(RevisionView::from(&*entry)))
}

/// DELETE /api/v1/boms/:bom_id/revision
pub async fn cancel_revision(State(state): State<AppState>, ApiPath(bom_id): ApiPath<Uuid>) -> ApiResult<Json<RevisionView>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    entry.session.cancel(&mut entry.store)?;
    Ok(Json(RevisionView::from(&*entry)))
}
