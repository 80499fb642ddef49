//! BOM Handlers
//!
//! Creation and lookup of Outer and Inner BOMs.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use uuid::Uuid;
use ykk_models::{BomHeader, NewBom, PartRecord};
use ykk_utils::RevisionState;

use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::state::{AppState, BomEntry};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomSummary {
    #[serde(flatten)]
    pub header: BomHeader,
    pub part_count: usize,
    pub revision: RevisionState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BomDetail {
    #[serde(flatten)]
    pub header: BomHeader,
    pub parts: Vec<PartRecord>,
    pub revision: RevisionState,
}

impl From<&BomEntry> for BomDetail {
    fn from(entry: &BomEntry) -> Self {
        Self {
            header: entry.header.clone(),
            parts: entry.store.list().to_vec(),
            revision: entry.session.state(),
        }
    }
}

/// POST /api/v1/boms
pub async fn create_bom(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewBom>,
) -> ApiResult<(StatusCode, Json<BomDetail>)> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.create(request)?;

    tracing::info!(bom_id = %entry.header.id, code = %entry.header.code, variant = %entry.header.variant(), "Created BOM");
    Ok((StatusCode::CREATED, Json(BomDetail::from(entry))))
}

/// GET /api/v1/boms
pub async fn list_boms(State(state): State<AppState>) -> Json<Vec<BomSummary>> {
    let catalog = state.catalog.read().await;
    let summaries = catalog
        .headers()
        .into_iter()
        .filter_map(|header| catalog.get(header.id).ok())
        .map(|entry| BomSummary {
            header: entry.header.clone(),
            part_count: entry.store.len(),
            revision: entry.session.state(),
        })
        .collect();
    Json(summaries)
}

/// GET /api/v1/boms/:bom_id
pub async fn get_bom(State(state): State<AppState>, ApiPath(bom_id): ApiPath<Uuid>) -> ApiResult<Json<BomDetail>> {
    let catalog = state.catalog.read().await;
    let entry = catalog.get(bom_id)?;
    Ok(Json(BomDetail::from(entry)))
}
