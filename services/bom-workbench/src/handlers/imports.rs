//! Import Handlers
//!
//! Two-step spreadsheet import: upload and inspect the sheet, then preview
//! or commit it with a column mapping.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use ykk_models::PartField;
use ykk_utils::{
    materialize, parse_workbook, validate_file_size, validate_file_type, validate_mapping, ColumnMapping,
    ImportPreview, ImportWarning, PortalError, SPREADSHEET_EXTENSIONS,
};

use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInspection {
    pub sheet_id: Uuid,
    pub filename: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    /// Auto-mapped from canonical labels
    pub mapping: ColumnMapping,
    pub missing: Vec<PartField>,
}

#[derive(Debug, Deserialize)]
pub struct MappingRequest {
    pub mapping: ColumnMapping,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCommitted {
    pub added: usize,
    pub skipped: usize,
    pub warnings: Vec<ImportWarning>,
}

/// POST /api/v1/boms/:bom_id/imports
pub async fn inspect_import(
    State(state): State<AppState>,
    ApiPath(bom_id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportInspection>> {
    let mut multipart = multipart?;
    let field = multipart
        .next_field()
        .await
        .map_err(|e| PortalError::validation("file", format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| PortalError::validation("file", "No file provided"))?;

    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| PortalError::validation("file", "Upload has no file name"))?;
    validate_file_type(&filename, SPREADSHEET_EXTENSIONS)?;

    let data = field
        .bytes()
        .await
        .map_err(|e| PortalError::validation("file", format!("Failed to read file data: {}", e)))?;
    validate_file_size(data.len() as u64, state.config.server.max_request_size as u64)?;

    let sheet = parse_workbook(&filename, &data)?;
    let mapping = ColumnMapping::auto(&sheet.columns);
    let inspection = ImportInspection {
        sheet_id: sheet.id,
        filename: sheet.filename.clone(),
        columns: sheet.columns.clone(),
        row_count: sheet.rows.len(),
        missing: validate_mapping(&mapping),
        mapping,
    };

    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    if let Some(replaced) = entry.stage_import(sheet) {
        tracing::debug!(bom_id = %bom_id, sheet_id = %replaced, "Replaced pending import");
    }

    Ok(Json(inspection))
}

/// POST /api/v1/boms/:bom_id/imports/:sheet_id/preview
pub async fn preview_import(
    State(state): State<AppState>,
    ApiPath((bom_id, sheet_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<MappingRequest>,
) -> ApiResult<Json<ImportPreview>> {
    let catalog = state.catalog.read().await;
    let entry = catalog.get(bom_id)?;
    let sheet = entry.pending_import(sheet_id)?;

    let preview = materialize(&sheet.rows, &request.mapping, entry.header.variant())?;
    Ok(Json(preview))
}

/// POST /api/v1/boms/:bom_id/imports/:sheet_id/commit
pub async fn commit_import(
    State(state): State<AppState>,
    ApiPath((bom_id, sheet_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<MappingRequest>,
) -> ApiResult<Json<ImportCommitted>> {
    let mut catalog = state.catalog.write().await;
    let entry = catalog.get_mut(bom_id)?;
    let sheet = entry.pending_import(sheet_id)?;

    let preview = materialize(&sheet.rows, &request.mapping, entry.header.variant())?;
    let ids = entry.store.add_all(preview.parts)?;
    entry.take_import(sheet_id)?;

    state.metrics.parts_imported.inc_by(ids.len() as u64);
    tracing::info!(bom_id = %bom_id, added = ids.len(), skipped = preview.skipped, "Committed BOM import");

    Ok(Json(ImportCommitted {
        added: ids.len(),
        skipped: preview.skipped,
        warnings: preview.warnings,
    }))
}

/// DELETE /api/v1/boms/:bom_id/imports/:sheet_id
pub async fn discard_import(
    State(state): State<AppState>,
    ApiPath((bom_id, sheet_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut catalog = state.catalog.write().await;
    catalog.get_mut(bom_id)?.take_import(sheet_id)?;

    Ok(Json(serde_json::json!({ "discarded": sheet_id })))
}
