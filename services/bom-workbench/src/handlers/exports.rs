use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use uuid::Uuid;
use ykk_utils::{export_xlsx, render_report, validate_dimension, Dimensions, PortalError, PortalResult};

use crate::error::{ApiPath, ApiQuery, ApiResult};
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Window size for cut length substitution.
#[derive(Debug, Deserialize)]
pub struct SizeQuery {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizeQuery {
    fn dimensions(&self) -> PortalResult<Dimensions> {
        let width = self
            .width
            .ok_or_else(|| PortalError::validation("width", "Window width is required"))?;
        let height = self
            .height
            .ok_or_else(|| PortalError::validation("height", "Window height is required"))?;
        validate_dimension("width", width)?;
        validate_dimension("height", height)?;
        Ok(Dimensions::new(width, height))
    }
}

/// GET /api/v1/boms/:bom_id/export?width=&height=
pub async fn export_bom(
    State(state): State<AppState>,
    ApiPath(bom_id): ApiPath<Uuid>,
    ApiQuery(size): ApiQuery<SizeQuery>,
) -> ApiResult<impl IntoResponse> {
    let dims = size.dimensions()?;
    let (header, parts) = {
        let catalog = state.catalog.read().await;
        let entry = catalog.get(bom_id)?;
        (entry.header.clone(), entry.store.list().to_vec())
    };

    let bytes = export_xlsx(&header, &parts, dims)?;
    state.metrics.exports.with_label_values(&["xlsx"]).inc();

    let disposition = format!("attachment; filename=\"{}-bom.xlsx\"", sanitize_filename(&header.code));
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// GET /api/v1/boms/:bom_id/report?width=&height=
pub async fn bom_report(
    State(state): State<AppState>,
    ApiPath(bom_id): ApiPath<Uuid>,
    ApiQuery(size): ApiQuery<SizeQuery>,
) -> ApiResult<Html<String>> {
    let dims = size.dimensions()?;
    let catalog = state.catalog.read().await;
    let entry = catalog.get(bom_id)?;

    let html = render_report(&entry.header, entry.store.list(), dims)?;
    state.metrics.exports.with_label_values(&["report"]).inc();
    Ok(Html(html))
}

fn sanitize_filename(code: &str) -> String {
    code.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
