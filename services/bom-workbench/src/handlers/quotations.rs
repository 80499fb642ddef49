//! Quotation Draft Handlers
//!
//! Served through the two-tier repository; each response names the tier that
//! handled it.

use axum::{
    extract::State,
    response::Json,
};
use ykk_database::Fetched;
use ykk_models::{QuotationDraft, QuotationSummary, SmtpSettings};
use ykk_utils::PortalError;

use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::state::AppState;

/// POST /api/v1/quotations
pub async fn save_quotation(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<QuotationDraft>,
) -> ApiResult<Json<Fetched<QuotationDraft>>> {
    Ok(Json(state.drafts.save_draft(draft).await?))
}

/// GET /api/v1/quotations
pub async fn list_quotations(State(state): State<AppState>) -> ApiResult<Json<Fetched<Vec<QuotationSummary>>>> {
    Ok(Json(state.drafts.list_drafts().await?))
}

/// GET /api/v1/quotations/:id
pub async fn get_quotation(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Fetched<QuotationDraft>>> {
    let fetched = state.drafts.get_draft(&id).await?;
    let value = fetched
        .value
        .ok_or_else(|| PortalError::not_found(format!("quotation {}", id)))?;
    Ok(Json(Fetched {
        value,
        tier: fetched.tier,
    }))
}

/// DELETE /api/v1/quotations/:id
pub async fn delete_quotation(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<Json<Fetched<()>>> {
    Ok(Json(state.drafts.delete_draft(&id).await?))
}

/// PUT /api/v1/smtp-config
pub async fn save_smtp_settings(
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<SmtpSettings>,
) -> ApiResult<Json<Fetched<()>>> {
    Ok(Json(state.drafts.save_smtp(&settings).await?))
}

/// GET /api/v1/smtp-config
pub async fn get_smtp_settings(State(state): State<AppState>) -> ApiResult<Json<Fetched<Option<SmtpSettings>>>> {
    let fetched = state.drafts.load_smtp().await?;
    Ok(Json(Fetched {
        value: fetched.value.as_ref().map(SmtpSettings::redacted),
        tier: fetched.tier,
    }))
}
