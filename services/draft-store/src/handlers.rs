//! Draft store endpoints. Every body carries `success`.

use axum::{
    extract::State,
    Json,
};
use ykk_database::wire::{
    DeletedResponse, HealthResponse, MessageResponse, QuotationListResponse, QuotationResponse,
    SmtpConfigResponse,
};
use ykk_models::{QuotationDraft, SmtpSettings};
use ykk_utils::PortalError;

use crate::error::{ApiJson, ApiPath, ApiResult};
use crate::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.kv.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Draft store backend unhealthy");
            "degraded"
        }
    };

    Json(HealthResponse {
        success: true,
        status: status.to_string(),
        backend: state.kv.name().to_string(),
    })
}

/// POST /quotations/draft
pub async fn save_draft(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<QuotationDraft>,
) -> ApiResult<QuotationResponse> {
    let quotation = state.quotations.save_draft(draft).await?;
    Ok(Json(QuotationResponse {
        success: true,
        quotation,
    }))
}

/// GET /quotations/:id
pub async fn get_draft(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<QuotationResponse> {
    let quotation = state
        .quotations
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("quotation {}", id)))?;

    Ok(Json(QuotationResponse {
        success: true,
        quotation,
    }))
}

/// GET /quotations
pub async fn list_drafts(State(state): State<AppState>) -> ApiResult<QuotationListResponse> {
    let quotations = state.quotations.list().await?;
    Ok(Json(QuotationListResponse {
        success: true,
        quotations,
    }))
}

/// DELETE /quotations/:id
pub async fn delete_draft(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ApiResult<DeletedResponse> {
    state.quotations.delete(&id).await?;
    Ok(Json(DeletedResponse { success: true, id }))
}

/// POST /save-smtp-config
pub async fn save_smtp_config(
    State(state): State<AppState>,
    ApiJson(settings): ApiJson<SmtpSettings>,
) -> ApiResult<MessageResponse> {
    state.smtp.save(&settings).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "SMTP configuration saved".to_string(),
    }))
}

/// GET /smtp-config
pub async fn get_smtp_config(State(state): State<AppState>) -> ApiResult<SmtpConfigResponse> {
    let config = state.smtp.load().await?;
    Ok(Json(SmtpConfigResponse {
        success: true,
        config: config.as_ref().map(SmtpSettings::redacted),
    }))
}
