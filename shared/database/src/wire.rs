//! Draft store response bodies, shared by the server and the remote client.
//! Every body carries `success`; failures use `ykk_utils::ErrorResponse`.

use serde::{Deserialize, Serialize};
use ykk_models::{QuotationDraft, QuotationSummary, SmtpSettings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub backend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationResponse {
    pub success: bool,
    pub quotation: QuotationDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationListResponse {
    pub success: bool,
    pub quotations: Vec<QuotationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfigResponse {
    pub success: bool,
    pub config: Option<SmtpSettings>,
}
