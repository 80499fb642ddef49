//! HTTP client for the draft store service.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use ykk_models::{QuotationDraft, QuotationSummary, SmtpSettings};
use ykk_utils::{PortalError, PortalResult};

use crate::wire::{
    DeletedResponse, MessageResponse, QuotationListResponse, QuotationResponse, SmtpConfigResponse,
};

const SERVICE: &str = "Draft API";

#[derive(Clone)]
pub struct RemoteDraftClient {
    client: Client,
    base_url: String,
}

impl RemoteDraftClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PortalResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn save_draft(&self, draft: &QuotationDraft) -> PortalResult<QuotationDraft> {
        let body: QuotationResponse = self.post("/quotations/draft", draft).await?;
        Ok(body.quotation)
    }

    pub async fn get_draft(&self, id: &str) -> PortalResult<QuotationDraft> {
        let body: QuotationResponse = self.get(&format!("/quotations/{}", id)).await?;
        Ok(body.quotation)
    }

    pub async fn list_drafts(&self) -> PortalResult<Vec<QuotationSummary>> {
        let body: QuotationListResponse = self.get("/quotations").await?;
        Ok(body.quotations)
    }

    pub async fn delete_draft(&self, id: &str) -> PortalResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/quotations/{}", id)))
            .send()
            .await?;
        let _: DeletedResponse = decode(response).await?;
        Ok(())
    }

    pub async fn save_smtp(&self, settings: &SmtpSettings) -> PortalResult<()> {
        let _: MessageResponse = self.post("/save-smtp-config", settings).await?;
        Ok(())
    }

    pub async fn load_smtp(&self) -> PortalResult<Option<SmtpSettings>> {
        let body: SmtpConfigResponse = self.get("/smtp-config").await?;
        Ok(body.config)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> PortalResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }
}

/// Non-2xx statuses, `success: false` and bodies of the wrong shape are all
/// external service errors.
async fn decode<T: DeserializeOwned>(response: Response) -> PortalResult<T> {
    let status = response.status();
    let text = response.text().await?;
    debug!(status = status.as_u16(), bytes = text.len(), "Draft API response");

    if !status.is_success() {
        return Err(PortalError::external_service(
            SERVICE,
            format!("HTTP {}: {}", status.as_u16(), text),
        ));
    }

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| PortalError::external_service(SERVICE, format!("Malformed body: {}", e)))?;

    if value.get("success").and_then(serde_json::Value::as_bool) != Some(true) {
        let message = value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("Request was not successful");
        return Err(PortalError::external_service(SERVICE, message));
    }

    serde_json::from_value(value)
        .map_err(|e| PortalError::external_service(SERVICE, format!("Unexpected body: {}", e)))
}
