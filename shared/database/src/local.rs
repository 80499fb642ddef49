//! Local JSON file holding drafts and SMTP settings when the draft API is
//! unavailable.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;
use ykk_models::{QuotationDraft, QuotationSummary, SmtpSettings};
use ykk_utils::{validate_model, PortalError, PortalResult};

use crate::repositories::storage_error;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LocalFile {
    quotations: Vec<QuotationDraft>,
    smtp: Option<SmtpSettings>,
}

pub struct LocalDraftStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn save_draft(&self, mut draft: QuotationDraft) -> PortalResult<QuotationDraft> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await.map_err(storage_error)?;

        draft.stamp(Utc::now());
        match file.quotations.iter_mut().find(|q| q.id == draft.id) {
            Some(existing) => *existing = draft.clone(),
            None => file.quotations.insert(0, draft.clone()),
        }

        self.write(&file).await.map_err(storage_error)?;
        Ok(draft)
    }

    pub async fn get_draft(&self, id: &str) -> PortalResult<Option<QuotationDraft>> {
        let _guard = self.lock.lock().await;
        let file = self.read().await.map_err(storage_error)?;
        Ok(file.quotations.into_iter().find(|q| q.id == id))
    }

    pub async fn list_drafts(&self) -> PortalResult<Vec<QuotationSummary>> {
        let _guard = self.lock.lock().await;
        let file = self.read().await.map_err(storage_error)?;
        Ok(file.quotations.iter().map(QuotationDraft::summary).collect())
    }

    pub async fn delete_draft(&self, id: &str) -> PortalResult<()> {
        let _guard = self.lock.lock().await;
        let mut file = self.read().await.map_err(storage_error)?;

        let before = file.quotations.len();
        file.quotations.retain(|q| q.id != id);
        if file.quotations.len() == before {
            return Err(PortalError::not_found(format!("quotation {}", id)));
        }

        self.write(&file).await.map_err(storage_error)
    }

    pub async fn save_smtp(&self, settings: &SmtpSettings) -> PortalResult<()> {
        validate_model(settings)?;
        let _guard = self.lock.lock().await;
        let mut file = self.read().await.map_err(storage_error)?;
        file.smtp = Some(settings.clone());
        self.write(&file).await.map_err(storage_error)
    }

    pub async fn load_smtp(&self) -> PortalResult<Option<SmtpSettings>> {
        let _guard = self.lock.lock().await;
        let file = self.read().await.map_err(storage_error)?;
        Ok(file.smtp)
    }

    async fn read(&self) -> Result<LocalFile> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Corrupt draft file {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LocalFile::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }

    async fn write(&self, file: &LocalFile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let body = serde_json::to_vec_pretty(file)?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        debug!(path = %self.path.display(), drafts = file.quotations.len(), "Wrote local draft file");
        Ok(())
    }
}
