//! Two-Tier Draft Repository
//!
//! Every operation tries the remote draft API first. Any failure there
//! (transport, non-2xx, `success: false`, malformed body) is logged and the
//! local JSON file serves the request instead. Nothing is retried.

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tracing::warn;
use ykk_models::{QuotationDraft, QuotationSummary, SmtpSettings};
use ykk_utils::{DraftApiConfig, PortalResult};

use crate::local::LocalDraftStore;
use crate::remote::RemoteDraftClient;

/// Storage layer that served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub value: T,
    pub tier: Tier,
}

pub struct TwoTierDraftRepository {
    remote: Option<RemoteDraftClient>,
    local: LocalDraftStore,
}

impl TwoTierDraftRepository {
    pub fn new(remote: Option<RemoteDraftClient>, local: LocalDraftStore) -> Self {
        Self { remote, local }
    }

    /// Without a configured base URL only the local tier is used.
    pub fn from_config(config: &DraftApiConfig) -> PortalResult<Self> {
        let remote = match config.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(RemoteDraftClient::new(
                url,
                Duration::from_secs(config.timeout_seconds),
            )?),
            None => None,
        };
        Ok(Self::new(remote, LocalDraftStore::new(&config.local_path)))
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn save_draft(&self, draft: QuotationDraft) -> PortalResult<Fetched<QuotationDraft>> {
        if let Some(saved) = self.try_remote("save draft", |remote| {
            let draft = draft.clone();
            async move { remote.save_draft(&draft).await }
        })
        .await
        {
            return Ok(saved);
        }
        local(self.local.save_draft(draft).await)
    }

    pub async fn get_draft(&self, id: &str) -> PortalResult<Fetched<Option<QuotationDraft>>> {
        if let Some(found) = self
            .try_remote("get draft", |remote| async move { remote.get_draft(id).await.map(Some) })
            .await
        {
            return Ok(found);
        }
        local(self.local.get_draft(id).await)
    }

    pub async fn list_drafts(&self) -> PortalResult<Fetched<Vec<QuotationSummary>>> {
        if let Some(list) = self
            .try_remote("list drafts", |remote| async move { remote.list_drafts().await })
            .await
        {
            return Ok(list);
        }
        local(self.local.list_drafts().await)
    }

    pub async fn delete_draft(&self, id: &str) -> PortalResult<Fetched<()>> {
        if let Some(done) = self
            .try_remote("delete draft", |remote| async move { remote.delete_draft(id).await })
            .await
        {
            return Ok(done);
        }
        local(self.local.delete_draft(id).await)
    }

    pub async fn save_smtp(&self, settings: &SmtpSettings) -> PortalResult<Fetched<()>> {
        if let Some(done) = self
            .try_remote("save SMTP settings", |remote| async move { remote.save_smtp(settings).await })
            .await
        {
            return Ok(done);
        }
        local(self.local.save_smtp(settings).await)
    }

    pub async fn load_smtp(&self) -> PortalResult<Fetched<Option<SmtpSettings>>> {
        if let Some(found) = self
            .try_remote("load SMTP settings", |remote| async move { remote.load_smtp().await })
            .await
        {
            return Ok(found);
        }
        local(self.local.load_smtp().await)
    }

    async fn try_remote<'a, T, F, Fut>(&'a self, operation: &str, call: F) -> Option<Fetched<T>>
    where
        F: FnOnce(&'a RemoteDraftClient) -> Fut,
        Fut: Future<Output = PortalResult<T>>,
    {
        let remote = self.remote.as_ref()?;
        match call(remote).await {
            Ok(value) => Some(Fetched {
                value,
                tier: Tier::Remote,
            }),
            Err(e) => {
                warn!(
                    operation,
                    base_url = remote.base_url(),
                    error = %e,
                    "Draft API unavailable, falling back to local storage"
                );
                None
            }
        }
    }
}

fn local<T>(result: PortalResult<T>) -> PortalResult<Fetched<T>> {
    result.map(|value| Fetched {
        value,
        tier: Tier::Local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unreachable_config(dir: &TempDir) -> DraftApiConfig {
        DraftApiConfig {
            // Nothing listens on port 1
            base_url: Some("http://127.0.0.1:1".to_string()),
            timeout_seconds: 2,
            local_path: dir.path().join("drafts.json").to_string_lossy().into_owned(),
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_local_when_remote_unreachable() {
        let dir = TempDir::new().unwrap();
        let repo = TwoTierDraftRepository::from_config(&unreachable_config(&dir)).unwrap();
        assert!(repo.has_remote());

        let saved = repo.save_draft(QuotationDraft::default()).await.unwrap();
        assert_eq!(saved.tier, Tier::Local);

        let listed = repo.list_drafts().await.unwrap();
        assert_eq!(listed.tier, Tier::Local);
        assert_eq!(listed.value.len(), 1);
        assert_eq!(listed.value[0].id, saved.value.id);

        let found = repo.get_draft(&saved.value.id).await.unwrap();
        assert_eq!(found.value, Some(saved.value.clone()));
    }

    #[tokio::test]
    async fn test_local_only_without_base_url() {
        let dir = TempDir::new().unwrap();
        let mut config = unreachable_config(&dir);
        config.base_url = None;

        let repo = TwoTierDraftRepository::from_config(&config).unwrap();
        assert!(!repo.has_remote());
        let loaded = repo.load_smtp().await.unwrap();
        assert_eq!(loaded.tier, Tier::Local);
        assert!(loaded.value.is_none());
    }

    #[tokio::test]
    async fn test_local_errors_still_surface() {
        let dir = TempDir::new().unwrap();
        let repo = TwoTierDraftRepository::from_config(&unreachable_config(&dir)).unwrap();
        assert!(repo.delete_draft("QT-missing").await.is_err());
    }
}
