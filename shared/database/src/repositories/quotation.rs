//! Quotation Draft Repository
//!
//! Each draft is stored under its own key. A side list of summaries is kept
//! under a single index key for list screens.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use ykk_models::{QuotationDraft, QuotationSummary};
use ykk_utils::{PortalError, PortalResult};

use super::storage_error;
use crate::kv::KvBackend;

pub struct QuotationRepository {
    kv: KvBackend,
    prefix: String,
    // Serializes read-modify-write of the index list
    index_lock: Mutex<()>,
}

impl QuotationRepository {
    pub fn new(kv: KvBackend, prefix: impl Into<String>) -> Self {
        Self {
            kv,
            prefix: prefix.into(),
            index_lock: Mutex::new(()),
        }
    }

    fn record_key(&self, id: &str) -> String {
        format!("{}quotation:{}", self.prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}quotations:index", self.prefix)
    }

    /// Stores a draft, assigning an id when missing, and upserts its index entry.
    pub async fn save_draft(&self, mut draft: QuotationDraft) -> PortalResult<QuotationDraft> {
        draft.stamp(Utc::now());

        let body = serde_json::to_string(&draft)?;
        self.kv
            .set(&self.record_key(&draft.id), body)
            .await
            .map_err(storage_error)?;

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let summary = draft.summary();
        match index.iter_mut().find(|entry| entry.id == draft.id) {
            Some(entry) => *entry = summary,
            None => index.insert(0, summary),
        }
        self.write_index(&index).await?;

        info!(quotation_id = %draft.id, items = draft.items.len(), "Saved quotation draft");
        Ok(draft)
    }

    pub async fn find_by_id(&self, id: &str) -> PortalResult<Option<QuotationDraft>> {
        let raw = self.kv.get(&self.record_key(id)).await.map_err(storage_error)?;
        match raw {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Index entries, most recently created first.
    pub async fn list(&self) -> PortalResult<Vec<QuotationSummary>> {
        self.read_index().await
    }

    pub async fn delete(&self, id: &str) -> PortalResult<()> {
        let existed = self.kv.delete(&self.record_key(id)).await.map_err(storage_error)?;

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|entry| entry.id != id);
        let indexed = index.len() != before;
        if indexed {
            self.write_index(&index).await?;
        }

        if !existed && !indexed {
            return Err(PortalError::not_found(format!("quotation {}", id)));
        }
        info!(quotation_id = %id, "Deleted quotation draft");
        Ok(())
    }

    async fn read_index(&self) -> PortalResult<Vec<QuotationSummary>> {
        let raw = self.kv.get(&self.index_key()).await.map_err(storage_error)?;
        match raw {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_index(&self, index: &[QuotationSummary]) -> PortalResult<()> {
        debug!(entries = index.len(), "Writing quotation index");
        let body = serde_json::to_string(index)?;
        self.kv.set(&self.index_key(), body).await.map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ykk_models::{CustomerInfo, QuotationItem};

    fn repository() -> QuotationRepository {
        QuotationRepository::new(KvBackend::memory(), "test:")
    }

    fn draft(name: &str) -> QuotationDraft {
        QuotationDraft {
            customer_info: CustomerInfo {
                name: name.to_string(),
                ..CustomerInfo::default()
            },
            items: vec![QuotationItem {
                product_code: "CW-01".to_string(),
                quantity: 2.0,
                unit_price: 150.0,
                ..QuotationItem::default()
            }],
            ..QuotationDraft::default()
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_indexes() {
        let repo = repository();
        let saved = repo.save_draft(draft("Tanaka")).await.unwrap();
        assert!(saved.id.starts_with("QT-"));
        assert!(saved.created_at.is_some());

        let found = repo.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(found, saved);

        let index = repo.list().await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].customer_name, "Tanaka");
        assert_eq!(index[0].total, 300.0);
    }

    #[tokio::test]
    async fn test_resave_updates_index_entry_in_place() {
        let repo = repository();
        let first = repo.save_draft(draft("A")).await.unwrap();
        repo.save_draft(draft("B")).await.unwrap();

        let mut edited = first.clone();
        edited.customer_info.name = "A2".to_string();
        let resaved = repo.save_draft(edited).await.unwrap();
        assert_eq!(resaved.id, first.id);
        assert_eq!(resaved.created_at, first.created_at);

        let index = repo.list().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.iter().filter(|e| e.id == first.id).count(), 1);
        assert!(index.iter().any(|e| e.customer_name == "A2"));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_index_entry() {
        let repo = repository();
        let saved = repo.save_draft(draft("Sato")).await.unwrap();

        repo.delete(&saved.id).await.unwrap();
        assert!(repo.find_by_id(&saved.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());

        assert!(matches!(
            repo.delete(&saved.id).await,
            Err(PortalError::NotFound { .. })
        ));
    }
}
