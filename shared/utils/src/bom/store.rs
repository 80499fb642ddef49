//! BOM Part Record Store
//!
//! Ordered part list owned by a single BOM. Insertion order drives the `#`
//! row numbering shown on screens and exports.

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use ykk_models::{BomVariant, PartDraft, PartId, PartPatch, PartRecord};

use crate::error::{PortalError, PortalResult};
use crate::validation::validate_model;

#[derive(Debug, Clone, Serialize)]
pub struct BomPartStore {
    variant: BomVariant,
    parts: Vec<PartRecord>,
    #[serde(skip)]
    next_id: PartId,
    /// Ticket of the open revision, if any
    #[serde(skip)]
    revision: Option<Uuid>,
}

impl BomPartStore {
    pub fn new(variant: BomVariant) -> Self {
        Self {
            variant,
            parts: Vec::new(),
            next_id: 1,
            revision: None,
        }
    }

    pub fn variant(&self) -> BomVariant {
        self.variant
    }

    pub fn list(&self) -> &[PartRecord] {
        &self.parts
    }

    pub fn get(&self, id: PartId) -> Option<&PartRecord> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_under_revision(&self) -> bool {
        self.revision.is_some()
    }

    /// Validates and appends a new part, returning its id.
    pub fn add(&mut self, draft: PartDraft) -> PortalResult<PartId> {
        self.ensure_unlocked("add parts")?;
        let draft = self.prepare(draft)?;
        Ok(self.push(draft))
    }

    /// Appends every draft, or none when any of them fails validation.
    pub fn add_all(&mut self, drafts: Vec<PartDraft>) -> PortalResult<Vec<PartId>> {
        self.ensure_unlocked("import parts")?;
        let prepared = drafts
            .into_iter()
            .map(|draft| self.prepare(draft))
            .collect::<PortalResult<Vec<_>>>()?;

        let ids: Vec<PartId> = prepared.into_iter().map(|draft| self.push(draft)).collect();
        info!(count = ids.len(), variant = %self.variant, "Imported parts into BOM store");
        Ok(ids)
    }

    /// Merges a patch into an existing part. The merged record must still validate.
    pub fn update(&mut self, id: PartId, patch: PartPatch) -> PortalResult<&PartRecord> {
        self.ensure_unlocked("update parts")?;
        if patch.color.is_some() && self.variant == BomVariant::Outer {
            return Err(PortalError::validation("color", "Outer BOM parts do not carry a color"));
        }

        let index = self.index_of(id)?;
        let mut merged = self.parts[index].clone();
        merged.apply(patch);
        validate_model(&merged.to_draft())?;

        self.parts[index] = merged;
        debug!(part_id = id, "Updated part");
        Ok(&self.parts[index])
    }

    pub fn delete(&mut self, id: PartId) -> PortalResult<PartRecord> {
        self.ensure_unlocked("delete parts")?;
        let index = self.index_of(id)?;
        let removed = self.parts.remove(index);
        info!(part_id = id, part_code = %removed.part_code, "Deleted part");
        Ok(removed)
    }

    /// Locks the store and hands out the ticket that later commits or releases it.
    pub(crate) fn lock_for_revision(&mut self) -> PortalResult<Uuid> {
        if self.revision.is_some() {
            return Err(PortalError::conflict("A revision is already open for this BOM"));
        }
        let ticket = Uuid::new_v4();
        self.revision = Some(ticket);
        Ok(ticket)
    }

    /// Fails unless `ticket` is the one issued for the open revision.
    pub(crate) fn check_revision(&self, ticket: Uuid) -> PortalResult<()> {
        if self.revision != Some(ticket) {
            return Err(PortalError::conflict(
                "Revision session does not belong to this BOM store",
            ));
        }
        Ok(())
    }

    pub(crate) fn release_revision(&mut self, ticket: Uuid) -> PortalResult<()> {
        self.check_revision(ticket)?;
        self.revision = None;
        Ok(())
    }

    /// Installs a committed working copy. Ids and count are unchanged by a revision.
    pub(crate) fn commit_revision(&mut self, ticket: Uuid, parts: Vec<PartRecord>) -> PortalResult<()> {
        self.check_revision(ticket)?;
        self.parts = parts;
        self.revision = None;
        Ok(())
    }

    fn ensure_unlocked(&self, action: &str) -> PortalResult<()> {
        if self.revision.is_some() {
            return Err(PortalError::conflict(format!(
                "Cannot {} while a revision is in progress",
                action
            )));
        }
        Ok(())
    }

    fn prepare(&self, mut draft: PartDraft) -> PortalResult<PartDraft> {
        validate_model(&draft)?;
        if self.variant == BomVariant::Outer {
            draft.color = None;
        }
        Ok(draft)
    }

    fn push(&mut self, draft: PartDraft) -> PartId {
        let id = self.next_id;
        self.next_id += 1;
        self.parts.push(PartRecord::from_draft(id, draft));
        id
    }

    fn index_of(&self, id: PartId) -> PortalResult<usize> {
        self.parts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PortalError::not_found(format!("part {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ykk_models::MaterialType;

    fn draft(code: &str) -> PartDraft {
        PartDraft::new(code, "Frame jamb", MaterialType::Profile)
    }

    #[test]
    fn test_add_assigns_unique_ids_in_order() {
        let mut store = BomPartStore::new(BomVariant::Outer);
        let a = store.add(draft("PF-001")).unwrap();
        let b = store.add(draft("PF-002")).unwrap();
        assert_ne!(a, b);

        let codes: Vec<&str> = store.list().iter().map(|p| p.part_code.as_str()).collect();
        assert_eq!(codes, vec!["PF-001", "PF-002"]);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = BomPartStore::new(BomVariant::Outer);
        let a = store.add(draft("PF-001")).unwrap();
        store.delete(a).unwrap();
        let b = store.add(draft("PF-002")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_add_rejects_blank_description() {
        let mut store = BomPartStore::new(BomVariant::Inner);
        let result = store.add(PartDraft::new("PF-001", " ", MaterialType::Glass));
        assert!(matches!(result, Err(PortalError::Validation { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_all_is_all_or_nothing() {
        let mut store = BomPartStore::new(BomVariant::Outer);
        let result = store.add_all(vec![draft("PF-001"), draft("")]);
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_outer_store_drops_color() {
        let mut store = BomPartStore::new(BomVariant::Outer);
        let mut d = draft("PF-001");
        d.color = Some("Black".to_string());
        let id = store.add(d).unwrap();
        assert_eq!(store.get(id).unwrap().color, None);

        let patch = PartPatch {
            color: Some("Black".to_string()),
            ..PartPatch::default()
        };
        assert!(store.update(id, patch).is_err());
    }

    #[test]
    fn test_update_merges_and_validates() {
        let mut store = BomPartStore::new(BomVariant::Inner);
        let id = store.add(draft("PF-001")).unwrap();

        let updated = store
            .update(
                id,
                PartPatch {
                    quantity: Some(4),
                    color: Some("Bronze".to_string()),
                    ..PartPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.color.as_deref(), Some("Bronze"));

        let blanked = store.update(
            id,
            PartPatch {
                part_code: Some(String::new()),
                ..PartPatch::default()
            },
        );
        assert!(blanked.is_err());
        assert_eq!(store.get(id).unwrap().part_code, "PF-001");
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let mut store = BomPartStore::new(BomVariant::Outer);
        assert!(matches!(store.delete(42), Err(PortalError::NotFound { .. })));
        assert!(matches!(
            store.update(42, PartPatch::default()),
            Err(PortalError::NotFound { .. })
        ));
    }

    #[test]
    fn test_structural_changes_blocked_during_revision() {
        let mut store = BomPartStore::new(BomVariant::Outer);
        let id = store.add(draft("PF-001")).unwrap();
        let ticket = store.lock_for_revision().unwrap();

        assert!(matches!(store.add(draft("PF-002")), Err(PortalError::Conflict { .. })));
        assert!(matches!(store.delete(id), Err(PortalError::Conflict { .. })));
        assert!(store.lock_for_revision().is_err());

        assert!(store.release_revision(Uuid::new_v4()).is_err());
        assert!(store.is_under_revision());
        store.release_revision(ticket).unwrap();
        assert!(store.add(draft("PF-002")).is_ok());
    }
}
