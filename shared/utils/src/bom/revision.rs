//! Revision Session
//!
//! Two-phase edit of a BOM part list: cell edits go to a working copy, `save`
//! diffs it against the baseline taken at `begin`, and only `confirm` writes
//! the working copy back into the store.
//!
//! ```text
//! Idle --begin--> Active --save--> ReviewingChanges --confirm--> Idle
//!                   ^  |                 |
//!                   |  +--cancel--> Idle +--back--> Active
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;
use ykk_models::{BomVariant, PartField, PartId, PartRecord};

use super::store::BomPartStore;
use crate::error::{PortalError, PortalResult};
use crate::validation::validate_model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevisionState {
    /// No revision open
    Idle,
    /// Cells are being edited on the working copy
    Active,
    /// A non-empty change set is waiting for confirmation
    ReviewingChanges,
}

impl fmt::Display for RevisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
            Self::ReviewingChanges => write!(f, "reviewing changes"),
        }
    }
}

/// One field-level difference between baseline and working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub part_id: PartId,
    pub part_code: String,
    pub field: PartField,
    pub old_value: String,
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SaveOutcome {
    /// Nothing differed; the session ended without committing.
    NoChanges,
    /// The session is waiting for `confirm` or `back`.
    Review { changes: Vec<Change> },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSession {
    state: RevisionState,
    #[serde(skip)]
    ticket: Option<Uuid>,
    variant: Option<BomVariant>,
    baseline: Vec<PartRecord>,
    working: Vec<PartRecord>,
    changes: Vec<Change>,
}

impl Default for RevisionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionSession {
    pub fn new() -> Self {
        Self {
            state: RevisionState::Idle,
            ticket: None,
            variant: None,
            baseline: Vec::new(),
            working: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn state(&self) -> RevisionState {
        self.state
    }

    pub fn baseline(&self) -> &[PartRecord] {
        &self.baseline
    }

    pub fn working_copy(&self) -> &[PartRecord] {
        &self.working
    }

    /// Change set computed by the last `save`, empty outside review.
    pub fn pending_changes(&self) -> &[Change] {
        &self.changes
    }

    /// Snapshots the store and locks it against structural changes.
    pub fn begin(&mut self, store: &mut BomPartStore) -> PortalResult<()> {
        self.expect(RevisionState::Idle, "begin a revision")?;
        self.ticket = Some(store.lock_for_revision()?);
        self.variant = Some(store.variant());
        self.baseline = store.list().to_vec();
        self.working = store.list().to_vec();
        self.changes.clear();
        self.state = RevisionState::Active;

        info!(parts = self.baseline.len(), "Revision session started");
        Ok(())
    }

    /// Edits one cell of the working copy. The edited record must still
    /// validate; a rejected edit leaves the working copy unchanged.
    pub fn edit_cell(&mut self, id: PartId, field: PartField, value: &str) -> PortalResult<()> {
        self.expect(RevisionState::Active, "edit cells")?;
        if field == PartField::Color && self.variant == Some(BomVariant::Outer) {
            return Err(PortalError::validation("color", "Outer BOM parts do not carry a color"));
        }

        let index = self
            .working
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PortalError::not_found(format!("part {}", id)))?;

        let mut edited = self.working[index].clone();
        edited
            .set_field(field, value)
            .map_err(|message| PortalError::validation(field.as_str(), message))?;
        validate_model(&edited.to_draft())?;
        self.working[index] = edited;

        debug!(part_id = id, field = %field, "Edited revision cell");
        Ok(())
    }

    /// Diffs the working copy. An empty diff ends the session.
    pub fn save(&mut self, store: &mut BomPartStore) -> PortalResult<SaveOutcome> {
        self.expect(RevisionState::Active, "save")?;
        let ticket = self.claim(store)?;

        let changes = compute_change_set(&self.baseline, &self.working);
        if changes.is_empty() {
            info!("No changes detected, closing revision session");
            store.release_revision(ticket)?;
            self.reset();
            return Ok(SaveOutcome::NoChanges);
        }

        info!(changes = changes.len(), "Revision changes ready for review");
        self.changes = changes.clone();
        self.state = RevisionState::ReviewingChanges;
        Ok(SaveOutcome::Review { changes })
    }

    /// Commits the working copy into the store and returns the applied changes.
    pub fn confirm(&mut self, store: &mut BomPartStore) -> PortalResult<Vec<Change>> {
        self.expect(RevisionState::ReviewingChanges, "confirm")?;
        let ticket = self.claim(store)?;

        let working = std::mem::take(&mut self.working);
        let changes = std::mem::take(&mut self.changes);
        store.commit_revision(ticket, working)?;
        self.reset();

        info!(changes = changes.len(), "Revision committed");
        Ok(changes)
    }

    /// Leaves review and returns to editing with the working copy intact.
    pub fn back(&mut self) -> PortalResult<()> {
        self.expect(RevisionState::ReviewingChanges, "go back to editing")?;
        self.changes.clear();
        self.state = RevisionState::Active;
        Ok(())
    }

    /// Abandons the revision. The store is left exactly as it was at `begin`.
    pub fn cancel(&mut self, store: &mut BomPartStore) -> PortalResult<()> {
        if self.state == RevisionState::Idle {
            return Err(PortalError::invalid_transition(self.state.to_string(), "cancel"));
        }
        let ticket = self.claim(store)?;
        store.release_revision(ticket)?;
        self.reset();
        info!("Revision cancelled");
        Ok(())
    }

    fn expect(&self, state: RevisionState, action: &str) -> PortalResult<()> {
        if self.state != state {
            return Err(PortalError::invalid_transition(self.state.to_string(), action));
        }
        Ok(())
    }

    /// Ticket of the open revision, checked against the store it was issued by.
    fn claim(&self, store: &BomPartStore) -> PortalResult<Uuid> {
        let ticket = self
            .ticket
            .ok_or_else(|| PortalError::invalid_transition(self.state.to_string(), "use the store"))?;
        store.check_revision(ticket)?;
        Ok(ticket)
    }

    fn reset(&mut self) {
        self.state = RevisionState::Idle;
        self.ticket = None;
        self.variant = None;
        self.baseline.clear();
        self.working.clear();
        self.changes.clear();
    }
}

/// Field-by-field diff of records matched by position. Added or removed
/// records are ignored; a revision cannot change the record count.
pub fn compute_change_set(baseline: &[PartRecord], working: &[PartRecord]) -> Vec<Change> {
    baseline
        .iter()
        .zip(working.iter())
        .flat_map(|(before, after)| {
            PartField::ALL.iter().filter_map(move |&field| {
                let old_value = before.value_of(field);
                let new_value = after.value_of(field);
                (old_value != new_value).then(|| Change {
                    part_id: before.id,
                    part_code: before.part_code.clone(),
                    field,
                    old_value,
                    new_value,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ykk_models::{MaterialType, PartDraft};

    fn store_with_parts(variant: BomVariant) -> (BomPartStore, PartId, PartId) {
        let mut store = BomPartStore::new(variant);
        let mut first = PartDraft::new("PF-001", "Outer frame head", MaterialType::Profile);
        first.note = "a".to_string();
        let a = store.add(first).unwrap();
        let b = store
            .add(PartDraft::new("GK-010", "Glazing gasket", MaterialType::Gasket))
            .unwrap();
        (store, a, b)
    }

    #[test]
    fn test_begin_snapshots_store() {
        let (mut store, _, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();

        assert_eq!(session.state(), RevisionState::Active);
        assert_eq!(session.working_copy(), store.list());
        assert_eq!(session.baseline(), store.list());
        assert!(store.is_under_revision());
    }

    #[test]
    fn test_edits_never_touch_baseline_or_store() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(a, PartField::Quantity, "2").unwrap();

        assert_eq!(session.working_copy()[0].quantity, 2);
        assert_eq!(session.baseline()[0].quantity, 1);
        assert_eq!(store.list()[0].quantity, 1);
    }

    #[test]
    fn test_single_field_change_set() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(a, PartField::Quantity, "2").unwrap();

        let outcome = session.save(&mut store).unwrap();
        let expected = vec![Change {
            part_id: a,
            part_code: "PF-001".to_string(),
            field: PartField::Quantity,
            old_value: "1".to_string(),
            new_value: "2".to_string(),
        }];
        assert_eq!(outcome, SaveOutcome::Review { changes: expected.clone() });
        assert_eq!(session.state(), RevisionState::ReviewingChanges);
        assert_eq!(session.pending_changes(), expected.as_slice());
    }

    #[test]
    fn test_save_without_changes_returns_to_idle() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let before = store.list().to_vec();
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        // Edit and revert
        session.edit_cell(a, PartField::Note, "b").unwrap();
        session.edit_cell(a, PartField::Note, "a").unwrap();

        assert_eq!(session.save(&mut store).unwrap(), SaveOutcome::NoChanges);
        assert_eq!(session.state(), RevisionState::Idle);
        assert!(session.working_copy().is_empty());
        assert!(!store.is_under_revision());
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_confirm_commits_working_copy() {
        let (mut store, a, b) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(a, PartField::CutFormula, "W - 40").unwrap();
        session.edit_cell(b, PartField::MaterialType, "sealant").unwrap();
        session.save(&mut store).unwrap();

        let applied = session.confirm(&mut store).unwrap();
        assert_eq!(applied.len(), 2);
        assert_eq!(store.get(a).unwrap().cut_formula, "W - 40");
        assert_eq!(store.get(b).unwrap().material_type, MaterialType::Sealant);
        assert_eq!(session.state(), RevisionState::Idle);
        assert!(!store.is_under_revision());
    }

    #[test]
    fn test_back_keeps_working_copy() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(a, PartField::Remarks, "re-check").unwrap();
        session.save(&mut store).unwrap();
        session.back().unwrap();

        assert_eq!(session.state(), RevisionState::Active);
        assert_eq!(session.working_copy()[0].remarks, "re-check");
        assert!(session.pending_changes().is_empty());
    }

    #[test]
    fn test_cancel_leaves_store_untouched() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let before = store.list().to_vec();
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(a, PartField::Description, "changed").unwrap();
        session.cancel(&mut store).unwrap();

        assert_eq!(store.list(), before.as_slice());
        assert_eq!(session.state(), RevisionState::Idle);
        assert!(store.add(PartDraft::new("X", "Y", MaterialType::Hardware)).is_ok());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();

        assert!(matches!(session.save(&mut store), Err(PortalError::InvalidTransition { .. })));
        assert!(session.edit_cell(a, PartField::Note, "x").is_err());
        assert!(session.cancel(&mut store).is_err());
        assert!(session.back().is_err());

        session.begin(&mut store).unwrap();
        assert!(session.begin(&mut store).is_err());
        assert!(session.confirm(&mut store).is_err());
        assert_eq!(session.state(), RevisionState::Active);
    }

    #[test]
    fn test_bad_cell_values_rejected() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();

        assert!(session.edit_cell(a, PartField::Quantity, "two").is_err());
        assert!(session.edit_cell(a, PartField::MaterialType, "Timber").is_err());
        assert!(session.edit_cell(a, PartField::Color, "Black").is_err());
        assert!(matches!(
            session.edit_cell(999, PartField::Note, "x"),
            Err(PortalError::NotFound { .. })
        ));
        assert_eq!(session.working_copy(), session.baseline());
    }

    #[test]
    fn test_edit_that_breaks_record_validation_is_rejected() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();

        assert!(matches!(
            session.edit_cell(a, PartField::PartCode, ""),
            Err(PortalError::Validation { .. })
        ));
        assert!(matches!(
            session.edit_cell(a, PartField::Quantity, "-7"),
            Err(PortalError::Validation { .. })
        ));
        assert_eq!(session.working_copy(), session.baseline());

        assert_eq!(session.save(&mut store).unwrap(), SaveOutcome::NoChanges);
        assert_eq!(store.get(a).unwrap().part_code, "PF-001");
        assert_eq!(store.get(a).unwrap().quantity, 1);
    }

    #[test]
    fn test_session_only_commits_to_its_own_store() {
        let (mut store, a, _) = store_with_parts(BomVariant::Outer);
        let (mut other, _, _) = store_with_parts(BomVariant::Outer);
        let other_before = other.list().to_vec();

        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(a, PartField::Note, "moved").unwrap();

        assert!(matches!(session.save(&mut other), Err(PortalError::Conflict { .. })));
        session.save(&mut store).unwrap();
        assert!(matches!(session.confirm(&mut other), Err(PortalError::Conflict { .. })));
        assert!(matches!(session.cancel(&mut other), Err(PortalError::Conflict { .. })));

        assert_eq!(other.list(), other_before.as_slice());
        assert_eq!(session.state(), RevisionState::ReviewingChanges);
        assert!(store.is_under_revision());

        session.confirm(&mut store).unwrap();
        assert_eq!(store.get(a).unwrap().note, "moved");
    }

    #[test]
    fn test_inner_color_edit_is_diffed() {
        let (mut store, _, b) = store_with_parts(BomVariant::Inner);
        let mut session = RevisionSession::new();
        session.begin(&mut store).unwrap();
        session.edit_cell(b, PartField::Color, "White").unwrap();

        match session.save(&mut store).unwrap() {
            SaveOutcome::Review { changes } => {
                assert_eq!(changes.len(), 1);
                assert_eq!(changes[0].field, PartField::Color);
                assert_eq!(changes[0].old_value, "");
                assert_eq!(changes[0].new_value, "White");
            }
            other => panic!("expected review, got {:?}", other),
        }
    }
}
