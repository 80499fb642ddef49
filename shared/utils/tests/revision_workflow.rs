//! Revision workflow scenarios run against the public BOM API.

use ykk_models::{BomVariant, MaterialType, PartDraft, PartField};
use ykk_utils::{BomPartStore, PortalError, RevisionSession, RevisionState, SaveOutcome};

fn seeded_store() -> BomPartStore {
    let mut store = BomPartStore::new(BomVariant::Inner);
    let mut jamb = PartDraft::new("PF-100", "Frame jamb", MaterialType::Profile);
    jamb.cut_formula = "H - 20".to_string();
    jamb.quantity = 2;
    let glass = PartDraft::new("GL-200", "Float glass 6mm", MaterialType::Glass);
    store.add_all(vec![jamb, glass]).unwrap();
    store
}

#[test]
fn edit_review_back_and_confirm() {
    let mut store = seeded_store();
    let ids: Vec<u64> = store.list().iter().map(|p| p.id).collect();
    let mut session = RevisionSession::new();

    session.begin(&mut store).unwrap();
    session.edit_cell(ids[0], PartField::Quantity, "4").unwrap();
    session.edit_cell(ids[1], PartField::Color, "Clear").unwrap();

    let changes = match session.save(&mut store).unwrap() {
        SaveOutcome::Review { changes } => changes,
        SaveOutcome::NoChanges => panic!("expected a change set"),
    };
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].part_code, "PF-100");
    assert_eq!(changes[0].old_value, "2");
    assert_eq!(changes[0].new_value, "4");
    assert_eq!(session.state(), RevisionState::ReviewingChanges);

    // Back keeps the working copy and allows more edits
    session.back().unwrap();
    session.edit_cell(ids[0], PartField::Note, "Check drainage slot").unwrap();
    assert!(matches!(session.save(&mut store).unwrap(), SaveOutcome::Review { .. }));

    // Nothing committed until confirm
    assert_eq!(store.get(ids[0]).unwrap().quantity, 2);

    let committed = session.confirm(&mut store).unwrap();
    assert_eq!(committed.len(), 3);
    assert_eq!(session.state(), RevisionState::Idle);
    assert_eq!(store.get(ids[0]).unwrap().quantity, 4);
    assert_eq!(store.get(ids[1]).unwrap().color.as_deref(), Some("Clear"));
    assert!(!store.is_under_revision());
}

#[test]
fn cancel_discards_edits_and_unlocks() {
    let mut store = seeded_store();
    let before = store.list().to_vec();
    let id = before[0].id;
    let mut session = RevisionSession::new();

    session.begin(&mut store).unwrap();
    session.edit_cell(id, PartField::Description, "Renamed").unwrap();
    assert!(matches!(
        store.add(PartDraft::new("X-1", "Extra", MaterialType::Hardware)),
        Err(PortalError::Conflict { .. })
    ));

    session.cancel(&mut store).unwrap();
    assert_eq!(store.list(), before.as_slice());
    assert!(store.add(PartDraft::new("X-1", "Extra", MaterialType::Hardware)).is_ok());
}

#[test]
fn unchanged_save_returns_to_idle() {
    let mut store = seeded_store();
    let id = store.list()[0].id;
    let mut session = RevisionSession::new();

    session.begin(&mut store).unwrap();
    session.edit_cell(id, PartField::Quantity, "3").unwrap();
    session.edit_cell(id, PartField::Quantity, "2").unwrap();

    assert!(matches!(session.save(&mut store).unwrap(), SaveOutcome::NoChanges));
    assert_eq!(session.state(), RevisionState::Idle);
    assert!(!store.is_under_revision());
}

#[test]
fn out_of_order_actions_are_rejected() {
    let mut store = seeded_store();
    let mut session = RevisionSession::new();

    assert!(matches!(
        session.save(&mut store),
        Err(PortalError::InvalidTransition { .. })
    ));
    assert!(session.confirm(&mut store).is_err());
    assert!(session.back().is_err());

    session.begin(&mut store).unwrap();
    assert!(session.begin(&mut store).is_err());
    assert!(session.confirm(&mut store).is_err());
}
