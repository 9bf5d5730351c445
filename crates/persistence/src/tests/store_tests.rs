// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for store CRUD, includes, and append-only collections.

use super::{demande, items};
use crate::{DemandeStore, PersistenceError};
use demande_audit::{Action, Actor, AuditEvent, Cause};
use demande_domain::{DemandeKind, DemandeStatus, Role, Utilisateur};

fn event(action: &str) -> AuditEvent {
    AuditEvent::new(
        Actor::new(1, String::from("u"), Role::Employe),
        Cause::new(String::from("req-1"), String::from("test")),
        Action::new(String::from(action), None),
        None,
        DemandeStatus::EnAttenteValidationConducteur,
        None,
    )
}

#[test]
fn test_insert_assigns_ids() {
    let store = DemandeStore::new();
    let record = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::EnAttenteValidationConducteur),
            items(),
        )
        .unwrap();

    assert_eq!(record.demande.demande_id, Some(1));
    assert_eq!(record.items[0].item_id, Some(1));
}

#[test]
fn test_get_demande_not_found() {
    let store = DemandeStore::new();
    let result = store.get_demande(404);
    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::DemandeNotFound(404)
    ));
}

#[test]
fn test_state_includes_sub_demande_statuses() {
    let store = DemandeStore::new();
    let parent = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::EnAttenteValidationFinale),
            items(),
        )
        .unwrap();
    let parent_id = parent.demande.demande_id.unwrap();

    let mut sous = demande("MAT-2026-0002", DemandeStatus::EnAttenteValidationConducteur);
    sous.kind = DemandeKind::SousDemande;
    sous.demande_parent_id = Some(parent_id);
    store.insert_demande(sous, items()).unwrap();

    let state = store.get_state(parent_id).unwrap();
    assert_eq!(
        state.sous_demandes,
        vec![DemandeStatus::EnAttenteValidationConducteur]
    );
    assert_eq!(store.sous_demandes_of(parent_id).unwrap().len(), 1);
}

#[test]
fn test_conditional_update_applies_on_matching_status() {
    let store = DemandeStore::new();
    let record = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::EnAttenteValidationConducteur),
            items(),
        )
        .unwrap();
    let id = record.demande.demande_id.unwrap();

    let mut updated = record.demande.clone();
    updated.statut = DemandeStatus::EnAttenteValidationResponsableTravaux;

    let written = store
        .update_demande_if_status(
            id,
            DemandeStatus::EnAttenteValidationConducteur,
            updated,
            record.items,
        )
        .unwrap();

    assert_eq!(
        written.demande.statut,
        DemandeStatus::EnAttenteValidationResponsableTravaux
    );
    // The write stamps the modification timestamp.
    assert_ne!(written.demande.modifie_le, written.demande.cree_le);
}

#[test]
fn test_conditional_update_refuses_stale_status() {
    let store = DemandeStore::new();
    let record = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::EnAttenteValidationResponsableTravaux),
            items(),
        )
        .unwrap();
    let id = record.demande.demande_id.unwrap();

    let result = store.update_demande_if_status(
        id,
        DemandeStatus::EnAttenteValidationConducteur,
        record.demande.clone(),
        record.items,
    );

    match result.unwrap_err() {
        PersistenceError::Conflict {
            demande_id,
            expected,
            actual,
        } => {
            assert_eq!(demande_id, id);
            assert_eq!(expected, DemandeStatus::EnAttenteValidationConducteur);
            assert_eq!(actual, DemandeStatus::EnAttenteValidationResponsableTravaux);
        }
        other => panic!("expected conflict, got {other}"),
    }
}

#[test]
fn test_history_is_append_only_and_ordered() {
    let store = DemandeStore::new();
    store.append_history(1, event("Creer")).unwrap();
    store.append_history(1, event("Valider")).unwrap();

    let history = store.history(1).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].event_id < history[1].event_id);
    assert_eq!(history[0].event.action.name, "Creer");
}

#[test]
fn test_delete_cascades_dependent_records() {
    let store = DemandeStore::new();
    let record = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::Brouillon),
            items(),
        )
        .unwrap();
    let id = record.demande.demande_id.unwrap();
    store.append_history(id, event("Creer")).unwrap();

    store.delete_demande(id).unwrap();

    assert!(store.get_demande(id).is_err());
    assert!(store.history(id).unwrap().is_empty());
    // The number stays reserved: deletion never frees a numero.
    assert!(!store.reserve_numero("MAT-2026-0001").unwrap());
}

#[test]
fn test_deliveries_sum_per_line() {
    let store = DemandeStore::new();
    let record = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::EnAttenteReceptionLivreur),
            items(),
        )
        .unwrap();
    let id = record.demande.demande_id.unwrap();
    let item_id = record.items[0].item_id.unwrap();

    store.add_delivery(id, item_id, 6).unwrap();
    store.add_delivery(id, item_id, 4).unwrap();

    assert_eq!(store.delivered_total(id, item_id).unwrap(), 10);
}

#[test]
fn test_delivery_against_unknown_item_fails() {
    let store = DemandeStore::new();
    let record = store
        .insert_demande(
            demande("MAT-2026-0001", DemandeStatus::EnAttenteReceptionLivreur),
            items(),
        )
        .unwrap();
    let id = record.demande.demande_id.unwrap();

    let result = store.add_delivery(id, 99, 1);
    assert!(matches!(
        result.unwrap_err(),
        PersistenceError::ItemNotFound { item_id: 99, .. }
    ));
}

#[test]
fn test_role_project_recipient_lookup() {
    let store = DemandeStore::new();
    store
        .add_user(Utilisateur::new(
            1,
            String::from("a"),
            Role::ChargeAffaire,
            vec![10],
        ))
        .unwrap();
    store
        .add_user(Utilisateur::new(
            2,
            String::from("b"),
            Role::ChargeAffaire,
            vec![20],
        ))
        .unwrap();
    store
        .add_user(Utilisateur::new(3, String::from("c"), Role::Livreur, vec![10]))
        .unwrap();

    let recipients = store
        .users_with_role_in_project(Role::ChargeAffaire, 10)
        .unwrap();

    assert_eq!(recipients.len(), 1);
    assert_eq!(recipients[0].user_id, 1);
}
