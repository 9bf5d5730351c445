// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for workflow rule enforcement at the API boundary: rejection
//! rules, closure preconditions, the superadmin override, and stale
//! writes.

use super::helpers::{
    CHARGE, CONDUCTEUR, DEMANDEUR, RESPONSABLE, SUPERADMIN, act, action, created_material,
    drive_to_final, setup,
};
use crate::request_response::{DemandeActionKind, ForceStatusRequest};
use crate::{ApiError, act_on_demande, force_demande_status};
use demande_domain::{DemandeStatus, MAX_REJETS};

fn reject_with(motif: &str) -> crate::request_response::ActionRequest {
    let mut request = action(DemandeActionKind::Reject);
    request.commentaire = Some(String::from(motif));
    request
}

#[test]
fn test_rejection_rolls_back_and_notifies_previous_validator() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);
    act(&store, &notifier, demande.demande_id, CONDUCTEUR, DemandeActionKind::Validate).unwrap();
    act(&store, &notifier, demande.demande_id, RESPONSABLE, DemandeActionKind::Validate).unwrap();

    let rejected = act_on_demande(
        &store,
        &notifier,
        demande.demande_id,
        CHARGE,
        reject_with("missing spec sheet"),
    )
    .unwrap();

    assert_eq!(
        rejected.statut,
        DemandeStatus::EnAttenteValidationResponsableTravaux
    );
    assert_eq!(rejected.nombre_rejets, 1);
    assert_eq!(
        rejected.statut_precedent,
        Some(DemandeStatus::EnAttenteValidationChargeAffaire)
    );

    let sent = notifier.sent();
    let last = sent.last().unwrap();
    assert_eq!(last.recipients, vec![RESPONSABLE]);
    assert!(last.message.contains(&rejected.numero));
    assert!(last.message.contains("charge_affaire"));
    assert!(last.message.contains("missing spec sheet"));
}

#[test]
fn test_rejection_without_comment_is_invalid_input() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);
    act(&store, &notifier, demande.demande_id, CONDUCTEUR, DemandeActionKind::Validate).unwrap();

    let result = act_on_demande(
        &store,
        &notifier,
        demande.demande_id,
        RESPONSABLE,
        action(DemandeActionKind::Reject),
    );

    assert!(matches!(
        result.unwrap_err(),
        ApiError::InvalidInput { .. }
    ));
}

#[test]
fn test_rejection_ceiling_surfaces_as_state_violation() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    for round in 0..MAX_REJETS {
        act(&store, &notifier, demande.demande_id, CONDUCTEUR, DemandeActionKind::Validate)
            .unwrap();
        let rejected = act_on_demande(
            &store,
            &notifier,
            demande.demande_id,
            RESPONSABLE,
            reject_with("incomplet"),
        )
        .unwrap();
        assert_eq!(rejected.nombre_rejets, round + 1);
    }

    act(&store, &notifier, demande.demande_id, CONDUCTEUR, DemandeActionKind::Validate).unwrap();
    let result = act_on_demande(
        &store,
        &notifier,
        demande.demande_id,
        RESPONSABLE,
        reject_with("encore"),
    );

    match result.unwrap_err() {
        ApiError::StateViolation { rule, message } => {
            assert_eq!(rule, "rejection_ceiling");
            assert!(message.contains("create a new demande"));
        }
        other => panic!("expected state violation, got {other}"),
    }
}

#[test]
fn test_closure_by_non_requester_is_unauthorized() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);
    drive_to_final(&store, &notifier, demande.demande_id);

    let result = act(
        &store,
        &notifier,
        demande.demande_id,
        CHARGE,
        DemandeActionKind::Close,
    );

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
}

#[test]
fn test_closure_outside_final_validation_is_a_state_violation() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    let result = act(
        &store,
        &notifier,
        demande.demande_id,
        DEMANDEUR,
        DemandeActionKind::Close,
    );

    assert!(matches!(
        result.unwrap_err(),
        ApiError::StateViolation { .. }
    ));
}

#[test]
fn test_force_status_by_superadmin_notifies_bypassed_validators() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    let forced = force_demande_status(
        &store,
        &notifier,
        demande.demande_id,
        SUPERADMIN,
        ForceStatusRequest {
            target: DemandeStatus::EnAttenteReceptionLivreur,
            motif: String::from("urgence chantier"),
        },
    )
    .unwrap();

    assert_eq!(forced.statut, DemandeStatus::EnAttenteReceptionLivreur);

    let sent = notifier.sent();
    let last = sent.last().unwrap();
    // Conducteur, responsable, charge d'affaire, and appro were bypassed.
    assert_eq!(last.recipients.len(), 4);
    assert!(last.message.contains("bypassed"));
}

#[test]
fn test_force_status_by_regular_validator_is_unauthorized() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    let result = force_demande_status(
        &store,
        &notifier,
        demande.demande_id,
        CHARGE,
        ForceStatusRequest {
            target: DemandeStatus::Cloturee,
            motif: String::from("raccourci"),
        },
    );

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
}

#[test]
fn test_admin_archives_only_closed_demandes() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);
    drive_to_final(&store, &notifier, demande.demande_id);

    // Not closed yet.
    let early = crate::archive_demande(&store, demande.demande_id, SUPERADMIN);
    match early.unwrap_err() {
        ApiError::StateViolation { rule, .. } => assert_eq!(rule, "archive_requires_closed"),
        other => panic!("expected state violation, got {other}"),
    }

    act(&store, &notifier, demande.demande_id, DEMANDEUR, DemandeActionKind::Close).unwrap();

    // The requester cannot archive.
    let as_owner = crate::archive_demande(&store, demande.demande_id, DEMANDEUR);
    assert!(matches!(as_owner.unwrap_err(), ApiError::Unauthorized { .. }));

    let archived = crate::archive_demande(&store, demande.demande_id, SUPERADMIN).unwrap();
    assert_eq!(archived.statut, DemandeStatus::Archivee);
}

#[test]
fn test_stale_write_surfaces_as_conflict() {
    let (store, _notifier) = setup();
    let demande = created_material(&store, &_notifier);

    // A concurrent actor moves the demande between this handler's load
    // and its commit; the conditional write must refuse the stale
    // expected status.
    let state = store.get_state(demande.demande_id).unwrap();
    let mut moved = state.demande.clone();
    moved.statut = DemandeStatus::EnAttenteValidationResponsableTravaux;
    store
        .update_demande_if_status(
            demande.demande_id,
            DemandeStatus::EnAttenteValidationConducteur,
            moved,
            state.items.clone(),
        )
        .unwrap();

    let result = store.update_demande_if_status(
        demande.demande_id,
        DemandeStatus::EnAttenteValidationConducteur,
        state.demande,
        state.items,
    );
    let translated = crate::translate_persistence_error(result.unwrap_err());

    assert!(matches!(translated, ApiError::Conflict { .. }));
    assert_eq!(translated.kind(), "conflict");
}
