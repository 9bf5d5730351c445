// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for forward transitions: validate, prepare, receive, deliver.

use super::helpers::{cause, state_at, tooling_state_at, user};
use crate::{Command, CoreError, NotifyTarget, apply};
use demande_domain::{DemandeStatus, DomainError, Role};

fn validate_cmd() -> Command {
    Command::Validate {
        commentaire: None,
        quantites_validees: vec![],
    }
}

// ============================================================================
// Validate
// ============================================================================

#[test]
fn test_validator_advances_demande_one_step() {
    let state = state_at(DemandeStatus::EnAttenteValidationConducteur, 1);
    let conducteur = user(5, Role::ConducteurTravaux);

    let result = apply(&state, validate_cmd(), &conducteur, cause()).unwrap();

    assert_eq!(
        result.new_state.demande.statut,
        DemandeStatus::EnAttenteValidationResponsableTravaux
    );
    assert_eq!(
        result.audit_event.statut_avant,
        Some(DemandeStatus::EnAttenteValidationConducteur)
    );
    assert_eq!(
        result.notify,
        Some(NotifyTarget::Role(Role::ResponsableTravaux))
    );
    assert_eq!(result.signature.role, Role::ConducteurTravaux);
}

#[test]
fn test_wrong_role_cannot_validate() {
    let state = state_at(DemandeStatus::EnAttenteValidationConducteur, 1);
    let intrus = user(5, Role::Livreur);

    let result = apply(&state, validate_cmd(), &intrus, cause());

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::TransitionNotAllowed { .. })
    ));
}

#[test]
fn test_validate_command_refused_at_preparation_step() {
    let state = state_at(DemandeStatus::EnAttentePreparationAppro, 1);
    let appro = user(5, Role::Appro);

    let result = apply(&state, validate_cmd(), &appro, cause());

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::WrongActionForStatus { .. })
    ));
}

#[test]
fn test_validate_can_edit_validated_quantities() {
    let state = state_at(DemandeStatus::EnAttenteValidationChargeAffaire, 1);
    let charge = user(5, Role::ChargeAffaire);
    let command = Command::Validate {
        commentaire: Some(String::from("quantite reduite")),
        quantites_validees: vec![(1, 8)],
    };

    let result = apply(&state, command, &charge, cause()).unwrap();

    assert_eq!(result.new_state.items[0].quantite_validee, Some(8));
}

#[test]
fn test_quantity_edit_for_unknown_item_fails() {
    let state = state_at(DemandeStatus::EnAttenteValidationChargeAffaire, 1);
    let charge = user(5, Role::ChargeAffaire);
    let command = Command::Validate {
        commentaire: None,
        quantites_validees: vec![(99, 8)],
    };

    let result = apply(&state, command, &charge, cause());

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::ItemNotFound { item_id: 99 })
    ));
}

#[test]
fn test_terminal_demande_accepts_no_action() {
    let state = state_at(DemandeStatus::Cloturee, 1);
    let charge = user(5, Role::ChargeAffaire);

    let result = apply(&state, validate_cmd(), &charge, cause());

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::TerminalStatus { .. })
    ));
}

// ============================================================================
// Prepare / Receive / Deliver
// ============================================================================

#[test]
fn test_prepare_defaults_issued_to_validated() {
    let mut state = state_at(DemandeStatus::EnAttentePreparationAppro, 1);
    state.items[0].quantite_validee = Some(8);
    let appro = user(5, Role::Appro);
    let command = Command::Prepare {
        commentaire: None,
        quantites_sorties: vec![],
        livreur_id: Some(42),
    };

    let result = apply(&state, command, &appro, cause()).unwrap();

    assert_eq!(result.new_state.items[0].quantite_sortie, Some(8));
    assert_eq!(result.new_state.demande.livreur_id, Some(42));
    assert_eq!(
        result.new_state.demande.statut,
        DemandeStatus::EnAttenteReceptionLivreur
    );
    assert_eq!(result.notify, Some(NotifyTarget::Role(Role::Livreur)));
}

#[test]
fn test_prepare_records_partial_stock_issue() {
    let state = state_at(DemandeStatus::EnAttentePreparationAppro, 1);
    let appro = user(5, Role::Appro);
    let command = Command::Prepare {
        commentaire: Some(String::from("rupture partielle")),
        quantites_sorties: vec![(1, 7)],
        livreur_id: None,
    };

    let result = apply(&state, command, &appro, cause()).unwrap();

    assert_eq!(result.new_state.items[0].quantite_sortie, Some(7));
}

#[test]
fn test_tooling_preparation_is_done_by_logistique() {
    let state = tooling_state_at(DemandeStatus::EnAttentePreparationLogistique, 1);
    let logistique = user(5, Role::Logistique);
    let command = Command::Prepare {
        commentaire: None,
        quantites_sorties: vec![],
        livreur_id: None,
    };

    let result = apply(&state, command, &logistique, cause()).unwrap();

    assert_eq!(
        result.new_state.demande.statut,
        DemandeStatus::EnAttenteReceptionLivreur
    );
}

#[test]
fn test_appro_cannot_prepare_tooling() {
    let state = tooling_state_at(DemandeStatus::EnAttentePreparationLogistique, 1);
    let appro = user(5, Role::Appro);
    let command = Command::Prepare {
        commentaire: None,
        quantites_sorties: vec![],
        livreur_id: None,
    };

    let result = apply(&state, command, &appro, cause());

    assert!(matches!(
        result.unwrap_err(),
        CoreError::DomainViolation(DomainError::TransitionNotAllowed { .. })
    ));
}

#[test]
fn test_deliverer_receives_then_delivers() {
    let state = state_at(DemandeStatus::EnAttenteReceptionLivreur, 1);
    let livreur = user(5, Role::Livreur);

    let received = apply(
        &state,
        Command::Receive { commentaire: None },
        &livreur,
        cause(),
    )
    .unwrap();
    assert_eq!(
        received.new_state.demande.statut,
        DemandeStatus::EnAttenteLivraison
    );

    let delivered = apply(
        &received.new_state,
        Command::Deliver { commentaire: None },
        &livreur,
        cause(),
    )
    .unwrap();
    assert_eq!(
        delivered.new_state.demande.statut,
        DemandeStatus::EnAttenteValidationFinale
    );
    assert_eq!(delivered.notify, Some(NotifyTarget::Demandeur));
}

// ============================================================================
// Full Happy Path (spec example scenario)
// ============================================================================

#[test]
fn test_material_happy_path_end_to_end() {
    let demandeur = user(1, Role::Employe);
    let mut state = super::helpers::created(demande_domain::TypeDemande::Materiel, &demandeur);
    assert_eq!(
        state.demande.statut,
        DemandeStatus::EnAttenteValidationConducteur
    );

    let transitions: Vec<(Command, demande_domain::Utilisateur, DemandeStatus)> = vec![
        (
            validate_cmd(),
            user(5, Role::ConducteurTravaux),
            DemandeStatus::EnAttenteValidationResponsableTravaux,
        ),
        (
            validate_cmd(),
            user(6, Role::ResponsableTravaux),
            DemandeStatus::EnAttenteValidationChargeAffaire,
        ),
        (
            validate_cmd(),
            user(7, Role::ChargeAffaire),
            DemandeStatus::EnAttentePreparationAppro,
        ),
        (
            Command::Prepare {
                commentaire: None,
                quantites_sorties: vec![],
                livreur_id: Some(9),
            },
            user(8, Role::Appro),
            DemandeStatus::EnAttenteReceptionLivreur,
        ),
        (
            Command::Receive { commentaire: None },
            user(9, Role::Livreur),
            DemandeStatus::EnAttenteLivraison,
        ),
        (
            Command::Deliver { commentaire: None },
            user(9, Role::Livreur),
            DemandeStatus::EnAttenteValidationFinale,
        ),
        (
            Command::Close { commentaire: None },
            demandeur.clone(),
            DemandeStatus::Cloturee,
        ),
    ];

    for (command, actor, expected) in transitions {
        let result = apply(&state, command, &actor, cause()).unwrap();
        assert_eq!(result.new_state.demande.statut, expected);
        state = result.new_state;
    }

    // No variance anywhere on the happy path.
    let item = &state.items[0];
    assert_eq!(item.quantite_sortie, Some(item.quantite_demandee));
}

// ============================================================================
// Superadmin Force-Status
// ============================================================================

#[test]
fn test_force_status_requires_superadmin() {
    let state = state_at(DemandeStatus::EnAttenteValidationConducteur, 1);
    let charge = user(5, Role::ChargeAffaire);
    let command = Command::ForceStatus {
        target: DemandeStatus::EnAttenteLivraison,
        motif: String::from("urgence chantier"),
    };

    let result = apply(&state, command, &charge, cause());

    assert!(matches!(result.unwrap_err(), CoreError::SuperadminRequired));
}

#[test]
fn test_force_status_records_bypassed_validators() {
    let state = state_at(DemandeStatus::EnAttenteValidationConducteur, 1);
    let superadmin = user(99, Role::Superadmin);
    let command = Command::ForceStatus {
        target: DemandeStatus::EnAttenteReceptionLivreur,
        motif: String::from("urgence chantier"),
    };

    let result = apply(&state, command, &superadmin, cause()).unwrap();

    assert_eq!(
        result.new_state.demande.statut,
        DemandeStatus::EnAttenteReceptionLivreur
    );
    match result.notify {
        Some(NotifyTarget::SkippedValidators(roles)) => {
            assert_eq!(
                roles,
                vec![
                    Role::ConducteurTravaux,
                    Role::ResponsableTravaux,
                    Role::ChargeAffaire,
                    Role::Appro,
                ]
            );
        }
        other => panic!("expected skipped validators, got {other:?}"),
    }
    let details = result.audit_event.action.details.unwrap();
    assert!(details.contains("bypassed validators"));
    assert!(details.contains("conducteur_travaux"));
}
