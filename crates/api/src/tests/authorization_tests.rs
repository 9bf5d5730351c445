// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for access control, step authorization, deletion rights, and
//! the authentication throttle.

use super::helpers::{
    CONDUCTEUR, DEMANDEUR, LIVREUR, OUTSIDER, SUPERADMIN, act, created_material, setup,
};
use crate::request_response::DemandeActionKind;
use crate::throttle::FixedWindowLimiter;
use crate::{ApiError, AuthenticationService, delete_demande, get_demande};
use demande_domain::DemandeStatus;
use time::Duration;

#[test]
fn test_outsider_cannot_read_a_project_demande() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    let result = get_demande(&store, demande.demande_id, OUTSIDER);

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
}

#[test]
fn test_superadmin_reads_across_projects() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    assert!(get_demande(&store, demande.demande_id, SUPERADMIN).is_ok());
}

#[test]
fn test_wrong_role_is_denied_before_any_mutation() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    let result = act(
        &store,
        &notifier,
        demande.demande_id,
        LIVREUR,
        DemandeActionKind::Validate,
    );

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
    // Status untouched, no history appended beyond creation.
    let unchanged = get_demande(&store, demande.demande_id, DEMANDEUR).unwrap();
    assert_eq!(
        unchanged.statut,
        DemandeStatus::EnAttenteValidationConducteur
    );
    let history = crate::demande_history(&store, demande.demande_id, DEMANDEUR).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn test_owner_deletes_within_window() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    assert!(delete_demande(&store, demande.demande_id, DEMANDEUR).is_ok());
    assert!(matches!(
        get_demande(&store, demande.demande_id, DEMANDEUR).unwrap_err(),
        ApiError::ResourceNotFound { .. }
    ));
}

#[test]
fn test_owner_cannot_delete_after_business_manager_validation() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);
    act(&store, &notifier, demande.demande_id, CONDUCTEUR, DemandeActionKind::Validate).unwrap();
    act(
        &store,
        &notifier,
        demande.demande_id,
        super::helpers::RESPONSABLE,
        DemandeActionKind::Validate,
    )
    .unwrap();
    act(
        &store,
        &notifier,
        demande.demande_id,
        super::helpers::CHARGE,
        DemandeActionKind::Validate,
    )
    .unwrap();

    let result = delete_demande(&store, demande.demande_id, DEMANDEUR);

    assert!(matches!(
        result.unwrap_err(),
        ApiError::StateViolation { .. }
    ));
}

#[test]
fn test_admin_deletes_regardless_of_status() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);
    act(&store, &notifier, demande.demande_id, CONDUCTEUR, DemandeActionKind::Validate).unwrap();
    act(
        &store,
        &notifier,
        demande.demande_id,
        super::helpers::RESPONSABLE,
        DemandeActionKind::Validate,
    )
    .unwrap();
    act(
        &store,
        &notifier,
        demande.demande_id,
        super::helpers::CHARGE,
        DemandeActionKind::Validate,
    )
    .unwrap();

    assert!(delete_demande(&store, demande.demande_id, SUPERADMIN).is_ok());
}

#[test]
fn test_non_owner_cannot_delete() {
    let (store, notifier) = setup();
    let demande = created_material(&store, &notifier);

    let result = delete_demande(&store, demande.demande_id, CONDUCTEUR);

    assert!(matches!(result.unwrap_err(), ApiError::Unauthorized { .. }));
}

#[test]
fn test_authentication_resolves_known_user() {
    let (store, _notifier) = setup();
    let limiter = FixedWindowLimiter::new(5, Duration::minutes(1));

    let actor = AuthenticationService::authenticate(&store, &limiter, DEMANDEUR).unwrap();

    assert_eq!(actor.user_id, DEMANDEUR);
    assert_eq!(actor.role, demande_domain::Role::Employe);
}

#[test]
fn test_authentication_rejects_unknown_user() {
    let (store, _notifier) = setup();
    let limiter = FixedWindowLimiter::new(5, Duration::minutes(1));

    let result = AuthenticationService::authenticate(&store, &limiter, 404);

    assert!(matches!(
        result.unwrap_err(),
        ApiError::AuthenticationFailed { .. }
    ));
}

#[test]
fn test_authentication_is_throttled_per_user() {
    let (store, _notifier) = setup();
    let limiter = FixedWindowLimiter::new(2, Duration::minutes(1));

    assert!(AuthenticationService::authenticate(&store, &limiter, DEMANDEUR).is_ok());
    assert!(AuthenticationService::authenticate(&store, &limiter, DEMANDEUR).is_ok());
    let third = AuthenticationService::authenticate(&store, &limiter, DEMANDEUR);
    assert!(matches!(third.unwrap_err(), ApiError::RateLimited { .. }));

    // Another user is unaffected.
    assert!(AuthenticationService::authenticate(&store, &limiter, CONDUCTEUR).is_ok());
}
