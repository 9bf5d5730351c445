// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization services.
//!
//! Token issuance and session transport live outside this crate; the
//! authentication boundary here resolves a user and applies the
//! injected login throttle. Authorization combines the domain
//! role-permission table with project membership, ownership, and the
//! admin override.

use demande_domain::{Demande, Role, Utilisateur, can_act_on, is_deletable_by_owner};
use demande_persistence::DemandeStore;

use crate::error::{ApiError, translate_persistence_error};
use crate::throttle::{Decision, RateLimiter};

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The canonical user identifier.
    pub user_id: i64,
    /// The role the user holds.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Authentication boundary with an injected rate limiter.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Resolves a user into an authenticated actor, applying the
    /// login throttle keyed on the user id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RateLimited` when the throttle denies the
    /// attempt, or `ApiError::AuthenticationFailed` when the user does
    /// not exist.
    pub fn authenticate(
        store: &DemandeStore,
        limiter: &dyn RateLimiter,
        user_id: i64,
    ) -> Result<AuthenticatedActor, ApiError> {
        let key = format!("login:{user_id}");
        if limiter.check(&key) == Decision::Deny {
            return Err(ApiError::RateLimited { key });
        }
        limiter.record(&key);

        match store.get_user(user_id) {
            Ok(user) => Ok(AuthenticatedActor::new(user.user_id, user.role)),
            Err(demande_persistence::PersistenceError::UserNotFound(_)) => {
                Err(ApiError::AuthenticationFailed {
                    reason: format!("unknown user {user_id}"),
                })
            }
            Err(e) => Err(translate_persistence_error(e)),
        }
    }
}

/// Authorization service for enforcing access control on demandes.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that a user may read or act within a demande's scope.
    ///
    /// Access requires project membership, ownership, or the admin
    /// override.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when none of the three grounds
    /// applies.
    pub fn authorize_access(user: &Utilisateur, demande: &Demande) -> Result<(), ApiError> {
        if user.is_superadmin()
            || user.user_id == demande.demandeur_id
            || user.is_member_of(demande.projet_id)
        {
            return Ok(());
        }
        Err(ApiError::Unauthorized {
            action: String::from("access_demande"),
            reason: format!(
                "user {} is not a member of project {} and does not own demande {}",
                user.user_id, demande.projet_id, demande.numero
            ),
        })
    }

    /// Checks that a user's role owns the step at the demande's
    /// current status. Superadmins bypass the table.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the role-permission table
    /// has no entry for the (role, status, type) triple.
    pub fn authorize_step(user: &Utilisateur, demande: &Demande) -> Result<(), ApiError> {
        if user.is_superadmin() {
            return Ok(());
        }
        if can_act_on(user.role, demande.statut, demande.type_demande) {
            return Ok(());
        }
        Err(ApiError::Unauthorized {
            action: String::from("act_on_demande"),
            reason: format!(
                "role '{}' may not act on a demande in status '{}'",
                user.role, demande.statut
            ),
        })
    }

    /// Checks that a user may delete a demande.
    ///
    /// The owner may delete while the demande has not yet passed
    /// business-manager validation; admins may delete regardless of
    /// status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for non-owners, and
    /// `ApiError::StateViolation` for an owner outside the deletion
    /// window.
    pub fn authorize_delete(user: &Utilisateur, demande: &Demande) -> Result<(), ApiError> {
        if user.is_superadmin() {
            return Ok(());
        }
        if user.user_id != demande.demandeur_id {
            return Err(ApiError::Unauthorized {
                action: String::from("delete_demande"),
                reason: format!(
                    "only the requester or an admin may delete demande {}",
                    demande.numero
                ),
            });
        }
        if !is_deletable_by_owner(demande.statut) {
            return Err(ApiError::StateViolation {
                rule: String::from("deletion_window"),
                message: format!(
                    "demande {} in status '{}' can no longer be deleted by its requester",
                    demande.numero, demande.statut
                ),
            });
        }
        Ok(())
    }

    /// Checks that a viewer may see prices and aggregate cost.
    #[must_use]
    pub const fn may_view_cost(user: &Utilisateur) -> bool {
        user.role.can_view_cost() || user.is_admin
    }
}
