// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use demande_domain::{DemandeStatus, Role};

/// Represents the entity performing an action.
///
/// An actor is any identifiable user that initiates a state change on
/// a demande.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The canonical user identifier.
    pub user_id: i64,
    /// The user's display name at the time of the action.
    pub nom: String,
    /// The role the actor held when acting.
    pub role: Role,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The canonical user identifier
    /// * `nom` - The user's display name
    /// * `role` - The role held when acting
    #[must_use]
    pub const fn new(user_id: i64, nom: String, role: Role) -> Self {
        Self { user_id, nom, role }
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request correlation id).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`Valider`", "`Rejeter`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Builds the opaque signature token recorded with each transition.
///
/// The token is an audit marker identifying who signed what, not a
/// cryptographic control.
#[must_use]
pub fn signature_token(actor: &Actor, action_name: &str, cause_id: &str) -> String {
    format!(
        "SIG:{}:{}:{}:{}",
        actor.role.as_str(),
        actor.user_id,
        cause_id,
        action_name
    )
}

/// One validation signature, recorded per role transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSignature {
    /// The signing user.
    pub user_id: i64,
    /// The role under which the signature was given.
    pub role: Role,
    /// The action that was signed.
    pub action: String,
    /// The opaque signature token.
    pub token: String,
    /// Optional free-text comment left by the signer.
    pub commentaire: Option<String>,
}

impl ValidationSignature {
    /// Creates a signature for an actor performing `action`.
    #[must_use]
    pub fn new(actor: &Actor, action: String, cause_id: &str, commentaire: Option<String>) -> Self {
        let token = signature_token(actor, &action, cause_id);
        Self {
            user_id: actor.user_id,
            role: actor.role,
            action,
            token,
            commentaire,
        }
    }
}

/// An immutable audit event representing one state transition.
///
/// Every successful state change must produce exactly one audit event.
/// Audit events are append-only and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The status before the transition (`statut_avant`)
/// - The status after the transition (`statut_apres`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The status before the transition. `None` for creation and
    /// auto-skip entries, which precede any held status.
    pub statut_avant: Option<DemandeStatus>,
    /// The status after the transition.
    pub statut_apres: DemandeStatus,
    /// The opaque signature token of the acting user.
    pub signature_token: String,
    /// Optional free-text comment attached to the transition.
    pub commentaire: Option<String>,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// The signature token is derived from the actor, action, and
    /// cause. Once created, an audit event is immutable.
    #[must_use]
    pub fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        statut_avant: Option<DemandeStatus>,
        statut_apres: DemandeStatus,
        commentaire: Option<String>,
    ) -> Self {
        let signature_token = signature_token(&actor, &action.name, &cause.id);
        Self {
            actor,
            cause,
            action,
            statut_avant,
            statut_apres,
            signature_token,
            commentaire,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_actor() -> Actor {
        Actor::new(7, String::from("M. Dupont"), Role::ChargeAffaire)
    }

    #[test]
    fn test_actor_creation_requires_all_fields() {
        let actor = test_actor();

        assert_eq!(actor.user_id, 7);
        assert_eq!(actor.nom, "M. Dupont");
        assert_eq!(actor.role, Role::ChargeAffaire);
    }

    #[test]
    fn test_signature_token_identifies_signer_and_action() {
        let actor = test_actor();
        let token = signature_token(&actor, "Valider", "req-42");

        assert_eq!(token, "SIG:charge_affaire:7:req-42:Valider");
    }

    #[test]
    fn test_audit_event_records_both_statuses() {
        let event = AuditEvent::new(
            test_actor(),
            Cause::new(String::from("req-42"), String::from("validation")),
            Action::new(String::from("Valider"), None),
            Some(DemandeStatus::EnAttenteValidationChargeAffaire),
            DemandeStatus::EnAttentePreparationAppro,
            None,
        );

        assert_eq!(
            event.statut_avant,
            Some(DemandeStatus::EnAttenteValidationChargeAffaire)
        );
        assert_eq!(event.statut_apres, DemandeStatus::EnAttentePreparationAppro);
        assert!(event.signature_token.starts_with("SIG:charge_affaire:7:"));
    }

    #[test]
    fn test_creation_event_has_no_prior_status() {
        let event = AuditEvent::new(
            test_actor(),
            Cause::new(String::from("req-1"), String::from("creation")),
            Action::new(String::from("Creer"), None),
            None,
            DemandeStatus::EnAttentePreparationAppro,
            None,
        );

        assert_eq!(event.statut_avant, None);
    }

    #[test]
    fn test_signature_carries_signer_comment() {
        let signature = ValidationSignature::new(
            &test_actor(),
            String::from("Rejeter"),
            "req-9",
            Some(String::from("fiche technique manquante")),
        );

        assert_eq!(signature.user_id, 7);
        assert_eq!(signature.role, Role::ChargeAffaire);
        assert_eq!(
            signature.commentaire.as_deref(),
            Some("fiche technique manquante")
        );
    }
}
