// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::state::{CreationResult, NotifyTarget};
use demande_audit::{Action, Actor, AuditEvent, Cause};
use demande_domain::{
    Demande, DemandeKind, DemandeStatus, ItemDemande, TypeDemande, Utilisateur, initial_status,
    validate_items, validator_role_for,
};

/// The payload of a demande creation.
///
/// The sequence number is generated by the persistence layer before the
/// core is invoked, so creation itself stays pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDemande {
    /// The type of demande, selecting the flow.
    pub type_demande: TypeDemande,
    /// Principal demande or variance sub-demande.
    pub kind: DemandeKind,
    /// Parent demande id when `kind` is `SousDemande`.
    pub demande_parent_id: Option<i64>,
    /// The project the demande belongs to.
    pub projet_id: i64,
    /// Pre-generated unique sequential number.
    pub numero: String,
    /// Optional desired delivery date.
    pub date_livraison_souhaitee: Option<time::Date>,
    /// Free-text comments carried on the demande.
    pub commentaires: Option<String>,
    /// Creation timestamp (RFC 3339), stamped at the API boundary.
    pub cree_le: String,
}

/// Creates a demande, placing it at its initial status.
///
/// The initial-status resolver skips every step the creator's own role
/// would have validated; one audit entry is recorded per skipped step,
/// after the creation entry itself.
///
/// # Errors
///
/// Returns an error if the line items are invalid.
pub fn create(
    new: NewDemande,
    items: Vec<ItemDemande>,
    createur: &Utilisateur,
    cause: Cause,
) -> Result<CreationResult, CoreError> {
    validate_items(&items)?;

    let placement = initial_status(new.type_demande, createur.role);
    let actor: Actor = Actor::new(createur.user_id, createur.nom.clone(), createur.role);

    let mut demande: Demande = Demande::new(
        new.numero,
        new.type_demande,
        new.kind,
        new.demande_parent_id,
        placement.statut,
        createur.user_id,
        new.projet_id,
        new.cree_le,
    );
    demande.date_livraison_souhaitee = new.date_livraison_souhaitee;
    demande.commentaires = new.commentaires;

    let mut audit_events: Vec<AuditEvent> = Vec::with_capacity(1 + placement.skipped.len());

    let creation_action: Action = Action::new(
        String::from("Creer"),
        Some(format!(
            "Created demande {} ({})",
            demande.numero, demande.type_demande
        )),
    );
    audit_events.push(AuditEvent::new(
        actor.clone(),
        cause.clone(),
        creation_action,
        None,
        placement.statut,
        None,
    ));

    for step in &placement.skipped {
        let action: Action = Action::new(
            String::from("EtapeAutoPassee"),
            Some(format!(
                "Step '{}' auto-skipped: creator holds the validating role '{}'",
                step.statut, step.validateur
            )),
        );
        audit_events.push(AuditEvent::new(
            actor.clone(),
            cause.clone(),
            action,
            None,
            placement.statut,
            None,
        ));
    }

    let notify: Option<NotifyTarget> =
        if placement.statut == DemandeStatus::EnAttenteValidationFinale {
            Some(NotifyTarget::Demandeur)
        } else {
            validator_role_for(placement.statut, new.type_demande).map(NotifyTarget::Role)
        };

    Ok(CreationResult {
        demande,
        items,
        audit_events,
        notify,
    })
}
