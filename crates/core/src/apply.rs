// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{DemandeState, NotifyTarget, TransitionResult};
use demande_audit::{Action, Actor, AuditEvent, Cause, ValidationSignature};
use demande_domain::{
    ActionKind, DemandeStatus, DomainError, ItemDemande, Role, build_reception, can_act_on,
    expected_action, flow_steps, forced_transition_skips, next_status, previous_status,
    previous_validator_role, validate_rejection_motif, validator_role_for,
};

/// Which quantity stage a bulk edit applies to.
#[derive(Debug, Clone, Copy)]
enum QuantityStage {
    Validee,
    Sortie,
}

/// Applies `(item_id, quantity)` edits to one quantity stage.
fn edit_quantities(
    items: &mut [ItemDemande],
    edits: &[(i64, u32)],
    stage: QuantityStage,
) -> Result<(), DomainError> {
    for &(item_id, quantite) in edits {
        let item = items
            .iter_mut()
            .find(|i| i.item_id == Some(item_id))
            .ok_or(DomainError::ItemNotFound { item_id })?;
        match stage {
            QuantityStage::Validee => item.quantite_validee = Some(quantite),
            QuantityStage::Sortie => item.quantite_sortie = Some(quantite),
        }
    }
    Ok(())
}

/// Resolves the next status for a flow action, enforcing that the
/// command kind matches the step and that the acting role owns it.
fn advance(
    state: &DemandeState,
    kind: ActionKind,
    role: Role,
) -> Result<DemandeStatus, CoreError> {
    let statut = state.demande.statut;
    let type_demande = state.demande.type_demande;

    if statut.is_terminal() {
        return Err(DomainError::TerminalStatus { statut }.into());
    }
    let Some(expected) = expected_action(statut, type_demande) else {
        return Err(DomainError::TransitionNotAllowed { statut, role }.into());
    };
    if expected != kind {
        return Err(DomainError::WrongActionForStatus {
            statut,
            action: kind.as_str(),
        }
        .into());
    }
    next_status(statut, role, type_demande)
        .ok_or_else(|| DomainError::TransitionNotAllowed { statut, role }.into())
}

/// Who to notify once the demande has reached `statut`.
fn notify_for(statut: DemandeStatus, state: &DemandeState) -> Option<NotifyTarget> {
    if statut == DemandeStatus::EnAttenteValidationFinale {
        Some(NotifyTarget::Demandeur)
    } else {
        validator_role_for(statut, state.demande.type_demande).map(NotifyTarget::Role)
    }
}

/// Applies a command to the current state, producing a new state, one
/// audit event, and one validation signature.
///
/// The function is pure: it never touches storage or the clock, and a
/// failed command leaves no trace. Authorization beyond the
/// role-permission table (project membership, admin override) is the
/// caller's responsibility.
///
/// # Errors
///
/// Returns an error if the command violates the workflow rules for the
/// demande's current status, the acting role, or the payload.
#[allow(clippy::too_many_lines)]
pub fn apply(
    state: &DemandeState,
    command: Command,
    acting_user: &demande_domain::Utilisateur,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let actor: Actor = Actor::new(acting_user.user_id, acting_user.nom.clone(), acting_user.role);
    let action_name = command.action_name();
    let statut_avant = state.demande.statut;
    let type_demande = state.demande.type_demande;

    match command {
        Command::Validate {
            commentaire,
            quantites_validees,
        } => {
            let next = advance(state, ActionKind::Validate, acting_user.role)?;

            let mut new_state = state.clone();
            edit_quantities(&mut new_state.items, &quantites_validees, QuantityStage::Validee)?;
            new_state.demande.statut = next;
            new_state.demande.statut_precedent = None;

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("'{statut_avant}' -> '{next}'")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                next,
                commentaire.clone(),
            );
            let signature: ValidationSignature = ValidationSignature::new(
                &actor,
                String::from(action_name),
                &cause.id,
                commentaire,
            );
            let notify = notify_for(next, state);

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: None,
            })
        }
        Command::Prepare {
            commentaire,
            quantites_sorties,
            livreur_id,
        } => {
            let next = advance(state, ActionKind::Prepare, acting_user.role)?;

            let mut new_state = state.clone();
            edit_quantities(&mut new_state.items, &quantites_sorties, QuantityStage::Sortie)?;
            // Lines the preparer did not touch ship their full validated quantity.
            for item in &mut new_state.items {
                if item.quantite_sortie.is_none() {
                    item.quantite_sortie = Some(item.validee_effective());
                }
            }
            new_state.demande.statut = next;
            new_state.demande.statut_precedent = None;
            if livreur_id.is_some() {
                new_state.demande.livreur_id = livreur_id;
            }

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("'{statut_avant}' -> '{next}'")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                next,
                commentaire.clone(),
            );
            let signature: ValidationSignature = ValidationSignature::new(
                &actor,
                String::from(action_name),
                &cause.id,
                commentaire,
            );
            let notify = notify_for(next, state);

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: None,
            })
        }
        Command::Receive { commentaire } => {
            let next = advance(state, ActionKind::Receive, acting_user.role)?;

            let mut new_state = state.clone();
            new_state.demande.statut = next;
            new_state.demande.statut_precedent = None;

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("'{statut_avant}' -> '{next}'")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                next,
                commentaire.clone(),
            );
            let signature: ValidationSignature = ValidationSignature::new(
                &actor,
                String::from(action_name),
                &cause.id,
                commentaire,
            );
            let notify = notify_for(next, state);

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: None,
            })
        }
        Command::Deliver { commentaire } => {
            let next = advance(state, ActionKind::Deliver, acting_user.role)?;

            let mut new_state = state.clone();
            new_state.demande.statut = next;
            new_state.demande.statut_precedent = None;

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("'{statut_avant}' -> '{next}'")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                next,
                commentaire.clone(),
            );
            let signature: ValidationSignature = ValidationSignature::new(
                &actor,
                String::from(action_name),
                &cause.id,
                commentaire,
            );
            let notify = notify_for(next, state);

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: None,
            })
        }
        Command::Reject { motif } => {
            if statut_avant.is_terminal() {
                return Err(DomainError::TerminalStatus { statut: statut_avant }.into());
            }
            validate_rejection_motif(&motif)?;

            let at_final = statut_avant == DemandeStatus::EnAttenteValidationFinale;
            let is_demandeur = acting_user.user_id == state.demande.demandeur_id;
            let allowed =
                can_act_on(acting_user.role, statut_avant, type_demande) || (at_final && is_demandeur);
            if !allowed {
                return Err(DomainError::TransitionNotAllowed {
                    statut: statut_avant,
                    role: acting_user.role,
                }
                .into());
            }

            let prev = previous_status(statut_avant, type_demande)
                .ok_or(DomainError::RejectionNotAllowed { statut: statut_avant })?;
            if !state.demande.can_reject() {
                return Err(DomainError::RejectionCeilingReached {
                    nombre_rejets: state.demande.nombre_rejets,
                }
                .into());
            }

            let mut new_state = state.clone();
            new_state.demande.statut = prev;
            new_state.demande.statut_precedent = Some(statut_avant);
            new_state.demande.nombre_rejets += 1;

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("'{statut_avant}' -> '{prev}': {motif}")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                prev,
                Some(motif.clone()),
            );
            let signature: ValidationSignature =
                ValidationSignature::new(&actor, String::from(action_name), &cause.id, Some(motif));
            let notify =
                previous_validator_role(statut_avant, type_demande).map(NotifyTarget::Role);

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: None,
            })
        }
        Command::Close { commentaire } => {
            if statut_avant.is_terminal() {
                return Err(DomainError::TerminalStatus { statut: statut_avant }.into());
            }
            if statut_avant != DemandeStatus::EnAttenteValidationFinale {
                return Err(DomainError::ClosureWrongStatus { statut: statut_avant }.into());
            }
            if acting_user.user_id != state.demande.demandeur_id {
                return Err(DomainError::OnlyRequesterMayClose {
                    demandeur_id: state.demande.demandeur_id,
                }
                .into());
            }
            let open = state.open_sous_demandes();
            if open > 0 {
                return Err(DomainError::OpenSousDemandes { count: open }.into());
            }

            let mut new_state = state.clone();
            new_state.demande.statut = DemandeStatus::Cloturee;
            new_state.demande.statut_precedent = None;

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("Demande {} closed by requester", state.demande.numero)),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                DemandeStatus::Cloturee,
                commentaire.clone(),
            );
            let signature: ValidationSignature = ValidationSignature::new(
                &actor,
                String::from(action_name),
                &cause.id,
                commentaire,
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify: None,
                reception: None,
            })
        }
        Command::ValidateReception {
            inputs,
            refuse_all,
            commentaire_general,
        } => {
            if statut_avant.is_terminal() {
                return Err(DomainError::TerminalStatus { statut: statut_avant }.into());
            }
            if statut_avant != DemandeStatus::EnAttenteValidationFinale {
                return Err(DomainError::ReceptionWrongStatus { statut: statut_avant }.into());
            }
            let is_demandeur = acting_user.user_id == state.demande.demandeur_id;
            if !is_demandeur && acting_user.role != Role::Livreur {
                return Err(DomainError::TransitionNotAllowed {
                    statut: statut_avant,
                    role: acting_user.role,
                }
                .into());
            }

            let reception =
                build_reception(&state.items, &inputs, refuse_all, commentaire_general.clone())?;

            let mut new_state = state.clone();
            let (statut_apres, notify) = if refuse_all {
                // Route the whole demande back to its preparation step.
                let prep = flow_steps(type_demande)
                    .iter()
                    .find(|s| matches!(s.action, ActionKind::Prepare))
                    .ok_or_else(|| {
                        CoreError::Internal(String::from("flow without a preparation step"))
                    })?;
                new_state.demande.statut = prep.statut;
                new_state.demande.statut_precedent = Some(statut_avant);
                (prep.statut, Some(NotifyTarget::Role(prep.validateur)))
            } else {
                for settled in &reception.items {
                    if let Some(item) = new_state
                        .items
                        .iter_mut()
                        .find(|i| i.item_id == Some(settled.item_id))
                    {
                        item.quantite_recue = Some(settled.quantite_acceptee);
                    }
                }
                (statut_avant, None)
            };

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("Reception outcome: {}", reception.statut.as_str())),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                statut_apres,
                commentaire_general.clone(),
            );
            let signature: ValidationSignature = ValidationSignature::new(
                &actor,
                String::from(action_name),
                &cause.id,
                commentaire_general,
            );

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: Some(reception),
            })
        }
        Command::ForceStatus { target, motif } => {
            if !acting_user.is_superadmin() {
                return Err(CoreError::SuperadminRequired);
            }

            let skipped = forced_transition_skips(statut_avant, target, type_demande);

            let mut new_state = state.clone();
            new_state.demande.statut = target;
            new_state.demande.statut_precedent = Some(statut_avant);

            let mut details = format!("Forced '{statut_avant}' -> '{target}'");
            if !skipped.is_empty() {
                let roles: Vec<&str> = skipped.iter().map(Role::as_str).collect();
                details.push_str(&format!("; bypassed validators: {}", roles.join(", ")));
            }

            let action: Action = Action::new(String::from(action_name), Some(details));
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                target,
                Some(motif.clone()),
            );
            let signature: ValidationSignature =
                ValidationSignature::new(&actor, String::from(action_name), &cause.id, Some(motif));
            let notify =
                (!skipped.is_empty()).then(|| NotifyTarget::SkippedValidators(skipped));

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify,
                reception: None,
            })
        }
        Command::Archive => {
            if !acting_user.is_superadmin() {
                return Err(CoreError::SuperadminRequired);
            }
            if statut_avant != DemandeStatus::Cloturee {
                return Err(DomainError::ArchiveWrongStatus { statut: statut_avant }.into());
            }

            let mut new_state = state.clone();
            new_state.demande.statut = DemandeStatus::Archivee;
            new_state.demande.statut_precedent = None;

            let action: Action = Action::new(
                String::from(action_name),
                Some(format!("Demande {} archived", state.demande.numero)),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause.clone(),
                action,
                Some(statut_avant),
                DemandeStatus::Archivee,
                None,
            );
            let signature: ValidationSignature =
                ValidationSignature::new(&actor, String::from(action_name), &cause.id, None);

            Ok(TransitionResult {
                new_state,
                audit_event,
                signature,
                notify: None,
                reception: None,
            })
        }
    }
}
