// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions: the request lifecycle orchestrator.
//!
//! Every handler follows the same shape: load, authorize, delegate to
//! the pure core, commit via a conditional write, append the audit
//! trail, then notify. Authorization failures abort before any
//! mutation; notification failures after the commit are logged and
//! swallowed (best-effort, not transactional).

use demande::{Command, DemandeState, NewDemande, NotifyTarget, apply, create};
use demande_audit::Cause;
use demande_domain::{
    Demande, DemandeKind, ItemDemande, Utilisateur, besoin_sous_demande, items_ecart, reconcile,
};
use demande_persistence::{DemandeRecord, DemandeStore, generate_numero};

use crate::auth::AuthorizationService;
use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::notification::{Notification, Notifier};
use crate::request_response::{
    ActionRequest, CreateDemandeRequest, DemandeActionKind, DemandeResponse, ForceStatusRequest,
    HistoryEntryInfo, ItemInfo, ReceptionRequest, ReceptionResponse,
};

/// Formats the current instant for API-stamped timestamps.
fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

fn load_user(store: &DemandeStore, user_id: i64) -> Result<Utilisateur, ApiError> {
    store.get_user(user_id).map_err(translate_persistence_error)
}

fn to_item_info(item: &ItemDemande, with_cost: bool) -> ItemInfo {
    ItemInfo {
        item_id: item.item_id,
        article: item.article.clone(),
        quantite_demandee: item.quantite_demandee,
        quantite_validee: item.quantite_validee,
        quantite_sortie: item.quantite_sortie,
        quantite_recue: item.quantite_recue,
        prix_unitaire: if with_cost { item.prix_unitaire } else { None },
        commentaire: item.commentaire.clone(),
    }
}

/// Builds the outward representation of a demande, stripping prices
/// and aggregate cost for viewers without cost clearance.
fn to_response(demande: &Demande, items: &[ItemDemande], viewer: &Utilisateur) -> DemandeResponse {
    let with_cost = AuthorizationService::may_view_cost(viewer);
    let reconciliation = reconcile(items);
    DemandeResponse {
        demande_id: demande.demande_id.unwrap_or_default(),
        numero: demande.numero.clone(),
        type_demande: demande.type_demande,
        kind: demande.kind,
        demande_parent_id: demande.demande_parent_id,
        statut: demande.statut,
        statut_precedent: demande.statut_precedent,
        nombre_rejets: demande.nombre_rejets,
        demandeur_id: demande.demandeur_id,
        projet_id: demande.projet_id,
        livreur_id: demande.livreur_id,
        items: items.iter().map(|i| to_item_info(i, with_cost)).collect(),
        cout_total: if with_cost {
            reconciliation.cout_total
        } else {
            None
        },
        cree_le: demande.cree_le.clone(),
        modifie_le: demande.modifie_le.clone(),
    }
}

/// Resolves a notify target into recipients and delivers best-effort.
fn dispatch_notification(
    store: &DemandeStore,
    notifier: &dyn Notifier,
    demande: &Demande,
    target: &NotifyTarget,
    message: String,
) {
    let recipients: Vec<i64> = match target {
        NotifyTarget::Role(role) => store
            .users_with_role_in_project(*role, demande.projet_id)
            .unwrap_or_default()
            .iter()
            .map(|u| u.user_id)
            .collect(),
        NotifyTarget::Demandeur => vec![demande.demandeur_id],
        NotifyTarget::SkippedValidators(roles) => roles
            .iter()
            .flat_map(|role| {
                store
                    .users_with_role_in_project(*role, demande.projet_id)
                    .unwrap_or_default()
            })
            .map(|u| u.user_id)
            .collect(),
    };
    let notification = Notification {
        demande_id: demande.demande_id.unwrap_or_default(),
        numero: demande.numero.clone(),
        projet_id: demande.projet_id,
        recipients,
        message,
    };
    if let Err(e) = notifier.notify(&notification) {
        tracing::warn!(
            numero = %demande.numero,
            error = %e,
            "notification dispatch failed after committed transition"
        );
    }
}

/// Creates a demande: computes the initial status, generates a unique
/// number, persists, writes the creation and auto-skip history
/// entries, and notifies the first validator.
///
/// # Errors
///
/// Returns an error if the creator is not a member of the target
/// project, the items are invalid, or persistence fails.
pub fn create_demande(
    store: &DemandeStore,
    notifier: &dyn Notifier,
    request: CreateDemandeRequest,
    createur_id: i64,
) -> Result<DemandeResponse, ApiError> {
    let createur = load_user(store, createur_id)?;
    if !createur.is_superadmin() && !createur.is_member_of(request.projet_id) {
        return Err(ApiError::Unauthorized {
            action: String::from("create_demande"),
            reason: format!(
                "user {createur_id} is not a member of project {}",
                request.projet_id
            ),
        });
    }

    let items: Vec<ItemDemande> = request
        .items
        .iter()
        .map(|r| {
            let mut item = ItemDemande::new(r.article.clone(), r.quantite_demandee);
            item.prix_unitaire = r.prix_unitaire;
            item.commentaire = r.commentaire.clone();
            item
        })
        .collect();

    let numero = generate_numero(store, request.type_demande, current_year())
        .map_err(translate_persistence_error)?;
    let cause = Cause::new(format!("create:{numero}"), String::from("demande creation"));
    let new = NewDemande {
        type_demande: request.type_demande,
        kind: DemandeKind::Principale,
        demande_parent_id: None,
        projet_id: request.projet_id,
        numero,
        date_livraison_souhaitee: request.date_livraison_souhaitee,
        commentaires: request.commentaires,
        cree_le: now_rfc3339(),
    };

    let creation = create(new, items, &createur, cause).map_err(translate_core_error)?;
    let record = store
        .insert_demande(creation.demande, creation.items)
        .map_err(translate_persistence_error)?;
    let demande_id = record.demande.demande_id.unwrap_or_default();
    for event in creation.audit_events {
        store
            .append_history(demande_id, event)
            .map_err(translate_persistence_error)?;
    }

    if let Some(target) = creation.notify {
        let message = match &target {
            NotifyTarget::Demandeur => format!(
                "Demande {}: every validation step was skipped, awaiting your final validation",
                record.demande.numero
            ),
            _ => format!(
                "Demande {}: action required at step '{}'",
                record.demande.numero, record.demande.statut
            ),
        };
        dispatch_notification(store, notifier, &record.demande, &target, message);
    }
    tracing::info!(numero = %record.demande.numero, statut = %record.demande.statut, "demande created");

    Ok(to_response(&record.demande, &record.items, &createur))
}

/// Translates an action request into a core command.
fn command_for(request: &ActionRequest) -> Command {
    let quantites: Vec<(i64, u32)> = request
        .quantites
        .iter()
        .map(|q| (q.item_id, q.quantite))
        .collect();
    match request.action {
        DemandeActionKind::Validate => Command::Validate {
            commentaire: request.commentaire.clone(),
            quantites_validees: quantites,
        },
        DemandeActionKind::Reject => Command::Reject {
            motif: request.commentaire.clone().unwrap_or_default(),
        },
        DemandeActionKind::Prepare => Command::Prepare {
            commentaire: request.commentaire.clone(),
            quantites_sorties: quantites,
            livreur_id: request.livreur_id,
        },
        DemandeActionKind::Receive => Command::Receive {
            commentaire: request.commentaire.clone(),
        },
        DemandeActionKind::Deliver => Command::Deliver {
            commentaire: request.commentaire.clone(),
        },
        DemandeActionKind::Close => Command::Close {
            commentaire: request.commentaire.clone(),
        },
    }
}

/// Acts on an existing demande: authorize, apply the pure transition,
/// commit with an expected-status guard, append one history entry and
/// one signature, then notify the next actors.
///
/// A concurrent transition on the same demande surfaces as
/// `ApiError::Conflict`; the caller should reload and re-evaluate.
///
/// # Errors
///
/// Returns an error if the actor lacks access, the transition is not
/// permitted, the payload is invalid, or the write loses its race.
pub fn act_on_demande(
    store: &DemandeStore,
    notifier: &dyn Notifier,
    demande_id: i64,
    actor_id: i64,
    request: ActionRequest,
) -> Result<DemandeResponse, ApiError> {
    let user = load_user(store, actor_id)?;
    let state: DemandeState = store
        .get_state(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &state.demande)?;
    if matches!(
        request.action,
        DemandeActionKind::Validate
            | DemandeActionKind::Prepare
            | DemandeActionKind::Receive
            | DemandeActionKind::Deliver
    ) {
        AuthorizationService::authorize_step(&user, &state.demande)?;
    }

    let expected = state.demande.statut;
    let cause = Cause::new(
        format!("{}:{}", request.action.as_str(), state.demande.numero),
        format!("'{}' requested by user {actor_id}", request.action.as_str()),
    );
    let command = command_for(&request);
    let result = apply(&state, command, &user, cause).map_err(translate_core_error)?;

    let updated: DemandeRecord = store
        .update_demande_if_status(
            demande_id,
            expected,
            result.new_state.demande.clone(),
            result.new_state.items.clone(),
        )
        .map_err(translate_persistence_error)?;
    store
        .append_history(demande_id, result.audit_event)
        .map_err(translate_persistence_error)?;
    store
        .append_signature(demande_id, result.signature)
        .map_err(translate_persistence_error)?;

    // Preparation issues stock: record one delivery batch per line.
    if request.action == DemandeActionKind::Prepare {
        for item in &updated.items {
            if let (Some(item_id), Some(quantite)) = (item.item_id, item.quantite_sortie) {
                store
                    .add_delivery(demande_id, item_id, quantite)
                    .map_err(translate_persistence_error)?;
            }
        }
    }

    if let Some(target) = &result.notify {
        let message = match (&request.action, target) {
            (DemandeActionKind::Reject, _) => format!(
                "Demande {} rejected by {}: {}",
                updated.demande.numero,
                user.role,
                request.commentaire.as_deref().unwrap_or_default()
            ),
            (_, NotifyTarget::Demandeur) => format!(
                "Demande {} delivered: awaiting your final validation",
                updated.demande.numero
            ),
            _ => format!(
                "Demande {}: action required at step '{}'",
                updated.demande.numero, updated.demande.statut
            ),
        };
        dispatch_notification(store, notifier, &updated.demande, target, message);
    }

    Ok(to_response(&updated.demande, &updated.items, &user))
}

/// Validates the reception of a delivered demande, persists the
/// settled reception, and creates the variance sub-demande when one is
/// warranted.
///
/// # Errors
///
/// Returns an error if the actor lacks access, the demande is not at
/// final validation, a refusal lacks its reason, or the write loses
/// its race.
#[allow(clippy::too_many_lines)]
pub fn validate_reception(
    store: &DemandeStore,
    notifier: &dyn Notifier,
    demande_id: i64,
    actor_id: i64,
    request: ReceptionRequest,
) -> Result<ReceptionResponse, ApiError> {
    let user = load_user(store, actor_id)?;
    let state = store
        .get_state(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &state.demande)?;

    let expected = state.demande.statut;
    let cause = Cause::new(
        format!("reception:{}", state.demande.numero),
        format!("reception validated by user {actor_id}"),
    );
    let inputs = request
        .items
        .iter()
        .map(|r| demande_domain::ItemValidationInput {
            item_id: r.item_id,
            quantite_recue: r.quantite_recue,
            quantite_acceptee: r.quantite_acceptee,
            motif_refus: r.motif_refus,
            commentaire: r.commentaire.clone(),
            photos: r.photos.clone(),
        })
        .collect();
    let command = Command::ValidateReception {
        inputs,
        refuse_all: request.refuser_tout,
        commentaire_general: request.commentaire_general.clone(),
    };

    let result = apply(&state, command, &user, cause).map_err(translate_core_error)?;
    let reception = result.reception.clone().ok_or_else(|| ApiError::Internal {
        message: String::from("reception command produced no reception"),
    })?;

    let updated = store
        .update_demande_if_status(
            demande_id,
            expected,
            result.new_state.demande.clone(),
            result.new_state.items.clone(),
        )
        .map_err(translate_persistence_error)?;
    store
        .append_history(demande_id, result.audit_event)
        .map_err(translate_persistence_error)?;
    store
        .append_signature(demande_id, result.signature)
        .map_err(translate_persistence_error)?;
    store
        .append_reception(demande_id, reception.clone())
        .map_err(translate_persistence_error)?;

    // A positive outstanding variance after receipt warrants a
    // sub-demande carrying only the shortfall.
    let mut sous_demande: Option<DemandeResponse> = None;
    if !request.refuser_tout {
        let reconciliation = reconcile(&updated.items);
        if besoin_sous_demande(&reconciliation) {
            let variance_items = items_ecart(&updated.items);
            if !variance_items.is_empty() {
                let demandeur = load_user(store, updated.demande.demandeur_id)?;
                let numero = generate_numero(store, updated.demande.type_demande, current_year())
                    .map_err(translate_persistence_error)?;
                let sous_cause = Cause::new(
                    format!("sous-demande:{numero}"),
                    format!("variance of demande {}", updated.demande.numero),
                );
                let new = NewDemande {
                    type_demande: updated.demande.type_demande,
                    kind: DemandeKind::SousDemande,
                    demande_parent_id: Some(demande_id),
                    projet_id: updated.demande.projet_id,
                    numero,
                    date_livraison_souhaitee: None,
                    commentaires: Some(format!(
                        "Couvre l'ecart de la demande {}",
                        updated.demande.numero
                    )),
                    cree_le: now_rfc3339(),
                };
                let creation = create(new, variance_items, &demandeur, sous_cause)
                    .map_err(translate_core_error)?;
                let sous_record = store
                    .insert_demande(creation.demande, creation.items)
                    .map_err(translate_persistence_error)?;
                let sous_id = sous_record.demande.demande_id.unwrap_or_default();
                for event in creation.audit_events {
                    store
                        .append_history(sous_id, event)
                        .map_err(translate_persistence_error)?;
                }
                if let Some(target) = creation.notify {
                    let message = format!(
                        "Demande {}: action required at step '{}'",
                        sous_record.demande.numero, sous_record.demande.statut
                    );
                    dispatch_notification(store, notifier, &sous_record.demande, &target, message);
                }
                tracing::info!(
                    parent = %updated.demande.numero,
                    numero = %sous_record.demande.numero,
                    "variance sub-demande created"
                );
                sous_demande = Some(to_response(&sous_record.demande, &sous_record.items, &user));
            }
        }
    }

    if let Some(target) = &result.notify {
        let message = format!(
            "Demande {}: delivery refused, back to preparation",
            updated.demande.numero
        );
        dispatch_notification(store, notifier, &updated.demande, target, message);
    }

    Ok(ReceptionResponse {
        statut: reception.statut,
        demande: to_response(&updated.demande, &updated.items, &user),
        sous_demande,
    })
}

/// Superadmin override: forces a demande to any status, recording the
/// bypassed validators in the audit trail and notifying them.
///
/// # Errors
///
/// Returns an error if the actor is not a superadmin or the write
/// loses its race.
pub fn force_demande_status(
    store: &DemandeStore,
    notifier: &dyn Notifier,
    demande_id: i64,
    actor_id: i64,
    request: ForceStatusRequest,
) -> Result<DemandeResponse, ApiError> {
    let user = load_user(store, actor_id)?;
    let state = store
        .get_state(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &state.demande)?;

    let expected = state.demande.statut;
    let cause = Cause::new(
        format!("force:{}", state.demande.numero),
        format!("status forced by user {actor_id}"),
    );
    let command = Command::ForceStatus {
        target: request.target,
        motif: request.motif,
    };
    let result = apply(&state, command, &user, cause).map_err(translate_core_error)?;

    let updated = store
        .update_demande_if_status(
            demande_id,
            expected,
            result.new_state.demande.clone(),
            result.new_state.items.clone(),
        )
        .map_err(translate_persistence_error)?;
    store
        .append_history(demande_id, result.audit_event)
        .map_err(translate_persistence_error)?;
    store
        .append_signature(demande_id, result.signature)
        .map_err(translate_persistence_error)?;

    if let Some(target) = &result.notify {
        let message = format!(
            "Demande {}: status forced to '{}' by superadmin; your validation step was bypassed",
            updated.demande.numero, updated.demande.statut
        );
        dispatch_notification(store, notifier, &updated.demande, target, message);
    }

    Ok(to_response(&updated.demande, &updated.items, &user))
}

/// Archives a closed demande. Admin-only; archived demandes are
/// read-only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the demande is not
/// closed.
pub fn archive_demande(
    store: &DemandeStore,
    demande_id: i64,
    actor_id: i64,
) -> Result<DemandeResponse, ApiError> {
    let user = load_user(store, actor_id)?;
    let state = store
        .get_state(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &state.demande)?;

    let expected = state.demande.statut;
    let cause = Cause::new(
        format!("archive:{}", state.demande.numero),
        format!("archived by user {actor_id}"),
    );
    let result = apply(&state, Command::Archive, &user, cause).map_err(translate_core_error)?;

    let updated = store
        .update_demande_if_status(
            demande_id,
            expected,
            result.new_state.demande.clone(),
            result.new_state.items.clone(),
        )
        .map_err(translate_persistence_error)?;
    store
        .append_history(demande_id, result.audit_event)
        .map_err(translate_persistence_error)?;
    store
        .append_signature(demande_id, result.signature)
        .map_err(translate_persistence_error)?;

    Ok(to_response(&updated.demande, &updated.items, &user))
}

/// Deletes a demande. Owners may delete while the demande has not
/// passed business-manager validation; admins may delete regardless.
///
/// # Errors
///
/// Returns an error if the actor may not delete the demande.
pub fn delete_demande(
    store: &DemandeStore,
    demande_id: i64,
    actor_id: i64,
) -> Result<(), ApiError> {
    let user = load_user(store, actor_id)?;
    let record = store
        .get_demande(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &record.demande)?;
    AuthorizationService::authorize_delete(&user, &record.demande)?;

    store
        .delete_demande(demande_id)
        .map_err(translate_persistence_error)?;
    tracing::info!(numero = %record.demande.numero, actor_id, "demande deleted");
    Ok(())
}

/// Loads a demande for a viewer, stripping cost data per clearance.
///
/// # Errors
///
/// Returns an error if the demande does not exist or the viewer lacks
/// access.
pub fn get_demande(
    store: &DemandeStore,
    demande_id: i64,
    actor_id: i64,
) -> Result<DemandeResponse, ApiError> {
    let user = load_user(store, actor_id)?;
    let record = store
        .get_demande(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &record.demande)?;
    Ok(to_response(&record.demande, &record.items, &user))
}

/// Returns a demande's audit history, oldest first.
///
/// # Errors
///
/// Returns an error if the demande does not exist or the viewer lacks
/// access.
pub fn demande_history(
    store: &DemandeStore,
    demande_id: i64,
    actor_id: i64,
) -> Result<Vec<HistoryEntryInfo>, ApiError> {
    let user = load_user(store, actor_id)?;
    let record = store
        .get_demande(demande_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_access(&user, &record.demande)?;

    let history = store
        .history(demande_id)
        .map_err(translate_persistence_error)?;
    Ok(history
        .into_iter()
        .map(|stored| HistoryEntryInfo {
            event_id: stored.event_id,
            recorded_at: stored.recorded_at,
            actor_id: stored.event.actor.user_id,
            role: stored.event.actor.role,
            action: stored.event.action.name,
            details: stored.event.action.details,
            statut_avant: stored.event.statut_avant,
            statut_apres: stored.event.statut_apres,
            signature_token: stored.event.signature_token,
            commentaire: stored.event.commentaire,
        })
        .collect())
}
