// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared helpers for API tests.
//!
//! User ids are fixed: 1 demandeur (employe), 2 conducteur,
//! 3 responsable travaux, 4 charge d'affaire, 5 appro, 6 logistique,
//! 7 livreur, 8 superadmin, 9 outsider (member of another project).

use crate::notification::RecordingNotifier;
use crate::request_response::{
    ActionRequest, CreateDemandeRequest, DemandeActionKind, DemandeResponse, NewItemRequest,
};
use crate::{ApiError, act_on_demande, create_demande};
use demande_domain::{Role, TypeDemande, Utilisateur};
use demande_persistence::DemandeStore;

pub const DEMANDEUR: i64 = 1;
pub const CONDUCTEUR: i64 = 2;
pub const RESPONSABLE: i64 = 3;
pub const CHARGE: i64 = 4;
pub const APPRO: i64 = 5;
pub const LOGISTIQUE: i64 = 6;
pub const LIVREUR: i64 = 7;
pub const SUPERADMIN: i64 = 8;
pub const OUTSIDER: i64 = 9;

pub const PROJET: i64 = 10;

pub fn setup() -> (DemandeStore, RecordingNotifier) {
    let store = DemandeStore::new();
    let users = [
        (DEMANDEUR, Role::Employe, PROJET),
        (CONDUCTEUR, Role::ConducteurTravaux, PROJET),
        (RESPONSABLE, Role::ResponsableTravaux, PROJET),
        (CHARGE, Role::ChargeAffaire, PROJET),
        (APPRO, Role::Appro, PROJET),
        (LOGISTIQUE, Role::Logistique, PROJET),
        (LIVREUR, Role::Livreur, PROJET),
        (OUTSIDER, Role::Employe, 20),
    ];
    for (user_id, role, projet) in users {
        store
            .add_user(Utilisateur::new(
                user_id,
                format!("user-{user_id}"),
                role,
                vec![projet],
            ))
            .unwrap();
    }
    store
        .add_user(Utilisateur::new_admin(
            SUPERADMIN,
            String::from("user-8"),
            Role::Superadmin,
            vec![PROJET],
        ))
        .unwrap();
    (store, RecordingNotifier::new())
}

pub fn creation_request(type_demande: TypeDemande) -> CreateDemandeRequest {
    CreateDemandeRequest {
        type_demande,
        projet_id: PROJET,
        items: vec![NewItemRequest {
            article: String::from("ciment-25kg"),
            quantite_demandee: 10,
            prix_unitaire: None,
            commentaire: None,
        }],
        date_livraison_souhaitee: None,
        commentaires: None,
    }
}

pub fn action(action: DemandeActionKind) -> ActionRequest {
    ActionRequest {
        action,
        commentaire: None,
        quantites: vec![],
        livreur_id: None,
    }
}

pub fn act(
    store: &DemandeStore,
    notifier: &RecordingNotifier,
    demande_id: i64,
    actor_id: i64,
    kind: DemandeActionKind,
) -> Result<DemandeResponse, ApiError> {
    act_on_demande(store, notifier, demande_id, actor_id, action(kind))
}

/// Creates a material demande as the demandeur and returns it.
pub fn created_material(store: &DemandeStore, notifier: &RecordingNotifier) -> DemandeResponse {
    create_demande(
        store,
        notifier,
        creation_request(TypeDemande::Materiel),
        DEMANDEUR,
    )
    .unwrap()
}

/// Drives a freshly created material demande to final validation.
pub fn drive_to_final(
    store: &DemandeStore,
    notifier: &RecordingNotifier,
    demande_id: i64,
) -> DemandeResponse {
    act(store, notifier, demande_id, CONDUCTEUR, DemandeActionKind::Validate).unwrap();
    act(store, notifier, demande_id, RESPONSABLE, DemandeActionKind::Validate).unwrap();
    act(store, notifier, demande_id, CHARGE, DemandeActionKind::Validate).unwrap();
    act(store, notifier, demande_id, APPRO, DemandeActionKind::Prepare).unwrap();
    act(store, notifier, demande_id, LIVREUR, DemandeActionKind::Receive).unwrap();
    act(store, notifier, demande_id, LIVREUR, DemandeActionKind::Deliver).unwrap()
}
