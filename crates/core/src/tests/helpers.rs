// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared helpers for core tests.

use crate::{DemandeState, NewDemande, create};
use demande_audit::Cause;
use demande_domain::{
    Demande, DemandeKind, DemandeStatus, ItemDemande, Role, TypeDemande, Utilisateur,
};

pub fn user(user_id: i64, role: Role) -> Utilisateur {
    Utilisateur::new(user_id, format!("user-{user_id}"), role, vec![10])
}

pub fn cause() -> Cause {
    Cause::new(String::from("req-test"), String::from("test request"))
}

pub fn item(id: i64, article: &str, demandee: u32) -> ItemDemande {
    let mut line = ItemDemande::new(String::from(article), demandee);
    line.item_id = Some(id);
    line
}

/// Builds a material demande parked at `statut`, with one line item.
pub fn state_at(statut: DemandeStatus, demandeur_id: i64) -> DemandeState {
    let mut demande = Demande::new(
        String::from("MAT-2026-0001"),
        TypeDemande::Materiel,
        DemandeKind::Principale,
        None,
        statut,
        demandeur_id,
        10,
        String::from("2026-01-05T08:00:00Z"),
    );
    demande.demande_id = Some(1);
    DemandeState::new(demande, vec![item(1, "ciment-25kg", 10)])
}

/// Builds a tooling demande parked at `statut`, with one line item.
pub fn tooling_state_at(statut: DemandeStatus, demandeur_id: i64) -> DemandeState {
    let mut demande = Demande::new(
        String::from("OUT-2026-0001"),
        TypeDemande::Outillage,
        DemandeKind::Principale,
        None,
        statut,
        demandeur_id,
        10,
        String::from("2026-01-05T08:00:00Z"),
    );
    demande.demande_id = Some(2);
    DemandeState::new(demande, vec![item(1, "perceuse", 2)])
}

/// Creates a fresh demande via the core creation path.
pub fn created(type_demande: TypeDemande, createur: &Utilisateur) -> DemandeState {
    let new = NewDemande {
        type_demande,
        kind: DemandeKind::Principale,
        demande_parent_id: None,
        projet_id: 10,
        numero: String::from("MAT-2026-0099"),
        date_livraison_souhaitee: None,
        commentaires: None,
        cree_le: String::from("2026-01-05T08:00:00Z"),
    };
    let items = vec![item(1, "ciment-25kg", 10)];
    let result = create(new, items, createur, cause()).unwrap();
    DemandeState::new(result.demande, result.items)
}
