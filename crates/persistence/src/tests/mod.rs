// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod store_tests;

use demande_domain::{Demande, DemandeKind, DemandeStatus, ItemDemande, TypeDemande};

pub fn demande(numero: &str, statut: DemandeStatus) -> Demande {
    Demande::new(
        String::from(numero),
        TypeDemande::Materiel,
        DemandeKind::Principale,
        None,
        statut,
        1,
        10,
        String::from("2026-01-05T08:00:00Z"),
    )
}

pub fn items() -> Vec<ItemDemande> {
    vec![ItemDemande::new(String::from("ciment-25kg"), 10)]
}
