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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod demande;
mod error;
mod flow;
mod item;
mod reception;
mod role;
mod status;
mod user;
mod validation;

#[cfg(test)]
mod tests;

pub use demande::{Demande, DemandeKind, MAX_REJETS, TypeDemande, format_numero};
pub use error::DomainError;
pub use flow::{
    ActionKind, FlowStep, InitialPlacement, can_act_on, expected_action, flow_steps,
    forced_transition_skips, initial_status, is_deletable_by_owner, next_status, previous_status,
    previous_validator_role, validator_role_for,
};
pub use item::{
    EcartItem, ItemDemande, Reconciliation, TotauxQuantites, besoin_sous_demande, items_ecart,
    reconcile,
};
pub use reception::{
    ItemValidation, ItemValidationInput, MotifRefus, ReceptionOutcome, ReceptionValidation,
    aggregate_outcome, build_reception, process_item,
};
pub use role::Role;
pub use status::DemandeStatus;
pub use user::Utilisateur;
pub use validation::{validate_items, validate_rejection_motif};
