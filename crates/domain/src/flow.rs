// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ordered flow-step definitions and the transition tables derived
//! from them.
//!
//! Each demande type follows a fixed, ordered list of steps. Every
//! table-driven workflow question (who may act at a status, what the
//! next status is, what a rejection rolls back to, where a freshly
//! created demande starts) is answered by walking these lists, so the
//! two flows cannot drift apart from their permission table.

use crate::demande::TypeDemande;
use crate::role::Role;
use crate::status::DemandeStatus;

/// The kind of action a validator performs at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Approve the demande and pass it to the next step.
    Validate,
    /// Prepare the demande from stock.
    Prepare,
    /// Pick up the prepared demande.
    Receive,
    /// Deliver the demande to the requester.
    Deliver,
}

impl ActionKind {
    /// Returns the string representation of the action kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Prepare => "prepare",
            Self::Receive => "receive",
            Self::Deliver => "deliver",
        }
    }
}

/// One step of a flow: a status, the role that acts on it, and the
/// action that role performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    /// The status a demande holds while waiting at this step.
    pub statut: DemandeStatus,
    /// The role that acts at this step.
    pub validateur: Role,
    /// The action the validator performs.
    pub action: ActionKind,
    /// Creator roles for which this step is auto-skipped at creation.
    ///
    /// Only validation steps are skippable; preparation and delivery
    /// steps always run. A step's own validator is always a member of
    /// its skip set, and a hierarchically senior validator also skips
    /// the steps below its own.
    skip_for: &'static [Role],
}

impl FlowStep {
    /// Returns true if a demande created by `createur` skips this step.
    #[must_use]
    pub fn skipped_for(&self, createur: Role) -> bool {
        self.skip_for.contains(&createur)
    }
}

/// Material flow: site supervisor, works manager, business manager,
/// supply preparation, then delivery.
const MATERIEL_FLOW: &[FlowStep] = &[
    FlowStep {
        statut: DemandeStatus::EnAttenteValidationConducteur,
        validateur: Role::ConducteurTravaux,
        action: ActionKind::Validate,
        skip_for: &[
            Role::ConducteurTravaux,
            Role::ResponsableTravaux,
            Role::ChargeAffaire,
        ],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteValidationResponsableTravaux,
        validateur: Role::ResponsableTravaux,
        action: ActionKind::Validate,
        skip_for: &[Role::ResponsableTravaux, Role::ChargeAffaire],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteValidationChargeAffaire,
        validateur: Role::ChargeAffaire,
        action: ActionKind::Validate,
        skip_for: &[Role::ChargeAffaire],
    },
    FlowStep {
        statut: DemandeStatus::EnAttentePreparationAppro,
        validateur: Role::Appro,
        action: ActionKind::Prepare,
        skip_for: &[],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteReceptionLivreur,
        validateur: Role::Livreur,
        action: ActionKind::Receive,
        skip_for: &[],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteLivraison,
        validateur: Role::Livreur,
        action: ActionKind::Deliver,
        skip_for: &[],
    },
];

/// Tooling flow: logistics validates first and prepares after the
/// business manager; the site supervisor never appears.
const OUTILLAGE_FLOW: &[FlowStep] = &[
    FlowStep {
        statut: DemandeStatus::EnAttenteValidationLogistique,
        validateur: Role::Logistique,
        action: ActionKind::Validate,
        skip_for: &[Role::Logistique],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteValidationResponsableTravaux,
        validateur: Role::ResponsableTravaux,
        action: ActionKind::Validate,
        skip_for: &[Role::ResponsableTravaux, Role::ChargeAffaire],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteValidationChargeAffaire,
        validateur: Role::ChargeAffaire,
        action: ActionKind::Validate,
        skip_for: &[Role::ChargeAffaire],
    },
    FlowStep {
        statut: DemandeStatus::EnAttentePreparationLogistique,
        validateur: Role::Logistique,
        action: ActionKind::Prepare,
        skip_for: &[],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteReceptionLivreur,
        validateur: Role::Livreur,
        action: ActionKind::Receive,
        skip_for: &[],
    },
    FlowStep {
        statut: DemandeStatus::EnAttenteLivraison,
        validateur: Role::Livreur,
        action: ActionKind::Deliver,
        skip_for: &[],
    },
];

/// Returns the ordered flow steps for a demande type.
///
/// The returned list covers the actor-driven steps; the step after the
/// last one is always `EnAttenteValidationFinale`, where only the
/// requester may act (closure).
#[must_use]
pub const fn flow_steps(type_demande: TypeDemande) -> &'static [FlowStep] {
    match type_demande {
        TypeDemande::Materiel => MATERIEL_FLOW,
        TypeDemande::Outillage => OUTILLAGE_FLOW,
    }
}

/// Finds the index of the step holding `statut` in the flow for a type.
fn step_index(statut: DemandeStatus, type_demande: TypeDemande) -> Option<usize> {
    flow_steps(type_demande).iter().position(|s| s.statut == statut)
}

/// Role-permission table lookup: may `role` act on a demande of
/// `type_demande` currently in `statut`?
///
/// Deterministic, side-effect free. Absence from the table is a valid
/// "no permission" result, not an error. The site supervisor can never
/// act on tooling because the tooling flow carries no step for it.
#[must_use]
pub fn can_act_on(role: Role, statut: DemandeStatus, type_demande: TypeDemande) -> bool {
    flow_steps(type_demande)
        .iter()
        .any(|s| s.statut == statut && s.validateur == role)
}

/// Returns the action expected at `statut` for a type, if any.
#[must_use]
pub fn expected_action(statut: DemandeStatus, type_demande: TypeDemande) -> Option<ActionKind> {
    flow_steps(type_demande)
        .iter()
        .find(|s| s.statut == statut)
        .map(|s| s.action)
}

/// Returns the validator role designated at `statut` for a type.
#[must_use]
pub fn validator_role_for(statut: DemandeStatus, type_demande: TypeDemande) -> Option<Role> {
    flow_steps(type_demande)
        .iter()
        .find(|s| s.statut == statut)
        .map(|s| s.validateur)
}

/// Status transition engine: the status after `role` acts at `statut`.
///
/// Returns `None` when the (status, role) pair has no defined
/// transition; callers must treat that as "not authorized" or
/// "terminal". After the last actor step, the demande moves to
/// `EnAttenteValidationFinale` (the branch on type at the
/// business-manager step falls out of the per-type step lists).
#[must_use]
pub fn next_status(
    statut: DemandeStatus,
    role: Role,
    type_demande: TypeDemande,
) -> Option<DemandeStatus> {
    let steps = flow_steps(type_demande);
    let idx = step_index(statut, type_demande)?;
    if steps[idx].validateur != role {
        return None;
    }
    Some(
        steps
            .get(idx + 1)
            .map_or(DemandeStatus::EnAttenteValidationFinale, |s| s.statut),
    )
}

/// Rejection rollback resolver: the status a rejection reverts to.
///
/// Returns `None` when rejection is not possible from `statut`,
/// including the very first flow status, which has no prior step to
/// roll back to.
#[must_use]
pub fn previous_status(
    statut: DemandeStatus,
    type_demande: TypeDemande,
) -> Option<DemandeStatus> {
    let steps = flow_steps(type_demande);
    if statut == DemandeStatus::EnAttenteValidationFinale {
        return steps.last().map(|s| s.statut);
    }
    let idx = step_index(statut, type_demande)?;
    if idx == 0 {
        return None;
    }
    Some(steps[idx - 1].statut)
}

/// The role that acted at the step a rejection rolls back to, and must
/// therefore be renotified.
#[must_use]
pub fn previous_validator_role(
    statut: DemandeStatus,
    type_demande: TypeDemande,
) -> Option<Role> {
    previous_status(statut, type_demande)
        .and_then(|prev| validator_role_for(prev, type_demande))
}

/// The result of placing a freshly created demande into its flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPlacement {
    /// The first status whose step is not auto-skipped for the creator.
    pub statut: DemandeStatus,
    /// The steps that were skipped, in flow order. One history entry is
    /// recorded per skipped step.
    pub skipped: Vec<FlowStep>,
}

/// Initial-status resolver.
///
/// Walks the ordered flow for `type_demande` and skips every step whose
/// skip set contains the creator's role, so a creator never lands on a
/// step it would have validated itself. If every step is skipped, the
/// demande starts directly at final requester validation.
#[must_use]
pub fn initial_status(type_demande: TypeDemande, createur: Role) -> InitialPlacement {
    let mut skipped: Vec<FlowStep> = Vec::new();
    for step in flow_steps(type_demande) {
        if step.skipped_for(createur) {
            skipped.push(*step);
        } else {
            return InitialPlacement {
                statut: step.statut,
                skipped,
            };
        }
    }
    InitialPlacement {
        statut: DemandeStatus::EnAttenteValidationFinale,
        skipped,
    }
}

/// Position of a status along a flow, for force-jump bookkeeping:
/// in-flow statuses map to their step index, draft maps before the
/// first step, and final/terminal statuses map past the last step.
fn force_position(statut: DemandeStatus, type_demande: TypeDemande) -> usize {
    step_index(statut, type_demande).unwrap_or(if statut == DemandeStatus::Brouillon {
        0
    } else {
        flow_steps(type_demande).len()
    })
}

/// Validators bypassed by a superadmin forcing `from` directly to `to`.
///
/// A forward jump bypasses the validators of every step from the
/// current one up to (but excluding) the target; forcing into a
/// terminal or post-flow status bypasses every remaining validator.
/// Backward jumps, and jumps between post-flow statuses, bypass nobody.
#[must_use]
pub fn forced_transition_skips(
    from: DemandeStatus,
    to: DemandeStatus,
    type_demande: TypeDemande,
) -> Vec<Role> {
    let steps = flow_steps(type_demande);
    let start = force_position(from, type_demande);
    let end = force_position(to, type_demande);
    if end <= start {
        return Vec::new();
    }
    let mut roles: Vec<Role> = Vec::new();
    for step in &steps[start..end] {
        if !roles.contains(&step.validateur) {
            roles.push(step.validateur);
        }
    }
    roles
}

/// Returns true if `statut` is within the deletion window of the owner:
/// draft or any validation-pending status up to and including the
/// business-manager step. Admins may delete regardless of status.
#[must_use]
pub const fn is_deletable_by_owner(statut: DemandeStatus) -> bool {
    matches!(
        statut,
        DemandeStatus::Brouillon
            | DemandeStatus::EnAttenteValidationConducteur
            | DemandeStatus::EnAttenteValidationLogistique
            | DemandeStatus::EnAttenteValidationResponsableTravaux
            | DemandeStatus::EnAttenteValidationChargeAffaire
    )
}
