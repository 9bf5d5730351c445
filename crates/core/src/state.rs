// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use demande_audit::{AuditEvent, ValidationSignature};
use demande_domain::{Demande, DemandeStatus, ItemDemande, ReceptionValidation, Role};

/// The workflow state scoped to a single demande.
///
/// Transitions operate on one demande at a time; the statuses of its
/// sub-demandes are carried along because closure depends on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandeState {
    /// The demande itself.
    pub demande: Demande,
    /// All line items of the demande.
    pub items: Vec<ItemDemande>,
    /// Current statuses of this demande's sub-demandes.
    pub sous_demandes: Vec<DemandeStatus>,
}

impl DemandeState {
    /// Creates a state for a demande with no sub-demandes loaded.
    #[must_use]
    pub const fn new(demande: Demande, items: Vec<ItemDemande>) -> Self {
        Self {
            demande,
            items,
            sous_demandes: Vec::new(),
        }
    }

    /// Number of sub-demandes still in a non-terminal status.
    #[must_use]
    pub fn open_sous_demandes(&self) -> usize {
        self.sous_demandes.iter().filter(|s| !s.is_terminal()).count()
    }
}

/// Who must be notified after a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    /// Project members holding this role.
    Role(Role),
    /// The original requester of the demande.
    Demandeur,
    /// The validators bypassed by a forced transition.
    SkippedValidators(Vec<Role>),
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail
/// without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: DemandeState,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// The validation signature of the acting user.
    pub signature: ValidationSignature,
    /// Who the orchestrator should notify, if anyone.
    pub notify: Option<NotifyTarget>,
    /// The settled reception validation, present only for
    /// `Command::ValidateReception`.
    pub reception: Option<ReceptionValidation>,
}

/// The result of creating a demande.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationResult {
    /// The new demande, placed at its initial status.
    pub demande: Demande,
    /// The validated line items.
    pub items: Vec<ItemDemande>,
    /// The creation entry followed by one entry per auto-skipped step.
    pub audit_events: Vec<AuditEvent>,
    /// Who the orchestrator should notify, if anyone.
    pub notify: Option<NotifyTarget>,
}
