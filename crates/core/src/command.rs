// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use demande_domain::{DemandeStatus, ItemValidationInput};

/// A command represents user intent as data only.
///
/// Commands are the only way to request a workflow transition on an
/// existing demande. Creation goes through [`crate::create`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Approve the demande at its current validation step.
    Validate {
        /// Optional comment recorded with the signature.
        commentaire: Option<String>,
        /// Per-line edits of the validated quantity, `(item_id, quantity)`.
        quantites_validees: Vec<(i64, u32)>,
    },
    /// Reject the demande, rolling it back one step.
    Reject {
        /// Mandatory free-text rejection reason.
        motif: String,
    },
    /// Prepare the demande from stock.
    Prepare {
        /// Optional comment recorded with the signature.
        commentaire: Option<String>,
        /// Per-line edits of the issued quantity, `(item_id, quantity)`.
        /// Lines without an edit default to their validated quantity.
        quantites_sorties: Vec<(i64, u32)>,
        /// Deliverer assigned to the demande, if known at preparation.
        livreur_id: Option<i64>,
    },
    /// Deliverer pickup of the prepared demande.
    Receive {
        /// Optional comment recorded with the signature.
        commentaire: Option<String>,
    },
    /// Deliverer hand-off to the requester.
    Deliver {
        /// Optional comment recorded with the signature.
        commentaire: Option<String>,
    },
    /// Requester closure after final validation.
    Close {
        /// Optional comment recorded with the signature.
        commentaire: Option<String>,
    },
    /// Requester (or deliverer) reception validation with per-line
    /// accept/refuse decisions.
    ValidateReception {
        /// Per-line inputs; must cover every line unless `refuse_all`.
        inputs: Vec<ItemValidationInput>,
        /// Refuse the entire delivery without per-line detail, routing
        /// the demande back to its preparation step.
        refuse_all: bool,
        /// Free-text comment on the reception as a whole.
        commentaire_general: Option<String>,
    },
    /// Superadmin override: force the demande to any status.
    ForceStatus {
        /// The target status.
        target: DemandeStatus,
        /// Mandatory justification, recorded in the audit trail.
        motif: String,
    },
    /// Admin archival of a closed demande. Archived demandes are
    /// read-only.
    Archive,
}

impl Command {
    /// Returns the audit action name recorded for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Validate { .. } => "Valider",
            Self::Reject { .. } => "Rejeter",
            Self::Prepare { .. } => "Preparer",
            Self::Receive { .. } => "Receptionner",
            Self::Deliver { .. } => "Livrer",
            Self::Close { .. } => "Cloturer",
            Self::ValidateReception { .. } => "ValiderReception",
            Self::ForceStatus { .. } => "ForcerStatut",
            Self::Archive => "Archiver",
        }
    }
}
