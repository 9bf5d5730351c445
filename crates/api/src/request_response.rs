// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the API boundary.

use demande_domain::{
    DemandeKind, DemandeStatus, MotifRefus, ReceptionOutcome, Role, TypeDemande,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line item of a creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemRequest {
    /// Article reference.
    pub article: String,
    /// Requested quantity, strictly positive.
    pub quantite_demandee: u32,
    /// Optional unit price.
    pub prix_unitaire: Option<Decimal>,
    /// Optional free-text comment.
    pub commentaire: Option<String>,
}

/// Request to create a demande.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDemandeRequest {
    /// The type of demande.
    pub type_demande: TypeDemande,
    /// The project the demande belongs to.
    pub projet_id: i64,
    /// The line items.
    pub items: Vec<NewItemRequest>,
    /// Optional desired delivery date.
    pub date_livraison_souhaitee: Option<time::Date>,
    /// Optional free-text comments.
    pub commentaires: Option<String>,
}

/// The workflow actions exposed by `act_on_demande`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandeActionKind {
    /// Approve the current validation step.
    Validate,
    /// Reject, rolling back one step.
    Reject,
    /// Prepare from stock.
    Prepare,
    /// Deliverer pickup.
    Receive,
    /// Deliverer hand-off.
    Deliver,
    /// Requester closure.
    Close,
}

impl DemandeActionKind {
    /// Returns the string representation of the action kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Reject => "reject",
            Self::Prepare => "prepare",
            Self::Receive => "receive",
            Self::Deliver => "deliver",
            Self::Close => "close",
        }
    }
}

/// One quantity edit within an action payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantiteEdit {
    /// The line item to edit.
    pub item_id: i64,
    /// The new quantity for the stage implied by the action.
    pub quantite: u32,
}

/// Request to act on an existing demande.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// The action to perform.
    pub action: DemandeActionKind,
    /// Optional comment recorded with the signature. Required and
    /// non-empty for `Reject`.
    pub commentaire: Option<String>,
    /// Role-specific quantity edits: validated quantities for
    /// `Validate`, issued quantities for `Prepare`.
    #[serde(default)]
    pub quantites: Vec<QuantiteEdit>,
    /// Deliverer assignment, honored by `Prepare`.
    pub livreur_id: Option<i64>,
}

/// Superadmin request to force a demande to a status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceStatusRequest {
    /// The target status.
    pub target: DemandeStatus,
    /// Mandatory justification for the audit trail.
    pub motif: String,
}

/// One line of a reception validation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemValidationRequest {
    /// The line item being validated.
    pub item_id: i64,
    /// Quantity that physically arrived.
    pub quantite_recue: u32,
    /// Explicitly accepted quantity, clamped to the received quantity.
    pub quantite_acceptee: Option<u32>,
    /// Refusal reason, mandatory when any quantity is refused.
    pub motif_refus: Option<MotifRefus>,
    /// Optional free-text comment.
    pub commentaire: Option<String>,
    /// References to photos documenting a refusal.
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Request to validate the reception of a delivered demande.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionRequest {
    /// Per-line decisions; ignored when `refuser_tout` is set.
    #[serde(default)]
    pub items: Vec<ItemValidationRequest>,
    /// Refuse the entire delivery without per-line detail.
    #[serde(default)]
    pub refuser_tout: bool,
    /// Free-text comment on the reception as a whole.
    pub commentaire_general: Option<String>,
}

/// A line item as returned by the API. Prices are stripped for roles
/// without cost clearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// The line item identifier.
    pub item_id: Option<i64>,
    /// Article reference.
    pub article: String,
    /// Requested quantity.
    pub quantite_demandee: u32,
    /// Validated quantity, if edited.
    pub quantite_validee: Option<u32>,
    /// Issued quantity, if prepared.
    pub quantite_sortie: Option<u32>,
    /// Received quantity, if receipted.
    pub quantite_recue: Option<u32>,
    /// Unit price; `None` when unpriced or stripped.
    pub prix_unitaire: Option<Decimal>,
    /// Free-text comment.
    pub commentaire: Option<String>,
}

/// A demande as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandeResponse {
    /// The demande identifier.
    pub demande_id: i64,
    /// Human-readable sequential number.
    pub numero: String,
    /// The type of demande.
    pub type_demande: TypeDemande,
    /// Principal demande or variance sub-demande.
    pub kind: DemandeKind,
    /// Parent demande id for sub-demandes.
    pub demande_parent_id: Option<i64>,
    /// Current workflow status.
    pub statut: DemandeStatus,
    /// Status left by the last rejection rollback, if any.
    pub statut_precedent: Option<DemandeStatus>,
    /// Rejection count.
    pub nombre_rejets: u8,
    /// The requester.
    pub demandeur_id: i64,
    /// The project.
    pub projet_id: i64,
    /// Assigned deliverer, if any.
    pub livreur_id: Option<i64>,
    /// The line items, price-stripped per the viewer's clearance.
    pub items: Vec<ItemInfo>,
    /// Aggregate cost; `None` when unpriced or stripped.
    pub cout_total: Option<Decimal>,
    /// Creation timestamp (RFC 3339).
    pub cree_le: String,
    /// Last-modification timestamp (RFC 3339).
    pub modifie_le: String,
}

/// A settled reception validation as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionResponse {
    /// Overall outcome.
    pub statut: ReceptionOutcome,
    /// The demande after the reception was applied.
    pub demande: DemandeResponse,
    /// The sub-demande created to cover the variance, if one was
    /// warranted.
    pub sous_demande: Option<DemandeResponse>,
}

/// One history entry as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntryInfo {
    /// Monotonically increasing event identifier.
    pub event_id: i64,
    /// Timestamp of the append (RFC 3339).
    pub recorded_at: String,
    /// The acting user.
    pub actor_id: i64,
    /// The role the actor held.
    pub role: Role,
    /// The action name.
    pub action: String,
    /// Optional action details.
    pub details: Option<String>,
    /// Status before the transition.
    pub statut_avant: Option<DemandeStatus>,
    /// Status after the transition.
    pub statut_apres: DemandeStatus,
    /// Opaque signature token.
    pub signature_token: String,
    /// Optional comment attached to the transition.
    pub commentaire: Option<String>,
}
