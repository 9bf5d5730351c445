// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::demande::MAX_REJETS;
use crate::role::Role;
use crate::status::DemandeStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Status string is not a valid status.
    InvalidStatus(String),
    /// Role string is not a valid role.
    InvalidRole(String),
    /// Demande type string is not a valid type.
    InvalidRequestType(String),
    /// Demande kind string is not a valid kind.
    InvalidRequestKind(String),
    /// Refusal reason string is not a valid reason.
    InvalidMotifRefus(String),
    /// A demande must carry at least one line item.
    EmptyItems,
    /// A line item's article reference is empty.
    InvalidArticle,
    /// A requested quantity must be strictly positive.
    InvalidQuantity {
        /// The article reference of the offending line.
        article: String,
    },
    /// A quantity edit references a line item that does not exist.
    ItemNotFound {
        /// The line item identifier.
        item_id: i64,
    },
    /// The acting role has no step at the current status.
    TransitionNotAllowed {
        /// The current status of the demande.
        statut: DemandeStatus,
        /// The acting role.
        role: Role,
    },
    /// The command kind does not match the action expected at this status.
    WrongActionForStatus {
        /// The current status of the demande.
        statut: DemandeStatus,
        /// The action name that was attempted.
        action: &'static str,
    },
    /// The demande is in a terminal status and accepts no actions.
    TerminalStatus {
        /// The terminal status.
        statut: DemandeStatus,
    },
    /// No prior step exists to roll back to from this status.
    RejectionNotAllowed {
        /// The current status of the demande.
        statut: DemandeStatus,
    },
    /// The rejection ceiling has been reached.
    RejectionCeilingReached {
        /// The current rejection count.
        nombre_rejets: u8,
    },
    /// A rejection requires a non-empty reason.
    MissingRejectionReason,
    /// A reception item with a refused quantity requires a reason.
    MissingRefusalReason {
        /// The article reference of the offending line.
        article: String,
    },
    /// A reception validation must cover every line item.
    MissingItemValidation {
        /// The article reference of the uncovered line.
        article: String,
    },
    /// Only the original requester may close a demande.
    OnlyRequesterMayClose {
        /// The user id of the requester.
        demandeur_id: i64,
    },
    /// Closure attempted from a status other than final validation.
    ClosureWrongStatus {
        /// The current status of the demande.
        statut: DemandeStatus,
    },
    /// Closure blocked by sub-demandes still in a non-terminal status.
    OpenSousDemandes {
        /// How many sub-demandes are still open.
        count: usize,
    },
    /// Reception validation attempted from an incompatible status.
    ReceptionWrongStatus {
        /// The current status of the demande.
        statut: DemandeStatus,
    },
    /// Archival attempted on a demande that is not closed.
    ArchiveWrongStatus {
        /// The current status of the demande.
        statut: DemandeStatus,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(s) => write!(f, "Invalid demande status: '{s}'"),
            Self::InvalidRole(s) => write!(f, "Invalid role: '{s}'"),
            Self::InvalidRequestType(s) => write!(f, "Invalid demande type: '{s}'"),
            Self::InvalidRequestKind(s) => write!(f, "Invalid demande kind: '{s}'"),
            Self::InvalidMotifRefus(s) => write!(f, "Invalid refusal reason: '{s}'"),
            Self::EmptyItems => write!(f, "A demande must carry at least one line item"),
            Self::InvalidArticle => write!(f, "Line item article reference must not be empty"),
            Self::InvalidQuantity { article } => {
                write!(
                    f,
                    "Requested quantity for article '{article}' must be greater than 0"
                )
            }
            Self::ItemNotFound { item_id } => {
                write!(f, "Line item {item_id} does not exist on this demande")
            }
            Self::TransitionNotAllowed { statut, role } => {
                write!(f, "Role '{role}' may not act on a demande in status '{statut}'")
            }
            Self::WrongActionForStatus { statut, action } => {
                write!(f, "Action '{action}' is not the step expected in status '{statut}'")
            }
            Self::TerminalStatus { statut } => {
                write!(f, "Demande is in terminal status '{statut}'")
            }
            Self::RejectionNotAllowed { statut } => {
                write!(f, "A demande in status '{statut}' cannot be rejected")
            }
            Self::RejectionCeilingReached { nombre_rejets } => {
                write!(
                    f,
                    "Rejection limit reached ({nombre_rejets}/{MAX_REJETS}): create a new demande instead"
                )
            }
            Self::MissingRejectionReason => {
                write!(f, "A rejection requires a non-empty reason")
            }
            Self::MissingRefusalReason { article } => {
                write!(
                    f,
                    "Article '{article}' has a refused quantity but no refusal reason"
                )
            }
            Self::MissingItemValidation { article } => {
                write!(
                    f,
                    "Reception validation is missing a record for article '{article}'"
                )
            }
            Self::OnlyRequesterMayClose { demandeur_id } => {
                write!(
                    f,
                    "Only the requester (user {demandeur_id}) may close this demande"
                )
            }
            Self::ClosureWrongStatus { statut } => {
                write!(
                    f,
                    "A demande can only be closed from final validation, not from '{statut}'"
                )
            }
            Self::OpenSousDemandes { count } => {
                write!(
                    f,
                    "Closure blocked: {count} sub-demande(s) still in a non-terminal status"
                )
            }
            Self::ReceptionWrongStatus { statut } => {
                write!(
                    f,
                    "Reception can only be validated from final validation, not from '{statut}'"
                )
            }
            Self::ArchiveWrongStatus { statut } => {
                write!(f, "Only a closed demande can be archived, not one in '{statut}'")
            }
        }
    }
}

impl std::error::Error for DomainError {}
