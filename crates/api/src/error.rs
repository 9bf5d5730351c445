// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.
//!
//! Every error carries a stable machine-checkable kind plus a
//! human-readable message; inner domain/core/persistence errors are
//! translated explicitly and never leaked through the boundary.

use demande::CoreError;
use demande_domain::DomainError;
use demande_persistence::PersistenceError;

/// API-level errors, aligned with the workflow error taxonomy:
/// authorization, state, validation, conflict, not-found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor lacks permission for the requested action. Never
    /// mutates state.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// A human-readable denial reason.
        reason: String,
    },
    /// The action is incompatible with the demande's current status.
    StateViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The payload is malformed.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A concurrent modification was detected; reload and retry.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Too many attempts; try again later.
    RateLimited {
        /// The throttled key.
        key: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Stable machine-checkable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::StateViolation { .. } => "state_violation",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Conflict { .. } => "conflict",
            Self::ResourceNotFound { .. } => "not_found",
            Self::RateLimited { .. } => "rate_limited",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action, reason } => {
                write!(f, "Unauthorized: '{action}': {reason}")
            }
            Self::StateViolation { rule, message } => {
                write!(f, "State violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Conflict { message } => {
                write!(f, "Conflict: {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::RateLimited { key } => {
                write!(f, "Too many attempts for '{key}', try again later")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not
/// leaked directly. The mapping follows the error taxonomy:
/// permission failures become `Unauthorized`, status incompatibilities
/// become `StateViolation`, malformed payloads become `InvalidInput`.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::TransitionNotAllowed { statut, role } => ApiError::Unauthorized {
            action: String::from("act_on_demande"),
            reason: format!("role '{role}' may not act on a demande in status '{statut}'"),
        },
        DomainError::OnlyRequesterMayClose { demandeur_id } => ApiError::Unauthorized {
            action: String::from("close_demande"),
            reason: format!("only the requester (user {demandeur_id}) may close this demande"),
        },
        DomainError::TerminalStatus { .. } => ApiError::StateViolation {
            rule: String::from("terminal_status"),
            message: err.to_string(),
        },
        DomainError::WrongActionForStatus { .. } => ApiError::StateViolation {
            rule: String::from("wrong_action_for_status"),
            message: err.to_string(),
        },
        DomainError::RejectionNotAllowed { .. } => ApiError::StateViolation {
            rule: String::from("rejection_not_allowed"),
            message: err.to_string(),
        },
        DomainError::RejectionCeilingReached { .. } => ApiError::StateViolation {
            rule: String::from("rejection_ceiling"),
            message: err.to_string(),
        },
        DomainError::ClosureWrongStatus { .. } => ApiError::StateViolation {
            rule: String::from("closure_wrong_status"),
            message: err.to_string(),
        },
        DomainError::OpenSousDemandes { .. } => ApiError::StateViolation {
            rule: String::from("open_sub_demandes"),
            message: err.to_string(),
        },
        DomainError::ReceptionWrongStatus { .. } => ApiError::StateViolation {
            rule: String::from("reception_wrong_status"),
            message: err.to_string(),
        },
        DomainError::ArchiveWrongStatus { .. } => ApiError::StateViolation {
            rule: String::from("archive_requires_closed"),
            message: err.to_string(),
        },
        DomainError::InvalidStatus(_) => ApiError::InvalidInput {
            field: String::from("statut"),
            message: err.to_string(),
        },
        DomainError::InvalidRole(_) => ApiError::InvalidInput {
            field: String::from("role"),
            message: err.to_string(),
        },
        DomainError::InvalidRequestType(_) => ApiError::InvalidInput {
            field: String::from("type_demande"),
            message: err.to_string(),
        },
        DomainError::InvalidRequestKind(_) => ApiError::InvalidInput {
            field: String::from("kind"),
            message: err.to_string(),
        },
        DomainError::InvalidMotifRefus(_) => ApiError::InvalidInput {
            field: String::from("motif_refus"),
            message: err.to_string(),
        },
        DomainError::EmptyItems | DomainError::InvalidArticle => ApiError::InvalidInput {
            field: String::from("items"),
            message: err.to_string(),
        },
        DomainError::InvalidQuantity { .. } => ApiError::InvalidInput {
            field: String::from("quantite_demandee"),
            message: err.to_string(),
        },
        DomainError::ItemNotFound { .. } | DomainError::MissingItemValidation { .. } => {
            ApiError::InvalidInput {
                field: String::from("items"),
                message: err.to_string(),
            }
        }
        DomainError::MissingRefusalReason { .. } => ApiError::InvalidInput {
            field: String::from("motif_refus"),
            message: err.to_string(),
        },
        DomainError::MissingRejectionReason => ApiError::InvalidInput {
            field: String::from("motif"),
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::SuperadminRequired => ApiError::Unauthorized {
            action: String::from("force_status"),
            reason: String::from("superadmin authority required"),
        },
        CoreError::Internal(msg) => ApiError::Internal { message: msg },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::DemandeNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Demande"),
            message: format!("demande {id} does not exist"),
        },
        PersistenceError::UserNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("user {id} does not exist"),
        },
        PersistenceError::ItemNotFound { demande_id, item_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Line item"),
            message: format!("item {item_id} does not exist on demande {demande_id}"),
        },
        PersistenceError::Conflict { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        PersistenceError::NumberingExhausted { .. }
        | PersistenceError::LockPoisoned
        | PersistenceError::Other(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
