// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use demande_domain::DemandeStatus;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The requested demande was not found.
    DemandeNotFound(i64),
    /// The requested user was not found.
    UserNotFound(i64),
    /// The requested line item was not found on the demande.
    ItemNotFound {
        /// The demande the lookup ran against.
        demande_id: i64,
        /// The missing line item.
        item_id: i64,
    },
    /// A conditional write failed: the stored status no longer matches
    /// the expected status. The caller must reload and retry.
    Conflict {
        /// The demande that was concurrently modified.
        demande_id: i64,
        /// The status the caller expected.
        expected: DemandeStatus,
        /// The status actually stored.
        actual: DemandeStatus,
    },
    /// A demande number could not be generated within the retry budget.
    NumberingExhausted {
        /// The last number that collided.
        last_attempt: String,
    },
    /// The store lock was poisoned by a panicking writer.
    LockPoisoned,
    /// A general error occurred.
    Other(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DemandeNotFound(id) => write!(f, "Demande not found: {id}"),
            Self::UserNotFound(id) => write!(f, "User not found: {id}"),
            Self::ItemNotFound { demande_id, item_id } => {
                write!(f, "Line item {item_id} not found on demande {demande_id}")
            }
            Self::Conflict {
                demande_id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Concurrent modification of demande {demande_id}: expected status '{expected}', found '{actual}'"
                )
            }
            Self::NumberingExhausted { last_attempt } => {
                write!(
                    f,
                    "Could not reserve a demande number (last attempt: '{last_attempt}')"
                )
            }
            Self::LockPoisoned => write!(f, "Store lock poisoned"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}
