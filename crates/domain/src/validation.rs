// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field-level validation of demande payloads.

use crate::error::DomainError;
use crate::item::ItemDemande;

/// Validates the line items of a new demande.
///
/// # Errors
///
/// Returns an error if the list is empty, an article reference is
/// blank, or a requested quantity is zero.
pub fn validate_items(items: &[ItemDemande]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyItems);
    }
    for item in items {
        if item.article.trim().is_empty() {
            return Err(DomainError::InvalidArticle);
        }
        if item.quantite_demandee == 0 {
            return Err(DomainError::InvalidQuantity {
                article: item.article.clone(),
            });
        }
    }
    Ok(())
}

/// Validates the free-text reason attached to a rejection.
///
/// # Errors
///
/// Returns `DomainError::MissingRejectionReason` if the reason is empty
/// or whitespace-only.
pub fn validate_rejection_motif(motif: &str) -> Result<(), DomainError> {
    if motif.trim().is_empty() {
        return Err(DomainError::MissingRejectionReason);
    }
    Ok(())
}
