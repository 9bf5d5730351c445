// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reception validation state machine.
//!
//! At the final receipt step the requester confirms, per line, how much
//! arrived and how much is accepted. Quantity arithmetic is clamped,
//! never rejected; a refusal reason is mandatory as soon as any
//! quantity is refused.

use crate::error::DomainError;
use crate::item::ItemDemande;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Why a received quantity was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotifRefus {
    /// Goods arrived damaged.
    Endommage,
    /// Goods do not match the ordered article.
    NonConforme,
    /// Goods missing from the delivery.
    Manquant,
    /// Any other reason, detailed in the comment.
    Autre,
}

impl MotifRefus {
    /// Returns the string representation of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Endommage => "endommage",
            Self::NonConforme => "non_conforme",
            Self::Manquant => "manquant",
            Self::Autre => "autre",
        }
    }
}

impl FromStr for MotifRefus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endommage" => Ok(Self::Endommage),
            "non_conforme" => Ok(Self::NonConforme),
            "manquant" => Ok(Self::Manquant),
            "autre" => Ok(Self::Autre),
            _ => Err(DomainError::InvalidMotifRefus(s.to_string())),
        }
    }
}

/// Overall (or per-item) outcome of a reception validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceptionOutcome {
    /// Every quantity accepted.
    TotalementAcceptee,
    /// Some quantities accepted, some refused.
    PartiellementAcceptee,
    /// Every validated quantity refused.
    TotalementRefusee,
}

impl ReceptionOutcome {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TotalementAcceptee => "totalement_acceptee",
            Self::PartiellementAcceptee => "partiellement_acceptee",
            Self::TotalementRefusee => "totalement_refusee",
        }
    }
}

/// The requester's per-line input to a reception validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemValidationInput {
    /// The line item being validated.
    pub item_id: i64,
    /// Quantity that physically arrived.
    pub quantite_recue: u32,
    /// Explicitly accepted quantity. When absent, acceptance is derived
    /// from the received quantity.
    pub quantite_acceptee: Option<u32>,
    /// Mandatory as soon as any quantity is refused.
    pub motif_refus: Option<MotifRefus>,
    /// Free-text comment on this line.
    pub commentaire: Option<String>,
    /// References to photos documenting the refusal.
    pub photos: Vec<String>,
}

/// One settled line of a reception validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemValidation {
    /// The line item identifier.
    pub item_id: i64,
    /// Article reference.
    pub article: String,
    /// Quantity the validators granted.
    pub quantite_validee: u32,
    /// Quantity that physically arrived.
    pub quantite_recue: u32,
    /// Quantity accepted by the requester.
    pub quantite_acceptee: u32,
    /// Quantity refused by the requester.
    pub quantite_refusee: u32,
    /// Reason for the refusal, present whenever `quantite_refusee > 0`.
    pub motif_refus: Option<MotifRefus>,
    /// Free-text comment on this line.
    pub commentaire: Option<String>,
    /// References to photos documenting the refusal.
    pub photos: Vec<String>,
}

impl ItemValidation {
    /// Outcome of this single line.
    #[must_use]
    pub const fn outcome(&self) -> ReceptionOutcome {
        if self.quantite_refusee == 0 {
            ReceptionOutcome::TotalementAcceptee
        } else if self.quantite_refusee >= self.quantite_validee {
            ReceptionOutcome::TotalementRefusee
        } else {
            ReceptionOutcome::PartiellementAcceptee
        }
    }
}

/// The settled reception validation for a demande.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionValidation {
    /// Aggregated outcome across all lines.
    pub statut: ReceptionOutcome,
    /// Per-line records. Empty when the whole delivery was refused via
    /// the global override.
    pub items: Vec<ItemValidation>,
    /// Free-text comment on the reception as a whole.
    pub commentaire_general: Option<String>,
}

/// Settles one line from the requester's input.
///
/// When the input carries an explicit accepted quantity, acceptance is
/// clamped to the received quantity and the refusal is measured against
/// what arrived; otherwise acceptance is derived from what arrived,
/// clamped to the validated quantity, and the refusal is the validated
/// shortfall.
///
/// # Errors
///
/// Returns `DomainError::MissingRefusalReason` if any quantity is
/// refused without a reason.
pub fn process_item(
    item: &ItemDemande,
    input: &ItemValidationInput,
) -> Result<ItemValidation, DomainError> {
    let validee = item.validee_effective();
    let recue = input.quantite_recue;

    let (acceptee, refusee) = match input.quantite_acceptee {
        Some(explicit) => {
            let acceptee = explicit.min(recue);
            (acceptee, recue - acceptee)
        }
        None => {
            let acceptee = recue.min(validee);
            (acceptee, validee - acceptee)
        }
    };

    if refusee > 0 && input.motif_refus.is_none() {
        return Err(DomainError::MissingRefusalReason {
            article: item.article.clone(),
        });
    }

    Ok(ItemValidation {
        item_id: input.item_id,
        article: item.article.clone(),
        quantite_validee: validee,
        quantite_recue: recue,
        quantite_acceptee: acceptee,
        quantite_refusee: refusee,
        motif_refus: input.motif_refus,
        commentaire: input.commentaire.clone(),
        photos: input.photos.clone(),
    })
}

/// Aggregates per-line records into the overall outcome.
#[must_use]
pub fn aggregate_outcome(items: &[ItemValidation]) -> ReceptionOutcome {
    if items.iter().all(|i| i.quantite_refusee == 0) {
        ReceptionOutcome::TotalementAcceptee
    } else if items
        .iter()
        .all(|i| i.quantite_refusee >= i.quantite_validee)
    {
        ReceptionOutcome::TotalementRefusee
    } else {
        ReceptionOutcome::PartiellementAcceptee
    }
}

/// Runs the reception validation state machine over a demande's lines.
///
/// With `refuse_all` set, per-item detail is not required: the entire
/// delivery is refused and the demande is routed back to preparation by
/// the caller. Otherwise every line item must be covered by exactly one
/// input record.
///
/// # Errors
///
/// Returns an error if a line is missing from the inputs, an input
/// references an unknown line, or a refusal lacks its reason.
pub fn build_reception(
    items: &[ItemDemande],
    inputs: &[ItemValidationInput],
    refuse_all: bool,
    commentaire_general: Option<String>,
) -> Result<ReceptionValidation, DomainError> {
    if refuse_all {
        return Ok(ReceptionValidation {
            statut: ReceptionOutcome::TotalementRefusee,
            items: Vec::new(),
            commentaire_general,
        });
    }

    let mut settled: Vec<ItemValidation> = Vec::with_capacity(items.len());
    for item in items {
        let Some(item_id) = item.item_id else {
            return Err(DomainError::MissingItemValidation {
                article: item.article.clone(),
            });
        };
        let Some(input) = inputs.iter().find(|i| i.item_id == item_id) else {
            return Err(DomainError::MissingItemValidation {
                article: item.article.clone(),
            });
        };
        settled.push(process_item(item, input)?);
    }

    for input in inputs {
        if !items.iter().any(|i| i.item_id == Some(input.item_id)) {
            return Err(DomainError::ItemNotFound {
                item_id: input.item_id,
            });
        }
    }

    Ok(ReceptionValidation {
        statut: aggregate_outcome(&settled),
        items: settled,
        commentaire_general,
    })
}
