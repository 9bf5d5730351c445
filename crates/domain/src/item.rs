// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Line items and quantity reconciliation.
//!
//! Quantities move through four stages: requested, validated, issued
//! from stock, received. Each stage is normally bounded by the one
//! before it, but operational shortages violate that bound routinely,
//! so violations are surfaced as variances rather than rejected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One article line within a demande.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDemande {
    /// Canonical identifier assigned by the record store.
    pub item_id: Option<i64>,
    /// Article reference.
    pub article: String,
    /// Quantity requested by the demandeur. Always strictly positive.
    pub quantite_demandee: u32,
    /// Quantity granted by the validators. Defaults to the requested
    /// quantity when no validator edits it.
    pub quantite_validee: Option<u32>,
    /// Quantity issued from stock at preparation.
    pub quantite_sortie: Option<u32>,
    /// Quantity effectively received and kept by the demandeur.
    pub quantite_recue: Option<u32>,
    /// Unit price, visible only to cost-cleared roles.
    pub prix_unitaire: Option<Decimal>,
    /// Free-text comment on this line.
    pub commentaire: Option<String>,
}

impl ItemDemande {
    /// Creates a new line item with only the requested quantity set.
    #[must_use]
    pub const fn new(article: String, quantite_demandee: u32) -> Self {
        Self {
            item_id: None,
            article,
            quantite_demandee,
            quantite_validee: None,
            quantite_sortie: None,
            quantite_recue: None,
            prix_unitaire: None,
            commentaire: None,
        }
    }

    /// The validated quantity, defaulting to the requested quantity.
    #[must_use]
    pub const fn validee_effective(&self) -> u32 {
        match self.quantite_validee {
            Some(q) => q,
            None => self.quantite_demandee,
        }
    }
}

/// Per-line variances between consecutive quantity stages.
///
/// Positive values are shortfalls; negative values surface over-issues
/// and over-receipts instead of rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcartItem {
    /// The line item identifier, if persisted.
    pub item_id: Option<i64>,
    /// Article reference.
    pub article: String,
    /// `quantite_demandee - quantite_validee`.
    pub ecart_validation: i64,
    /// `quantite_validee - quantite_sortie`.
    pub ecart_stock: i64,
    /// `quantite_sortie - quantite_recue`.
    pub ecart_livraison: i64,
    /// `quantite_demandee - quantite_recue`.
    pub ecart_total: i64,
}

/// Quantity totals across every line of a demande.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotauxQuantites {
    /// Sum of requested quantities.
    pub demandee: u64,
    /// Sum of validated quantities.
    pub validee: u64,
    /// Sum of issued quantities.
    pub sortie: u64,
    /// Sum of received quantities.
    pub recue: u64,
}

/// The result of reconciling a demande's line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Per-line variances, in line order.
    pub par_item: Vec<EcartItem>,
    /// Quantity totals.
    pub totaux: TotauxQuantites,
    /// Aggregate cost: sum of validated quantity times unit price over
    /// the lines that carry a price. `None` when no line is priced.
    pub cout_total: Option<Decimal>,
}

/// Derives variance and completion metrics from a demande's line items.
///
/// Pure aggregation, independent of the demande's status. Quantities
/// not yet populated are treated as zero, so the variances read as
/// "still outstanding at this stage".
#[must_use]
pub fn reconcile(items: &[ItemDemande]) -> Reconciliation {
    let mut par_item: Vec<EcartItem> = Vec::with_capacity(items.len());
    let mut totaux = TotauxQuantites::default();
    let mut cout_total: Option<Decimal> = None;

    for item in items {
        let demandee = i64::from(item.quantite_demandee);
        let validee = i64::from(item.validee_effective());
        let sortie = i64::from(item.quantite_sortie.unwrap_or(0));
        let recue = i64::from(item.quantite_recue.unwrap_or(0));

        par_item.push(EcartItem {
            item_id: item.item_id,
            article: item.article.clone(),
            ecart_validation: demandee - validee,
            ecart_stock: validee - sortie,
            ecart_livraison: sortie - recue,
            ecart_total: demandee - recue,
        });

        totaux.demandee += u64::from(item.quantite_demandee);
        totaux.validee += u64::from(item.validee_effective());
        totaux.sortie += u64::from(item.quantite_sortie.unwrap_or(0));
        totaux.recue += u64::from(item.quantite_recue.unwrap_or(0));

        if let Some(prix) = item.prix_unitaire {
            let line_cost = prix * Decimal::from(item.validee_effective());
            cout_total = Some(cout_total.unwrap_or(Decimal::ZERO) + line_cost);
        }
    }

    Reconciliation {
        par_item,
        totaux,
        cout_total,
    }
}

/// Returns true if any line carries a positive total variance, i.e.
/// a sub-demande is warranted after final receipt.
#[must_use]
pub fn besoin_sous_demande(reconciliation: &Reconciliation) -> bool {
    reconciliation.par_item.iter().any(|e| e.ecart_total > 0)
}

/// Builds the line items of a variance sub-demande: one line per item
/// with a positive total variance, requesting only the outstanding
/// quantity.
#[must_use]
pub fn items_ecart(items: &[ItemDemande]) -> Vec<ItemDemande> {
    items
        .iter()
        .filter_map(|item| {
            let outstanding =
                i64::from(item.quantite_demandee) - i64::from(item.quantite_recue.unwrap_or(0));
            u32::try_from(outstanding).ok().filter(|o| *o > 0).map(|o| {
                let mut line = ItemDemande::new(item.article.clone(), o);
                line.prix_unitaire = item.prix_unitaire;
                line
            })
        })
        .collect()
}
