// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The demande entity and its identity helpers.

use crate::error::DomainError;
use crate::status::DemandeStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of rejections a demande may accumulate.
///
/// Once reached, further rejections are refused and a new demande must
/// be created.
pub const MAX_REJETS: u8 = 3;

/// The type of a demande, selecting which flow it follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDemande {
    /// Construction material, validated first by the site supervisor.
    Materiel,
    /// Tooling, validated first by logistics.
    Outillage,
}

impl TypeDemande {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Materiel => "materiel",
            Self::Outillage => "outillage",
        }
    }

    /// Returns the sequence-number prefix for this type.
    #[must_use]
    pub const fn numero_prefix(&self) -> &'static str {
        match self {
            Self::Materiel => "MAT",
            Self::Outillage => "OUT",
        }
    }

    /// Parses a type from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRequestType` if the string is not a
    /// valid type.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "materiel" => Ok(Self::Materiel),
            "outillage" => Ok(Self::Outillage),
            _ => Err(DomainError::InvalidRequestType(s.to_string())),
        }
    }
}

impl FromStr for TypeDemande {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for TypeDemande {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a demande is a principal request or a variance sub-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandeKind {
    /// A demande created directly by a requester.
    Principale,
    /// A demande created to cover a shortfall of a parent demande.
    SousDemande,
}

impl DemandeKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Principale => "principale",
            Self::SousDemande => "sous_demande",
        }
    }
}

impl FromStr for DemandeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "principale" => Ok(Self::Principale),
            "sous_demande" => Ok(Self::SousDemande),
            _ => Err(DomainError::InvalidRequestKind(s.to_string())),
        }
    }
}

/// Formats a human-readable sequential demande number.
///
/// The format is `{PREFIX}-{YEAR}-{SEQ:04}`, e.g. `MAT-2026-0012`.
/// Collision handling (retry, randomized suffix) belongs to the
/// sequence generator in the persistence layer.
#[must_use]
pub fn format_numero(type_demande: TypeDemande, year: i32, seq: u32) -> String {
    format!("{}-{year}-{seq:04}", type_demande.numero_prefix())
}

/// A procurement request.
///
/// The demande is the central entity of the workflow. Its `statut`
/// advances monotonically along the flow for its type, except for the
/// rejection rollback path (one step back) and the superadmin override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demande {
    /// Canonical identifier assigned by the record store.
    /// `None` indicates the demande has not been persisted yet.
    pub demande_id: Option<i64>,
    /// Human-readable sequential number, unique across all demandes.
    pub numero: String,
    /// The type of demande, selecting the flow.
    pub type_demande: TypeDemande,
    /// Principal demande or variance sub-demande.
    pub kind: DemandeKind,
    /// Parent demande id when `kind` is `SousDemande`.
    pub demande_parent_id: Option<i64>,
    /// Current workflow status.
    pub statut: DemandeStatus,
    /// The status that was left on the last rejection rollback.
    /// Cleared when the demande advances again.
    pub statut_precedent: Option<DemandeStatus>,
    /// How many times this demande has been rejected.
    pub nombre_rejets: u8,
    /// The user who created the demande; the only one who may close it.
    pub demandeur_id: i64,
    /// The project this demande belongs to.
    pub projet_id: i64,
    /// Optional desired delivery date.
    pub date_livraison_souhaitee: Option<time::Date>,
    /// Deliverer assigned at preparation, if any.
    pub livreur_id: Option<i64>,
    /// Free-text comments carried on the demande itself.
    pub commentaires: Option<String>,
    /// Creation timestamp (RFC 3339), stamped at the API boundary.
    pub cree_le: String,
    /// Last-modification timestamp (RFC 3339), stamped at the API boundary.
    pub modifie_le: String,
}

impl Demande {
    /// Creates a new, unpersisted demande.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        numero: String,
        type_demande: TypeDemande,
        kind: DemandeKind,
        demande_parent_id: Option<i64>,
        statut: DemandeStatus,
        demandeur_id: i64,
        projet_id: i64,
        cree_le: String,
    ) -> Self {
        Self {
            demande_id: None,
            numero,
            type_demande,
            kind,
            demande_parent_id,
            statut,
            statut_precedent: None,
            nombre_rejets: 0,
            demandeur_id,
            projet_id,
            date_livraison_souhaitee: None,
            livreur_id: None,
            commentaires: None,
            modifie_le: cree_le.clone(),
            cree_le,
        }
    }

    /// Returns true if this demande is a variance sub-demande.
    #[must_use]
    pub const fn is_sous_demande(&self) -> bool {
        matches!(self.kind, DemandeKind::SousDemande)
    }

    /// Returns true if the demande may still be rejected without
    /// breaching the rejection ceiling.
    #[must_use]
    pub const fn can_reject(&self) -> bool {
        self.nombre_rejets < MAX_REJETS
    }
}
