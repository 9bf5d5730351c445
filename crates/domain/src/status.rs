// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Demande status states.
//!
//! Status transitions are actor-initiated only; the system never
//! advances a demande based on time alone. The ordered sequence of
//! statuses for each demande type is defined in the `flow` module.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Workflow status of a demande.
///
/// The two flows (material and tooling) share most statuses; the two
/// diverge at the first validation step and at the preparation step,
/// then reconverge at deliverer reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandeStatus {
    /// Created but not yet submitted into a flow.
    Brouillon,
    /// Awaiting site-supervisor validation (material flow only).
    EnAttenteValidationConducteur,
    /// Awaiting initial logistics validation (tooling flow only).
    EnAttenteValidationLogistique,
    /// Awaiting works-manager validation.
    EnAttenteValidationResponsableTravaux,
    /// Awaiting business-manager validation.
    EnAttenteValidationChargeAffaire,
    /// Awaiting supply-officer preparation (material flow only).
    EnAttentePreparationAppro,
    /// Awaiting logistics preparation (tooling flow only).
    EnAttentePreparationLogistique,
    /// Awaiting deliverer pickup of the prepared demande.
    EnAttenteReceptionLivreur,
    /// Picked up, awaiting delivery to the requester.
    EnAttenteLivraison,
    /// Delivered, awaiting final requester validation and closure.
    EnAttenteValidationFinale,
    /// Closed by the requester.
    Cloturee,
    /// Rejected past recovery; a new demande must be created.
    Rejetee,
    /// Archived after closure; read-only.
    Archivee,
}

impl DemandeStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Brouillon => "brouillon",
            Self::EnAttenteValidationConducteur => "en_attente_validation_conducteur",
            Self::EnAttenteValidationLogistique => "en_attente_validation_logistique",
            Self::EnAttenteValidationResponsableTravaux => {
                "en_attente_validation_responsable_travaux"
            }
            Self::EnAttenteValidationChargeAffaire => "en_attente_validation_charge_affaire",
            Self::EnAttentePreparationAppro => "en_attente_preparation_appro",
            Self::EnAttentePreparationLogistique => "en_attente_preparation_logistique",
            Self::EnAttenteReceptionLivreur => "en_attente_reception_livreur",
            Self::EnAttenteLivraison => "en_attente_livraison",
            Self::EnAttenteValidationFinale => "en_attente_validation_finale",
            Self::Cloturee => "cloturee",
            Self::Rejetee => "rejetee",
            Self::Archivee => "archivee",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "brouillon" => Ok(Self::Brouillon),
            "en_attente_validation_conducteur" => Ok(Self::EnAttenteValidationConducteur),
            "en_attente_validation_logistique" => Ok(Self::EnAttenteValidationLogistique),
            "en_attente_validation_responsable_travaux" => {
                Ok(Self::EnAttenteValidationResponsableTravaux)
            }
            "en_attente_validation_charge_affaire" => Ok(Self::EnAttenteValidationChargeAffaire),
            "en_attente_preparation_appro" => Ok(Self::EnAttentePreparationAppro),
            "en_attente_preparation_logistique" => Ok(Self::EnAttentePreparationLogistique),
            "en_attente_reception_livreur" => Ok(Self::EnAttenteReceptionLivreur),
            "en_attente_livraison" => Ok(Self::EnAttenteLivraison),
            "en_attente_validation_finale" => Ok(Self::EnAttenteValidationFinale),
            "cloturee" => Ok(Self::Cloturee),
            "rejetee" => Ok(Self::Rejetee),
            "archivee" => Ok(Self::Archivee),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if this status is terminal.
    ///
    /// A demande in a terminal status accepts no further workflow
    /// actions, and a sub-demande in a terminal status no longer blocks
    /// closure of its parent.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cloturee | Self::Rejetee | Self::Archivee)
    }

    /// Returns all enumerated statuses, in declaration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Brouillon,
            Self::EnAttenteValidationConducteur,
            Self::EnAttenteValidationLogistique,
            Self::EnAttenteValidationResponsableTravaux,
            Self::EnAttenteValidationChargeAffaire,
            Self::EnAttentePreparationAppro,
            Self::EnAttentePreparationLogistique,
            Self::EnAttenteReceptionLivreur,
            Self::EnAttenteLivraison,
            Self::EnAttenteValidationFinale,
            Self::Cloturee,
            Self::Rejetee,
            Self::Archivee,
        ]
    }
}

impl FromStr for DemandeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for DemandeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
