// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor roles for the demande workflow.
//!
//! Each validator role owns exactly one step in a flow, except
//! `logistique`, which owns two steps in the tooling flow (initial
//! validation and preparation).

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A role held by a user of the system.
///
/// Roles determine which workflow steps a user may act on. The
/// requester of a demande may hold any role; closure rights derive from
/// ownership, not from the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Base role: may create demandes and close their own.
    Employe,
    /// Site supervisor: first validator of the material flow.
    ConducteurTravaux,
    /// Works manager: second validator of both flows.
    ResponsableTravaux,
    /// Business manager: final validator before preparation.
    ChargeAffaire,
    /// Supply officer: prepares material demandes from stock.
    Appro,
    /// Logistics: first validator and preparer of the tooling flow.
    Logistique,
    /// Deliverer: picks up and delivers prepared demandes.
    Livreur,
    /// Superadmin: may force any transition and sees all data.
    Superadmin,
}

impl Role {
    /// Returns the string representation of the role.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employe => "employe",
            Self::ConducteurTravaux => "conducteur_travaux",
            Self::ResponsableTravaux => "responsable_travaux",
            Self::ChargeAffaire => "charge_affaire",
            Self::Appro => "appro",
            Self::Logistique => "logistique",
            Self::Livreur => "livreur",
            Self::Superadmin => "superadmin",
        }
    }

    /// Parses a role from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRole` if the string is not a valid role.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "employe" => Ok(Self::Employe),
            "conducteur_travaux" => Ok(Self::ConducteurTravaux),
            "responsable_travaux" => Ok(Self::ResponsableTravaux),
            "charge_affaire" => Ok(Self::ChargeAffaire),
            "appro" => Ok(Self::Appro),
            "logistique" => Ok(Self::Logistique),
            "livreur" => Ok(Self::Livreur),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }

    /// Returns true if this role may see unit prices and aggregate cost.
    ///
    /// Cost data is stripped from API responses for every other role.
    #[must_use]
    pub const fn can_view_cost(&self) -> bool {
        matches!(self, Self::Superadmin | Self::Logistique | Self::Appro)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_string_round_trip() {
        let roles = vec![
            Role::Employe,
            Role::ConducteurTravaux,
            Role::ResponsableTravaux,
            Role::ChargeAffaire,
            Role::Appro,
            Role::Logistique,
            Role::Livreur,
            Role::Superadmin,
        ];

        for role in roles {
            let s = role.as_str();
            match Role::parse_str(s) {
                Ok(parsed) => assert_eq!(role, parsed),
                Err(e) => panic!("Failed to parse role string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_invalid_role_string() {
        let result = Role::parse_str("chef_projet");
        assert!(result.is_err());
    }

    #[test]
    fn test_cost_visibility() {
        assert!(Role::Superadmin.can_view_cost());
        assert!(Role::Logistique.can_view_cost());
        assert!(Role::Appro.can_view_cost());
        assert!(!Role::Employe.can_view_cost());
        assert!(!Role::ConducteurTravaux.can_view_cost());
        assert!(!Role::Livreur.can_view_cost());
    }
}
