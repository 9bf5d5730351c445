// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::role::Role;
use serde::{Deserialize, Serialize};

/// A user of the system.
///
/// Access to a demande requires project membership, ownership (being
/// the demandeur), or the admin override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utilisateur {
    /// Canonical internal identifier.
    pub user_id: i64,
    /// Display name.
    pub nom: String,
    /// The user's role.
    pub role: Role,
    /// Projects this user is a member of.
    pub projets: Vec<i64>,
    /// Admin override: full access and unrestricted deletion.
    pub is_admin: bool,
}

impl Utilisateur {
    /// Creates a new user.
    #[must_use]
    pub const fn new(user_id: i64, nom: String, role: Role, projets: Vec<i64>) -> Self {
        Self {
            user_id,
            nom,
            role,
            projets,
            is_admin: false,
        }
    }

    /// Creates a new admin user.
    #[must_use]
    pub const fn new_admin(user_id: i64, nom: String, role: Role, projets: Vec<i64>) -> Self {
        Self {
            user_id,
            nom,
            role,
            projets,
            is_admin: true,
        }
    }

    /// Returns true if the user is a member of the given project.
    #[must_use]
    pub fn is_member_of(&self, projet_id: i64) -> bool {
        self.projets.contains(&projet_id)
    }

    /// Returns true if the user holds superadmin authority, either via
    /// the role or via the admin flag.
    #[must_use]
    pub const fn is_superadmin(&self) -> bool {
        matches!(self.role, Role::Superadmin) || self.is_admin
    }
}
