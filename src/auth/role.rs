//! User roles and what each one may do.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AccessError;

/// Account role as stored by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(rename = "agence")]
    Agency,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Agency => write!(f, "agence"),
            Role::Client => write!(f, "client"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "agence" | "agency" => Ok(Role::Agency),
            "client" => Ok(Role::Client),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Something a signed-in user may attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    ManageAgencies,
    ManageVehicles,
    ManageUsers,
    BookVehicle,
    ViewRecommendations,
    LocateAgencies,
    EditProfile,
}

impl Capability {
    pub fn all() -> &'static [Capability] {
        &[
            Capability::ViewDashboard,
            Capability::ManageAgencies,
            Capability::ManageVehicles,
            Capability::ManageUsers,
            Capability::BookVehicle,
            Capability::ViewRecommendations,
            Capability::LocateAgencies,
            Capability::EditProfile,
        ]
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::ViewDashboard => "view the dashboard",
            Capability::ManageAgencies => "manage agencies",
            Capability::ManageVehicles => "manage vehicles",
            Capability::ManageUsers => "manage users",
            Capability::BookVehicle => "book a vehicle",
            Capability::ViewRecommendations => "view recommendations",
            Capability::LocateAgencies => "locate agencies",
            Capability::EditProfile => "edit the profile",
        };
        f.write_str(s)
    }
}

impl Role {
    /// The single source of truth for role permissions
    pub fn can(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => !matches!(capability, BookVehicle | ViewRecommendations),
            Role::Agency => matches!(
                capability,
                ViewDashboard | ManageVehicles | LocateAgencies | EditProfile
            ),
            Role::Client => matches!(
                capability,
                BookVehicle | ViewRecommendations | LocateAgencies | EditProfile
            ),
        }
    }

    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(|c| self.can(*c))
            .collect()
    }
}

/// Check a capability, failing with the role and capability that were refused
pub fn authorize(role: Role, capability: Capability) -> Result<(), AccessError> {
    if role.can(capability) {
        Ok(())
    } else {
        Err(AccessError { role, capability })
    }
}
