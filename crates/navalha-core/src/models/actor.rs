//! Caller identity and staff directory models
//!
//! Every mutating call carries an [`Actor`]: the authenticated caller's id
//! and role as supplied by the (out of scope) request layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Caller role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Super administrator with system-wide access
    SuperAdmin,
    /// Administrator managing the shop
    Admin,
    /// Staff member performing services
    Barbeiro,
    /// Client booking services
    #[default]
    Cliente,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::SuperAdmin => write!(f, "SUPER_ADMIN"),
            Role::Admin => write!(f, "ADMIN"),
            Role::Barbeiro => write!(f, "BARBEIRO"),
            Role::Cliente => write!(f, "CLIENTE"),
        }
    }
}

impl Role {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "BARBEIRO" => Some(Role::Barbeiro),
            "CLIENTE" => Some(Role::Cliente),
            _ => None,
        }
    }

    /// Check if role has administrative privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

/// Authenticated caller of a core operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    /// Check if the actor can perform administrative actions
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Staff directory entry
///
/// Read model used when booking: the staff member must exist and be
/// accepting bookings. Full user management lives outside the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub display_name: String,
    /// Whether the staff member is currently accepting bookings
    pub available: bool,
}
