//! Enrolled user records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::callsign::Callsign;

/// Role name carried by the backend for administrators.
pub const ADMIN_ROLE: &str = "admin";

/// An enrolled user and the extra roles granted to them.
///
/// Every record is at least a regular user; `roles` only carries grants
/// beyond that (currently just `"admin"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// The user's callsign.
    pub callsign: Callsign,
    /// Extra roles granted to the user.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl UserRecord {
    /// Returns true if the user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(ADMIN_ROLE)
    }
}
