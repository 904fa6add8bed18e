//! Authentication mechanism, role, and code-kind enums.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How the current caller authenticated to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMechanism {
    /// Not authenticated.
    #[default]
    None,
    /// Client-certificate (mTLS) authentication.
    Certificate,
    /// Bearer token (JWT) authentication.
    Token,
}

impl AuthMechanism {
    /// Returns true if the caller is authenticated by any mechanism.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Certificate => write!(f, "certificate"),
            Self::Token => write!(f, "token"),
        }
    }
}

/// The caller's role as confirmed by the backend.
///
/// Roles are ordered: `Admin` implies every `User` capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// No confirmed role.
    #[default]
    None,
    /// Accepted regular user.
    User,
    /// Administrator; includes all user capabilities.
    Admin,
}

impl Role {
    /// Returns true if this role grants administrative capabilities.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role grants at least regular-user capabilities.
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::User | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Classification of a login code after asking the backend.
///
/// A code is never both kinds at once as far as the rest of the client is
/// concerned: when both backend predicates accept a code, admin bootstrap
/// takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    /// One-time admin bootstrap code.
    AdminBootstrap,
    /// Reusable enrollment invite code.
    EnrollmentInvite,
    /// Neither predicate accepted the code.
    Unknown,
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminBootstrap => write!(f, "admin bootstrap code"),
            Self::EnrollmentInvite => write!(f, "enrollment invite code"),
            Self::Unknown => write!(f, "unknown code"),
        }
    }
}
