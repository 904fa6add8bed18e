//! Enrollment records and invite codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::callsign::Callsign;
use super::codes::InviteCodeToken;

/// State of an enrollment record.
///
/// Transitions are one-way: `Pending -> Approved` or `Pending -> Rejected`.
/// The terminal states have no path back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentState {
    /// Waiting for an admin decision.
    Pending,
    /// Accepted by an admin; the callsign is live.
    Approved,
    /// Locked out by an admin.
    Rejected,
}

impl EnrollmentState {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Returns true if a transition from `self` to `next` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected)
        )
    }
}

/// A pending/approved/rejected status entry created when a user claims a
/// callsign against an invite code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// The claimed callsign.
    pub callsign: Callsign,
    /// Current state of the enrollment.
    pub state: EnrollmentState,
}

impl EnrollmentRecord {
    /// Returns true if this record is still waiting for a decision.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, EnrollmentState::Pending)
    }
}

/// A reusable admin-issued token permitting new-user enrollment.
///
/// Multiple users may enroll against the same active code; deactivation
/// prevents new enrollments but does not affect already-enrolled users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteCode {
    /// The opaque invite-code token.
    pub code: InviteCodeToken,
    /// Whether new enrollments against this code are accepted.
    pub active: bool,
    /// Callsign of the admin who created the code.
    pub owner: Callsign,
    /// When the code was created.
    pub created_at: DateTime<Utc>,
}
