//! Core types for the Rasenmaeher client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod callsign;
pub mod codes;
pub mod enrollment;
pub mod role;
pub mod user;

pub use callsign::{Callsign, CallsignError};
pub use codes::{
    ApprovalCode, ApprovalCodeError, InviteCodeToken, InviteCodeTokenError, LoginCode,
    LoginCodeError,
};
pub use enrollment::{EnrollmentRecord, EnrollmentState, InviteCode};
pub use role::{AuthMechanism, CodeKind, Role};
pub use user::{ADMIN_ROLE, UserRecord};
