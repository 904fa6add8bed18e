//! Login-code classification.
//!
//! A freshly entered login code could be an admin bootstrap code or an
//! enrollment invite code; the backend exposes a separate validity probe
//! for each kind. Both probes run concurrently and their answers are
//! combined, with the admin interpretation winning if the backend somehow
//! validates a code as both.

use thiserror::Error;
use tracing::{debug, instrument};

use rasenmaeher_core::{CodeKind, LoginCode, LoginCodeError};

use crate::api::{self, ApiClient, ApiError};

/// Errors that can occur while classifying a login code.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The code failed local shape validation before any network call.
    #[error("Invalid login code: {0}")]
    InvalidCode(#[from] LoginCodeError),

    /// A validity probe failed at the transport or status level.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Combined answers of the two backend validity probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The backend recognized the code as an admin bootstrap code.
    pub admin_code_valid: bool,
    /// The backend recognized the code as an active enrollment invite.
    pub enrollment_code_valid: bool,
}

impl Classification {
    /// Collapse the two probe answers into one code kind.
    ///
    /// Admin takes precedence when both probes answered positively.
    #[must_use]
    pub const fn kind(self) -> CodeKind {
        if self.admin_code_valid {
            CodeKind::AdminBootstrap
        } else if self.enrollment_code_valid {
            CodeKind::EnrollmentInvite
        } else {
            CodeKind::Unknown
        }
    }
}

/// Classify a raw login code by probing the backend.
///
/// The code is normalized and shape-checked first; both probes then run
/// concurrently. Probe answers of 404 mean "not this kind" and are not
/// errors.
///
/// # Errors
///
/// Returns [`ClassifierError::InvalidCode`] if the code fails local
/// validation, or [`ClassifierError::Api`] if either probe fails.
#[instrument(skip(client, raw_code))]
pub async fn classify(
    client: &ApiClient,
    raw_code: &str,
) -> Result<(LoginCode, Classification), ClassifierError> {
    let code = LoginCode::parse(raw_code)?;

    let (admin, enrollment) = tokio::join!(
        api::tokens::check_bootstrap_code(client, code.as_str()),
        api::enrollment::check_invite_code(client, code.as_str()),
    );

    let classification = Classification {
        admin_code_valid: admin?,
        enrollment_code_valid: enrollment?,
    };
    debug!(kind = ?classification.kind(), "classified login code");

    Ok((code, classification))
}
