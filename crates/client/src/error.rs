//! Unified error handling for the client.

use thiserror::Error;

use crate::api::ApiError;
use crate::approvals::ApprovalError;
use crate::classifier::ClassifierError;
use crate::config::ConfigError;
use crate::enrollment::WorkflowError;
use crate::invites::InviteError;
use crate::roles::RoleError;
use crate::storage::StorageError;

/// Top-level error type aggregating every subsystem.
///
/// Workflow code uses the specific error types; this exists for front ends
/// (the CLI) that funnel everything into one reporting path.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Login-code classification failed.
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Enrollment workflow failed.
    #[error("Enrollment error: {0}")]
    Enrollment(#[from] WorkflowError),

    /// Invite-code operation failed.
    #[error("Invite error: {0}")]
    Invite(#[from] InviteError),

    /// Approval-queue operation failed.
    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),

    /// Role-management operation failed.
    #[error("Role error: {0}")]
    Role(#[from] RoleError),
}
