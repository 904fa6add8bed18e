//! Enrollment command.
//!
//! # Usage
//!
//! ```bash
//! # Enroll with an invite code and wait for an admin to approve
//! rasa enroll --code abcd1234 --callsign eagle1 --wait
//!
//! # Bootstrap the first admin (same command, admin bootstrap code)
//! rasa enroll --code firstadm1n --callsign boss1
//! ```

use rasenmaeher_client::ClientError;
use rasenmaeher_client::enrollment::{
    ACCEPTANCE_POLL_INTERVAL, EnrollmentWorkflow, WorkflowState,
};

/// Drive the enrollment workflow from code to issued credential.
pub async fn enroll(code: &str, callsign: &str, wait: bool) -> Result<(), ClientError> {
    let ctx = super::context().await?;
    let mut workflow = EnrollmentWorkflow::new(ctx.client, ctx.store);

    let kind = workflow.submit_code(code).await.map_err(ClientError::from)?;
    tracing::info!("Login code accepted ({kind:?})");

    workflow
        .submit_callsign(callsign)
        .await
        .map_err(ClientError::from)?;

    let pending = match workflow.state() {
        WorkflowState::AdminIssued { callsign } => {
            tracing::info!("Admin credentials issued for {callsign}");
            false
        }
        WorkflowState::EnrollmentPending {
            callsign,
            approval_code,
        } => {
            tracing::info!("Enrollment submitted for {callsign}");
            tracing::info!("Show this approval code to an admin: {approval_code}");
            true
        }
        _ => false,
    };

    if pending && wait {
        tracing::info!("Waiting for an admin to approve...");
        workflow
            .wait_for_acceptance(ACCEPTANCE_POLL_INTERVAL)
            .await
            .map_err(ClientError::from)?;
        tracing::info!("Enrollment approved");
    }

    Ok(())
}
