//! Approval-queue commands.

use rasenmaeher_core::{Callsign, CallsignError};
use thiserror::Error;

use rasenmaeher_client::approvals::{ApprovalError, ApprovalQueue, ScanPayload};

/// Errors that can occur in queue commands.
#[derive(Debug, Error)]
pub enum QueueCommandError {
    /// Context setup failed.
    #[error(transparent)]
    Client(#[from] rasenmaeher_client::ClientError),

    /// Approval operation failed.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// The callsign argument is malformed.
    #[error("Invalid callsign: {0}")]
    InvalidCallsign(#[from] CallsignError),

    /// The payload carried no callsign and none was given.
    #[error("The payload carries no callsign; pass one with --callsign")]
    MissingCallsign,
}

async fn queue() -> Result<ApprovalQueue, QueueCommandError> {
    let ctx = super::context().await?;
    let queue = ApprovalQueue::new(ctx.client);
    queue.refresh().await?;
    Ok(queue)
}

/// List enrollees still awaiting a decision.
pub async fn list() -> Result<(), QueueCommandError> {
    let queue = queue().await?;
    let pending = queue.pending().await;

    if pending.is_empty() {
        tracing::info!("No pending enrollments");
        return Ok(());
    }

    for record in pending {
        tracing::info!("{}  {:?}", record.callsign, record.state);
    }
    Ok(())
}

/// Approve a pending enrollee.
///
/// The payload is the enrollee's QR URL or bare approval code; the
/// callsign comes from the payload when it carries one, otherwise from
/// the `--callsign` argument.
pub async fn approve(payload: &str, callsign: Option<&str>) -> Result<(), QueueCommandError> {
    let payload = ScanPayload::parse(payload)?;

    let callsign = match (&payload.callsign, callsign) {
        (Some(from_payload), _) => from_payload.clone(),
        (None, Some(raw)) => Callsign::parse(raw)?,
        (None, None) => return Err(QueueCommandError::MissingCallsign),
    };

    let queue = queue().await?;
    queue.approve(&callsign, &payload).await?;
    tracing::info!("Approved {callsign}");
    Ok(())
}

/// Reject a pending enrollee.
pub async fn reject(callsign: &str) -> Result<(), QueueCommandError> {
    let callsign = Callsign::parse(callsign)?;

    let queue = queue().await?;
    queue.reject(&callsign).await?;
    tracing::info!("Rejected {callsign}");
    Ok(())
}
