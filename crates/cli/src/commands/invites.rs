//! Invite-code administration commands.

use rasenmaeher_client::batch::BatchOutcome;
use rasenmaeher_client::invites::{InviteError, InviteManager};
use rasenmaeher_core::{InviteCodeToken, InviteCodeTokenError};
use thiserror::Error;

/// Errors that can occur in invite commands.
#[derive(Debug, Error)]
pub enum InvitesCommandError {
    /// Context setup failed.
    #[error(transparent)]
    Client(#[from] rasenmaeher_client::ClientError),

    /// Invite operation failed.
    #[error(transparent)]
    Invite(#[from] InviteError),

    /// The supplied invite code is not a valid token.
    #[error("Invalid invite code: {0}")]
    InvalidCode(#[from] InviteCodeTokenError),

    /// One or more items of a bulk operation failed.
    #[error("Bulk operation incomplete: {0}")]
    Partial(String),
}

async fn manager() -> Result<InviteManager, InvitesCommandError> {
    let ctx = super::context().await?;
    let manager = InviteManager::new(ctx.client);
    manager.refresh().await?;
    Ok(manager)
}

/// List all invite codes of the deployment.
pub async fn list() -> Result<(), InvitesCommandError> {
    let manager = manager().await?;
    let codes = manager.list().await;

    if codes.is_empty() {
        tracing::info!("No invite codes");
        return Ok(());
    }

    for invite in codes {
        tracing::info!(
            "{}  active={}  owner={}  created={}",
            invite.code,
            invite.active,
            invite.owner,
            invite.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

/// Create a new invite code.
pub async fn create() -> Result<(), InvitesCommandError> {
    let manager = manager().await?;
    let code = manager.create().await?;
    tracing::info!("Created invite code: {code}");
    Ok(())
}

/// Flip a code between active and inactive.
pub async fn toggle(code: &str) -> Result<(), InvitesCommandError> {
    let code = InviteCodeToken::parse(code)?;
    let manager = manager().await?;
    let now_active = manager.toggle(&code).await?;
    tracing::info!(
        "Invite code {code} is now {}",
        if now_active { "active" } else { "inactive" }
    );
    Ok(())
}

/// Delete invite codes, continuing past failures.
pub async fn bulk_delete(codes: &[String]) -> Result<(), InvitesCommandError> {
    let codes = parse_codes(codes)?;
    let manager = manager().await?;
    report(manager.bulk_delete(codes).await)
}

/// Activate invite codes, continuing past failures.
pub async fn bulk_enable(codes: &[String]) -> Result<(), InvitesCommandError> {
    let codes = parse_codes(codes)?;
    let manager = manager().await?;
    report(manager.bulk_enable(codes).await)
}

/// Deactivate invite codes, continuing past failures.
pub async fn bulk_disable(codes: &[String]) -> Result<(), InvitesCommandError> {
    let codes = parse_codes(codes)?;
    let manager = manager().await?;
    report(manager.bulk_disable(codes).await)
}

fn parse_codes(codes: &[String]) -> Result<Vec<InviteCodeToken>, InvitesCommandError> {
    codes
        .iter()
        .map(|code| InviteCodeToken::parse(code).map_err(InvitesCommandError::from))
        .collect()
}

fn report(outcome: BatchOutcome) -> Result<(), InvitesCommandError> {
    for (code, reason) in &outcome.failures {
        tracing::warn!("{code}: {reason}");
    }

    if outcome.is_full_success() {
        tracing::info!("{}", outcome.summary());
        Ok(())
    } else {
        Err(InvitesCommandError::Partial(outcome.summary()))
    }
}
