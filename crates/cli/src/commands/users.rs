//! User listing and role-management commands.

use rasenmaeher_core::{Callsign, CallsignError};
use thiserror::Error;

use rasenmaeher_client::identity;
use rasenmaeher_client::roles::{RoleError, RoleManager};

/// Errors that can occur in user commands.
#[derive(Debug, Error)]
pub enum UsersCommandError {
    /// Context setup failed.
    #[error(transparent)]
    Client(#[from] rasenmaeher_client::ClientError),

    /// Role operation failed.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// The callsign argument is malformed.
    #[error("Invalid callsign: {0}")]
    InvalidCallsign(#[from] CallsignError),

    /// The backend does not recognize the caller as an accepted user.
    #[error("Not signed in; enroll first")]
    NotSignedIn,
}

/// Build the role manager, acting as the resolved caller identity.
async fn manager() -> Result<RoleManager, UsersCommandError> {
    let ctx = super::context().await?;

    let snapshot = identity::resolve(&ctx.client).await;
    let current = snapshot
        .callsign()
        .cloned()
        .ok_or(UsersCommandError::NotSignedIn)?;

    let manager = RoleManager::new(ctx.client, current);
    manager.refresh().await?;
    Ok(manager)
}

/// List all users with their roles.
pub async fn list() -> Result<(), UsersCommandError> {
    let manager = manager().await?;

    for user in manager.list().await {
        let roles: Vec<&str> = user.roles.iter().map(String::as_str).collect();
        tracing::info!("{}  roles=[{}]", user.callsign, roles.join(", "));
    }
    Ok(())
}

/// Grant the admin role to a user.
pub async fn promote(callsign: &str) -> Result<(), UsersCommandError> {
    let target = Callsign::parse(callsign)?;
    let manager = manager().await?;
    manager.promote(&target).await?;
    tracing::info!("Promoted {target}");
    Ok(())
}

/// Revoke the admin role from a user.
pub async fn demote(callsign: &str) -> Result<(), UsersCommandError> {
    let target = Callsign::parse(callsign)?;
    let manager = manager().await?;
    manager.demote(&target).await?;
    tracing::info!("Demoted {target}");
    Ok(())
}

/// Remove a user from the deployment.
pub async fn remove(callsign: &str) -> Result<(), UsersCommandError> {
    let target = Callsign::parse(callsign)?;
    let manager = manager().await?;
    manager.remove(&target).await?;
    tracing::info!("Removed {target}");
    Ok(())
}
