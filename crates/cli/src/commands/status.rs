//! Identity status command.

use rasenmaeher_client::{ClientError, identity};

/// Resolve and print who the backend thinks we are.
pub async fn show() -> Result<(), ClientError> {
    let ctx = super::context().await?;
    let snapshot = identity::resolve(&ctx.client).await;

    tracing::info!("Deployment: {}", ctx.client.base_url());
    tracing::info!("Authentication: {:?}", snapshot.auth_mechanism());

    match snapshot.callsign() {
        Some(callsign) => tracing::info!("Callsign: {callsign}"),
        None => tracing::info!("Callsign: (none)"),
    }
    tracing::info!("Accepted user: {}", snapshot.is_valid_user());
    tracing::info!("Role: {:?}", snapshot.role());

    if let Some(error) = snapshot.error() {
        tracing::warn!("Identity resolution was incomplete: {error}");
    }

    Ok(())
}
