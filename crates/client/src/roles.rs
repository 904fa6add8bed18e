//! Admin-side role management with self-protection guardrails.
//!
//! Demotions and removals are checked against the cached user list before
//! any network call: an admin can never demote or remove themselves, and
//! the last remaining admin can never be demoted or removed. The backend
//! enforces the same rules, but refusing locally keeps a misclick from
//! ever leaving the machine.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use rasenmaeher_core::{Callsign, UserRecord};

use crate::api::{self, ApiClient, ApiError};
use crate::batch::BatchOutcome;
use crate::poll::{self, PollerHandle};

/// Cadence of the background user-list refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Errors that can occur in role management.
#[derive(Debug, Error)]
pub enum RoleError {
    /// The caller tried to demote their own account.
    #[error("Refusing to demote your own account")]
    SelfDemotion,

    /// The caller tried to remove their own account.
    #[error("Refusing to remove your own account")]
    SelfRemoval,

    /// The operation would leave the deployment without any admin.
    #[error("Refusing to act on the last remaining admin")]
    LastAdmin,

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Refuse demoting `target` when it would hit a guardrail.
///
/// Pure check against the given user list; performs no I/O.
///
/// # Errors
///
/// Returns [`RoleError::SelfDemotion`] when `target` is the caller, or
/// [`RoleError::LastAdmin`] when `target` is the only admin.
pub fn guard_demote(
    users: &[UserRecord],
    current: &Callsign,
    target: &Callsign,
) -> Result<(), RoleError> {
    if target == current {
        return Err(RoleError::SelfDemotion);
    }
    guard_last_admin(users, target)
}

/// Refuse removing `target` when it would hit a guardrail.
///
/// Pure check against the given user list; performs no I/O.
///
/// # Errors
///
/// Returns [`RoleError::SelfRemoval`] when `target` is the caller, or
/// [`RoleError::LastAdmin`] when `target` is the only admin.
pub fn guard_remove(
    users: &[UserRecord],
    current: &Callsign,
    target: &Callsign,
) -> Result<(), RoleError> {
    if target == current {
        return Err(RoleError::SelfRemoval);
    }
    guard_last_admin(users, target)
}

fn guard_last_admin(users: &[UserRecord], target: &Callsign) -> Result<(), RoleError> {
    let target_is_admin = users
        .iter()
        .any(|user| &user.callsign == target && user.is_admin());
    if !target_is_admin {
        return Ok(());
    }

    let admin_count = users.iter().filter(|user| user.is_admin()).count();
    if admin_count <= 1 {
        return Err(RoleError::LastAdmin);
    }
    Ok(())
}

/// Cached user list plus guarded promote/demote/remove operations.
///
/// Cheap to clone; all clones share the cache.
#[derive(Clone)]
pub struct RoleManager {
    inner: Arc<RoleManagerInner>,
}

struct RoleManagerInner {
    client: ApiClient,
    /// The calling admin, protected by the self-operation guardrails.
    current: Callsign,
    cache: tokio::sync::RwLock<Vec<UserRecord>>,
}

impl std::fmt::Debug for RoleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleManager")
            .field("current", &self.inner.current)
            .finish_non_exhaustive()
    }
}

impl RoleManager {
    /// Create a manager acting as `current`, with an empty cache.
    ///
    /// Call [`RoleManager::refresh`] once before reading or mutating.
    #[must_use]
    pub fn new(client: ApiClient, current: Callsign) -> Self {
        Self {
            inner: Arc::new(RoleManagerInner {
                client,
                current,
                cache: tokio::sync::RwLock::new(Vec::new()),
            }),
        }
    }

    /// Replace the cached user list with a fresh backend snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend list request fails; the cache keeps
    /// its previous contents in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), RoleError> {
        let users = api::people::list_users(&self.inner.client).await?;
        *self.inner.cache.write().await = users;
        Ok(())
    }

    /// Snapshot of the cached user list.
    pub async fn list(&self) -> Vec<UserRecord> {
        self.inner.cache.read().await.clone()
    }

    /// Grant the admin role to `target` and refresh the cache.
    ///
    /// Promotion has no guardrail; adding admins is always safe.
    ///
    /// # Errors
    ///
    /// Returns an API error from the backend.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn promote(&self, target: &Callsign) -> Result<(), RoleError> {
        api::people::promote(&self.inner.client, target).await?;
        info!("user promoted to admin");
        self.refresh().await
    }

    /// Revoke the admin role from `target` and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns a guardrail error before any network call when `target` is
    /// the caller or the last admin, or an API error from the backend.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn demote(&self, target: &Callsign) -> Result<(), RoleError> {
        guard_demote(&self.list().await, &self.inner.current, target)?;

        api::people::demote(&self.inner.client, target).await?;
        info!("user demoted from admin");
        self.refresh().await
    }

    /// Remove `target` from the deployment and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns a guardrail error before any network call when `target` is
    /// the caller or the last admin, or an API error from the backend.
    #[instrument(skip(self), fields(target = %target))]
    pub async fn remove(&self, target: &Callsign) -> Result<(), RoleError> {
        guard_remove(&self.list().await, &self.inner.current, target)?;

        api::people::delete_user(&self.inner.client, target).await?;
        info!("user removed");
        self.refresh().await
    }

    /// Promote many users, one at a time, continuing past failures.
    #[instrument(skip(self, targets))]
    pub async fn bulk_promote<I>(&self, targets: I) -> BatchOutcome
    where
        I: IntoIterator<Item = Callsign>,
    {
        self.bulk(targets, |manager, target| async move {
            api::people::promote(&manager.inner.client, &target)
                .await
                .map_err(RoleError::from)
        })
        .await
    }

    /// Demote many users, one at a time, continuing past failures.
    ///
    /// Guardrails apply per item against the cache as it was when the bulk
    /// operation started.
    #[instrument(skip(self, targets))]
    pub async fn bulk_demote<I>(&self, targets: I) -> BatchOutcome
    where
        I: IntoIterator<Item = Callsign>,
    {
        let users = self.list().await;
        self.bulk(targets, move |manager, target| {
            let users = users.clone();
            async move {
                guard_demote(&users, &manager.inner.current, &target)?;
                api::people::demote(&manager.inner.client, &target)
                    .await
                    .map_err(RoleError::from)
            }
        })
        .await
    }

    /// Remove many users, one at a time, continuing past failures.
    ///
    /// Guardrails apply per item against the cache as it was when the bulk
    /// operation started.
    #[instrument(skip(self, targets))]
    pub async fn bulk_remove<I>(&self, targets: I) -> BatchOutcome
    where
        I: IntoIterator<Item = Callsign>,
    {
        let users = self.list().await;
        self.bulk(targets, move |manager, target| {
            let users = users.clone();
            async move {
                guard_remove(&users, &manager.inner.current, &target)?;
                api::people::delete_user(&manager.inner.client, &target)
                    .await
                    .map_err(RoleError::from)
            }
        })
        .await
    }

    async fn bulk<I, F, Fut>(&self, targets: I, op: F) -> BatchOutcome
    where
        I: IntoIterator<Item = Callsign>,
        F: Fn(Self, Callsign) -> Fut,
        Fut: Future<Output = Result<(), RoleError>>,
    {
        let targets: Vec<Callsign> = targets.into_iter().collect();
        let mut outcome = BatchOutcome::new(targets.len());

        for target in targets {
            match op(self.clone(), target.clone()).await {
                Ok(()) => outcome.record_success(),
                Err(e) => {
                    warn!(%target, error = %e, "bulk role operation item failed");
                    outcome.record_failure(target.as_str(), e.to_string());
                }
            }
        }

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "user list refresh after bulk operation failed");
        }
        outcome
    }

    /// Spawn a background poller that refreshes the cached user list.
    ///
    /// The poller lives until the returned handle is dropped. Refresh
    /// failures are logged and retried on the next tick.
    #[must_use]
    pub fn spawn_refresh(&self) -> PollerHandle {
        let manager = self.clone();
        poll::spawn(REFRESH_INTERVAL, move || {
            let manager = manager.clone();
            async move {
                if let Err(e) = manager.refresh().await {
                    warn!(error = %e, "background user list refresh failed");
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rasenmaeher_core::ADMIN_ROLE;

    use super::*;

    fn user(callsign: &str, admin: bool) -> UserRecord {
        UserRecord {
            callsign: Callsign::parse(callsign).unwrap(),
            roles: if admin {
                std::iter::once(ADMIN_ROLE.to_owned()).collect()
            } else {
                std::collections::BTreeSet::new()
            },
        }
    }

    fn callsign(s: &str) -> Callsign {
        Callsign::parse(s).unwrap()
    }

    #[test]
    fn test_guard_refuses_self_operations() {
        let users = vec![user("boss1", true), user("boss2", true)];

        assert!(matches!(
            guard_demote(&users, &callsign("boss1"), &callsign("boss1")),
            Err(RoleError::SelfDemotion)
        ));
        assert!(matches!(
            guard_remove(&users, &callsign("boss1"), &callsign("boss1")),
            Err(RoleError::SelfRemoval)
        ));
    }

    #[test]
    fn test_guard_refuses_last_admin() {
        let users = vec![user("boss1", true), user("eagle1", false)];

        assert!(matches!(
            guard_demote(&users, &callsign("eagle1"), &callsign("boss1")),
            Err(RoleError::LastAdmin)
        ));
        assert!(matches!(
            guard_remove(&users, &callsign("eagle1"), &callsign("boss1")),
            Err(RoleError::LastAdmin)
        ));
    }

    #[test]
    fn test_guard_allows_demoting_one_of_two_admins() {
        let users = vec![user("boss1", true), user("boss2", true)];
        assert!(guard_demote(&users, &callsign("boss1"), &callsign("boss2")).is_ok());
    }

    #[test]
    fn test_guard_allows_removing_plain_user() {
        let users = vec![user("boss1", true), user("eagle1", false)];
        assert!(guard_remove(&users, &callsign("boss1"), &callsign("eagle1")).is_ok());
    }

    #[test]
    fn test_guard_allows_unknown_target() {
        // A target missing from the cache is not an admin; the backend
        // will answer 404 on the actual call.
        let users = vec![user("boss1", true)];
        assert!(guard_remove(&users, &callsign("boss1"), &callsign("ghost1")).is_ok());
    }
}
