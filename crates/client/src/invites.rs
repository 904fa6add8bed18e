//! Admin-side invite-code lifecycle.
//!
//! The manager keeps a cached snapshot of the deployment's invite codes and
//! derives every toggle from that snapshot, never from caller intent: if the
//! cache says a code is active, toggling it deactivates it, regardless of
//! what the caller believed. A per-code in-flight guard refuses a second
//! mutation of the same code while one is running.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use rasenmaeher_core::{InviteCode, InviteCodeToken};

use crate::api::{self, ApiClient, ApiError};
use crate::batch::BatchOutcome;
use crate::poll::{self, PollerHandle};

/// Cadence of the background list refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Errors that can occur in invite-code management.
#[derive(Debug, Error)]
pub enum InviteError {
    /// The code is not in the cached list; refresh and retry.
    #[error("Unknown invite code: {0}")]
    UnknownCode(InviteCodeToken),

    /// Another mutation of the same code is still running.
    #[error("Invite code {0} has another operation in flight")]
    Busy(InviteCodeToken),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Cached, mutation-guarded view of the deployment's invite codes.
///
/// Cheap to clone; all clones share the cache and the in-flight guard.
#[derive(Clone)]
pub struct InviteManager {
    inner: Arc<InviteManagerInner>,
}

struct InviteManagerInner {
    client: ApiClient,
    cache: tokio::sync::RwLock<Vec<InviteCode>>,
    in_flight: std::sync::Mutex<HashSet<InviteCodeToken>>,
}

impl std::fmt::Debug for InviteManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InviteManager").finish_non_exhaustive()
    }
}

/// Releases the per-code in-flight reservation when the operation ends,
/// however it ends.
struct InFlightGuard<'a> {
    inner: &'a InviteManagerInner,
    code: InviteCodeToken,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock_in_flight().remove(&self.code);
    }
}

impl InviteManagerInner {
    #[allow(clippy::unwrap_used)] // lock poisoning is unrecoverable here
    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<InviteCodeToken>> {
        self.in_flight.lock().unwrap()
    }

    fn reserve(&self, code: &InviteCodeToken) -> Result<InFlightGuard<'_>, InviteError> {
        let mut in_flight = self.lock_in_flight();
        if !in_flight.insert(code.clone()) {
            return Err(InviteError::Busy(code.clone()));
        }
        Ok(InFlightGuard {
            inner: self,
            code: code.clone(),
        })
    }
}

impl InviteManager {
    /// Create a manager with an empty cache.
    ///
    /// Call [`InviteManager::refresh`] once before reading the list.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(InviteManagerInner {
                client,
                cache: tokio::sync::RwLock::new(Vec::new()),
                in_flight: std::sync::Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Replace the cached list with a fresh backend snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend list request fails; the cache keeps
    /// its previous contents in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), InviteError> {
        let codes = api::enrollment::list_invite_codes(&self.inner.client).await?;
        *self.inner.cache.write().await = codes;
        Ok(())
    }

    /// Snapshot of the cached invite-code list.
    pub async fn list(&self) -> Vec<InviteCode> {
        self.inner.cache.read().await.clone()
    }

    /// Look up a single cached invite code.
    pub async fn get(&self, code: &InviteCodeToken) -> Option<InviteCode> {
        self.inner
            .cache
            .read()
            .await
            .iter()
            .find(|invite| invite.code == *code)
            .cloned()
    }

    /// Create a new invite code and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if creation or the follow-up refresh fails.
    #[instrument(skip(self))]
    pub async fn create(&self) -> Result<InviteCodeToken, InviteError> {
        let code = api::enrollment::create_invite_code(&self.inner.client).await?;
        info!(code = %code, "created invite code");
        self.refresh().await?;
        Ok(code)
    }

    /// Flip a code between active and inactive, returning its new state.
    ///
    /// The direction comes from the cached `active` flag, so repeating a
    /// toggle that already happened flips it back rather than re-sending
    /// the same transition.
    ///
    /// # Errors
    ///
    /// Returns [`InviteError::UnknownCode`] if the code is not cached,
    /// [`InviteError::Busy`] while another mutation holds the code, or an
    /// API error from the backend.
    #[instrument(skip(self))]
    pub async fn toggle(&self, code: &InviteCodeToken) -> Result<bool, InviteError> {
        let _guard = self.inner.reserve(code)?;

        let currently_active = self
            .get(code)
            .await
            .ok_or_else(|| InviteError::UnknownCode(code.clone()))?
            .active;

        if currently_active {
            api::enrollment::deactivate_invite_code(&self.inner.client, code).await?;
        } else {
            api::enrollment::activate_invite_code(&self.inner.client, code).await?;
        }

        self.refresh().await?;
        Ok(!currently_active)
    }

    /// Permanently delete an invite code and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns [`InviteError::Busy`] while another mutation holds the code,
    /// or an API error from the backend.
    #[instrument(skip(self))]
    pub async fn delete(&self, code: &InviteCodeToken) -> Result<(), InviteError> {
        let _guard = self.inner.reserve(code)?;
        api::enrollment::delete_invite_code(&self.inner.client, code).await?;
        info!(code = %code, "deleted invite code");
        self.refresh().await?;
        Ok(())
    }

    /// Delete many codes, one at a time, continuing past failures.
    #[instrument(skip(self, codes))]
    pub async fn bulk_delete<I>(&self, codes: I) -> BatchOutcome
    where
        I: IntoIterator<Item = InviteCodeToken>,
    {
        self.bulk(codes, |client, code| async move {
            api::enrollment::delete_invite_code(&client, &code).await
        })
        .await
    }

    /// Activate many codes, one at a time, continuing past failures.
    #[instrument(skip(self, codes))]
    pub async fn bulk_enable<I>(&self, codes: I) -> BatchOutcome
    where
        I: IntoIterator<Item = InviteCodeToken>,
    {
        self.bulk(codes, |client, code| async move {
            api::enrollment::activate_invite_code(&client, &code).await
        })
        .await
    }

    /// Deactivate many codes, one at a time, continuing past failures.
    #[instrument(skip(self, codes))]
    pub async fn bulk_disable<I>(&self, codes: I) -> BatchOutcome
    where
        I: IntoIterator<Item = InviteCodeToken>,
    {
        self.bulk(codes, |client, code| async move {
            api::enrollment::deactivate_invite_code(&client, &code).await
        })
        .await
    }

    /// Run `op` over every code sequentially, recording per-item results,
    /// then refresh the cache once.
    async fn bulk<I, F, Fut>(&self, codes: I, op: F) -> BatchOutcome
    where
        I: IntoIterator<Item = InviteCodeToken>,
        F: Fn(ApiClient, InviteCodeToken) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        let codes: Vec<InviteCodeToken> = codes.into_iter().collect();
        let mut outcome = BatchOutcome::new(codes.len());

        for code in codes {
            let guard = match self.inner.reserve(&code) {
                Ok(guard) => guard,
                Err(e) => {
                    outcome.record_failure(code.as_str(), e.to_string());
                    continue;
                }
            };

            match op(self.inner.client.clone(), code.clone()).await {
                Ok(()) => outcome.record_success(),
                Err(e) => {
                    warn!(code = %code, error = %e, "bulk invite operation item failed");
                    outcome.record_failure(code.as_str(), e.to_string());
                }
            }
            drop(guard);
        }

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "invite list refresh after bulk operation failed");
        }
        outcome
    }

    /// Spawn a background poller that refreshes the cached list.
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
                    warn!(error = %e, "background invite refresh failed");
                }
            }
        })
    }
}
