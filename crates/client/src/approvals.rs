//! Admin-side approval queue for pending enrollees.
//!
//! Mirrors the invite manager's shape: a cached backend snapshot, a
//! per-callsign in-flight guard so the same enrollee cannot be approved and
//! rejected concurrently, and a fixed-cadence background refresh. The
//! approval code itself arrives out of band, either scanned from the
//! enrollee's QR payload or typed in by hand; [`ScanPayload::parse`]
//! accepts both shapes.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use rasenmaeher_core::{ApprovalCode, Callsign, EnrollmentRecord};

use crate::api::{self, ApiClient, ApiError};
use crate::poll::{self, PollerHandle};

/// Cadence of the background queue refresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Reason recorded on the backend when an admin rejects an enrollee.
pub const LOCK_REASON: &str = "Rejected by admin";

/// Errors that can occur in approval-queue management.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// The scanned or typed payload is neither a QR URL nor a bare code.
    #[error("Unrecognized approval payload: {0}")]
    InvalidPayload(String),

    /// Another decision for the same enrollee is still running.
    #[error("Enrollee {0} already has a decision in flight")]
    Busy(Callsign),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Parsed approval input: a QR payload URL or a hand-typed approval code.
///
/// The QR payload is a URL carrying `callsign` and `approvalcode` query
/// parameters. Anything that does not parse as such a URL is treated as a
/// bare approval code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPayload {
    /// The enrollee's callsign, when the payload carried one.
    pub callsign: Option<Callsign>,
    /// The approval code.
    pub approval_code: ApprovalCode,
}

impl ScanPayload {
    /// Parse a scanned or typed approval payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidPayload`] if the input is neither a
    /// QR URL with a valid `approvalcode` parameter nor a bare approval
    /// code.
    pub fn parse(input: &str) -> Result<Self, ApprovalError> {
        let input = input.trim();

        if let Ok(url) = Url::parse(input)
            && let Some(payload) = Self::from_qr_url(&url)
        {
            return Ok(payload);
        }

        // Not a QR URL; treat the whole input as a bare approval code.
        let approval_code = ApprovalCode::parse(input)
            .map_err(|e| ApprovalError::InvalidPayload(e.to_string()))?;
        Ok(Self {
            callsign: None,
            approval_code,
        })
    }

    fn from_qr_url(url: &Url) -> Option<Self> {
        let mut callsign = None;
        let mut approval_code = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "callsign" => callsign = Callsign::parse(&value).ok(),
                "approvalcode" => approval_code = ApprovalCode::parse(&value).ok(),
                _ => {}
            }
        }

        approval_code.map(|approval_code| Self {
            callsign,
            approval_code,
        })
    }
}

/// Cached, decision-guarded queue of enrollment records.
///
/// Cheap to clone; all clones share the cache and the in-flight guard.
#[derive(Clone)]
pub struct ApprovalQueue {
    inner: Arc<ApprovalQueueInner>,
}

struct ApprovalQueueInner {
    client: ApiClient,
    cache: tokio::sync::RwLock<Vec<EnrollmentRecord>>,
    in_flight: std::sync::Mutex<HashSet<Callsign>>,
}

impl std::fmt::Debug for ApprovalQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalQueue").finish_non_exhaustive()
    }
}

struct DecisionGuard<'a> {
    inner: &'a ApprovalQueueInner,
    callsign: Callsign,
}

impl Drop for DecisionGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock_in_flight().remove(&self.callsign);
    }
}

impl ApprovalQueueInner {
    #[allow(clippy::unwrap_used)] // lock poisoning is unrecoverable here
    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<Callsign>> {
        self.in_flight.lock().unwrap()
    }

    fn reserve(&self, callsign: &Callsign) -> Result<DecisionGuard<'_>, ApprovalError> {
        let mut in_flight = self.lock_in_flight();
        if !in_flight.insert(callsign.clone()) {
            return Err(ApprovalError::Busy(callsign.clone()));
        }
        Ok(DecisionGuard {
            inner: self,
            callsign: callsign.clone(),
        })
    }
}

impl ApprovalQueue {
    /// Create a queue with an empty cache.
    ///
    /// Call [`ApprovalQueue::refresh`] once before reading it.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(ApprovalQueueInner {
                client,
                cache: tokio::sync::RwLock::new(Vec::new()),
                in_flight: std::sync::Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Replace the cached records with a fresh backend snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend list request fails; the cache keeps
    /// its previous contents in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApprovalError> {
        let records = api::enrollment::list_enrollments(&self.inner.client).await?;
        *self.inner.cache.write().await = records;
        Ok(())
    }

    /// Snapshot of all cached enrollment records.
    pub async fn all(&self) -> Vec<EnrollmentRecord> {
        self.inner.cache.read().await.clone()
    }

    /// Snapshot of the records still awaiting a decision.
    pub async fn pending(&self) -> Vec<EnrollmentRecord> {
        self.inner
            .cache
            .read()
            .await
            .iter()
            .filter(|record| record.is_pending())
            .cloned()
            .collect()
    }

    /// Approve an enrollee, authenticated by their approval code.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Busy`] while another decision for the same
    /// enrollee is in flight, or an API error when the backend refuses; the
    /// record stays pending in that case.
    #[instrument(skip(self, payload), fields(callsign = %callsign))]
    pub async fn approve(
        &self,
        callsign: &Callsign,
        payload: &ScanPayload,
    ) -> Result<(), ApprovalError> {
        let _guard = self.inner.reserve(callsign)?;

        api::enrollment::accept(&self.inner.client, callsign, &payload.approval_code).await?;
        info!("enrollee approved");

        self.refresh().await?;
        Ok(())
    }

    /// Reject an enrollee, locking them out with [`LOCK_REASON`].
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Busy`] while another decision for the same
    /// enrollee is in flight, or an API error from the backend.
    #[instrument(skip(self), fields(callsign = %callsign))]
    pub async fn reject(&self, callsign: &Callsign) -> Result<(), ApprovalError> {
        let _guard = self.inner.reserve(callsign)?;

        api::enrollment::lock(&self.inner.client, callsign, LOCK_REASON).await?;
        info!("enrollee rejected");

        self.refresh().await?;
        Ok(())
    }

    /// Spawn a background poller that refreshes the cached queue.
    ///
    /// The poller lives until the returned handle is dropped. Refresh
    /// failures are logged and retried on the next tick.
    #[must_use]
    pub fn spawn_refresh(&self) -> PollerHandle {
        let queue = self.clone();
        poll::spawn(REFRESH_INTERVAL, move || {
            let queue = queue.clone();
            async move {
                if let Err(e) = queue.refresh().await {
                    warn!(error = %e, "background approval queue refresh failed");
                }
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rasenmaeher_core::EnrollmentState;

    use super::*;

    #[test]
    fn test_parse_qr_url_payload() {
        let payload = ScanPayload::parse(
            "https://mtls.deployment.example.com/enroll?callsign=eagle1&approvalcode=ZZZ999AA",
        )
        .unwrap();

        assert_eq!(payload.callsign.unwrap().as_str(), "eagle1");
        assert_eq!(payload.approval_code.as_str(), "ZZZ999AA");
    }

    #[test]
    fn test_parse_bare_approval_code() {
        let payload = ScanPayload::parse(" ZZZ999AA ").unwrap();
        assert!(payload.callsign.is_none());
        assert_eq!(payload.approval_code.as_str(), "ZZZ999AA");
    }

    #[test]
    fn test_parse_url_without_code_falls_back_and_fails() {
        // A URL missing the approvalcode parameter is not a valid bare
        // code either.
        assert!(matches!(
            ScanPayload::parse("https://example.com/enroll?callsign=eagle1"),
            Err(ApprovalError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_parse_garbage_is_refused() {
        assert!(matches!(
            ScanPayload::parse("not a code"),
            Err(ApprovalError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_filters_terminal_records() {
        let queue = ApprovalQueue::new(ApiClient::with_base_url(
            Url::parse("https://rasenmaeher.example.com").unwrap(),
        ));

        *queue.inner.cache.write().await = vec![
            EnrollmentRecord {
                callsign: Callsign::parse("eagle1").unwrap(),
                state: EnrollmentState::Pending,
            },
            EnrollmentRecord {
                callsign: Callsign::parse("eagle2").unwrap(),
                state: EnrollmentState::Approved,
            },
            EnrollmentRecord {
                callsign: Callsign::parse("eagle3").unwrap(),
                state: EnrollmentState::Rejected,
            },
        ];

        let pending = queue.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].callsign.as_str(), "eagle1");
    }

    #[test]
    fn test_decision_guard_is_exclusive() {
        let queue = ApprovalQueue::new(ApiClient::with_base_url(
            Url::parse("https://rasenmaeher.example.com").unwrap(),
        ));
        let callsign = Callsign::parse("eagle1").unwrap();

        let guard = queue.inner.reserve(&callsign).unwrap();
        assert!(matches!(
            queue.inner.reserve(&callsign),
            Err(ApprovalError::Busy(_))
        ));
        drop(guard);
        assert!(queue.inner.reserve(&callsign).is_ok());
    }
}
