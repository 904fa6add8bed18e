//! Session/identity resolution.
//!
//! On startup the client asks the backend, in order: how am I
//! authenticated, am I an accepted user, am I an admin. The answers are
//! frozen into an [`IdentitySnapshot`] shared read-only with the rest of
//! the application; only [`resolve`] ever constructs one, and nothing
//! mutates it afterwards. The snapshot is recomputed only on explicit
//! credential change.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use rasenmaeher_core::{AuthMechanism, Callsign, Role};

use crate::api::{self, ApiClient, ApiError};

/// Read-only view of who the caller is, as confirmed by the backend.
///
/// A capability the backend denied (401/403) is recorded as absent, not as
/// an error. `error` is set only when a probe answered with a status the
/// resolver does not understand; the role stays [`Role::None`] in that
/// case.
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    auth_mechanism: AuthMechanism,
    role: Role,
    callsign: Option<Callsign>,
    is_valid_user: bool,
    otp_verified: bool,
    error: Option<String>,
}

impl IdentitySnapshot {
    /// How the caller authenticated.
    #[must_use]
    pub const fn auth_mechanism(&self) -> AuthMechanism {
        self.auth_mechanism
    }

    /// The caller's confirmed role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The caller's callsign, once the backend has confirmed acceptance.
    #[must_use]
    pub const fn callsign(&self) -> Option<&Callsign> {
        self.callsign.as_ref()
    }

    /// True once the backend confirms the callsign/credential pair is
    /// accepted (not merely issued).
    #[must_use]
    pub const fn is_valid_user(&self) -> bool {
        self.is_valid_user
    }

    /// Whether the caller has completed OTP verification.
    #[must_use]
    pub const fn otp_verified(&self) -> bool {
        self.otp_verified
    }

    /// Resolver-level error, if any probe returned an unexpected status.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Resolve the caller's identity with three ordered backend probes.
///
/// Never fails: probe errors are folded into the snapshot as a resolver
/// error with `role = none`. No retries are attempted.
#[instrument(skip(client))]
pub async fn resolve(client: &ApiClient) -> Arc<IdentitySnapshot> {
    Arc::new(resolve_inner(client, false).await)
}

/// Like [`resolve`], for callers that have already completed OTP
/// verification out of band.
#[instrument(skip(client))]
pub async fn resolve_with_otp(client: &ApiClient, otp_verified: bool) -> Arc<IdentitySnapshot> {
    Arc::new(resolve_inner(client, otp_verified).await)
}

async fn resolve_inner(client: &ApiClient, otp_verified: bool) -> IdentitySnapshot {
    let mut snapshot = IdentitySnapshot {
        otp_verified,
        ..IdentitySnapshot::default()
    };

    // Probe 1: authentication mechanism.
    match api::auth::check_auth_mechanism(client).await {
        Ok(Some(mechanism)) => snapshot.auth_mechanism = mechanism,
        Ok(None) => {
            debug!("caller is not authenticated");
            return snapshot;
        }
        Err(e) => return resolver_error(snapshot, "auth mechanism probe", &e),
    }

    // Probe 2: accepted user + callsign.
    match api::auth::check_valid_user(client).await {
        Ok(Some(callsign)) => {
            snapshot.is_valid_user = true;
            snapshot.callsign = Some(callsign);
        }
        Ok(None) => {
            debug!("caller authenticated but not an accepted user");
            return snapshot;
        }
        Err(e) => return resolver_error(snapshot, "valid user probe", &e),
    }

    // Probe 3: admin role. A denial is a plain user, not an error.
    match api::auth::check_admin(client).await {
        Ok(true) => snapshot.role = Role::Admin,
        Ok(false) => snapshot.role = Role::User,
        Err(e) => return resolver_error(snapshot, "admin probe", &e),
    }

    snapshot
}

fn resolver_error(
    mut snapshot: IdentitySnapshot,
    probe: &str,
    error: &ApiError,
) -> IdentitySnapshot {
    warn!(%error, probe, "identity probe returned an unexpected result");
    snapshot.role = Role::None;
    snapshot.error = Some(format!("{probe} failed: {error}"));
    snapshot
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_anonymous() {
        let snapshot = IdentitySnapshot::default();
        assert_eq!(snapshot.auth_mechanism(), AuthMechanism::None);
        assert_eq!(snapshot.role(), Role::None);
        assert!(snapshot.callsign().is_none());
        assert!(!snapshot.is_valid_user());
        assert!(snapshot.error().is_none());
    }

    #[test]
    fn test_resolver_error_clears_role() {
        let snapshot = IdentitySnapshot {
            role: Role::Admin,
            ..IdentitySnapshot::default()
        };
        let snapshot = resolver_error(
            snapshot,
            "admin probe",
            &ApiError::UnexpectedStatus {
                status: 500,
                body: "boom".to_owned(),
            },
        );
        assert_eq!(snapshot.role(), Role::None);
        assert!(snapshot.error().unwrap().contains("admin probe"));
    }
}
