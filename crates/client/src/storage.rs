//! Persisted client-side state.
//!
//! One JSON file per deployment, named by a hash of the backend base URL so
//! state from different deployments never mixes. The file holds the bearer
//! credential, the claimed callsign, the enrollee's approval code, and the
//! set of onboarding flags already shown to the user.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

use rasenmaeher_core::{ApprovalCode, Callsign};

/// Length of the hex-encoded deployment hash used in file names.
const DEPLOYMENT_HASH_LEN: usize = 12;

/// Errors that can occur when reading or writing persisted state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file exists but does not parse.
    #[error("State file corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// On-disk shape of the per-deployment state.
///
/// Field names are a persistence contract; `approveCode` keeps its legacy
/// spelling.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DeploymentState {
    token: Option<String>,
    callsign: Option<Callsign>,
    #[serde(rename = "approveCode")]
    approve_code: Option<ApprovalCode>,
    #[serde(default)]
    seen: BTreeSet<String>,
}

/// Persisted per-deployment key-value state.
///
/// Cheap to clone; all clones share the same in-memory state and file.
/// Every mutation is written through to disk immediately.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<LocalStoreInner>,
}

struct LocalStoreInner {
    path: PathBuf,
    state: Mutex<DeploymentState>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Open (or create) the state file for the deployment at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or an
    /// existing state file cannot be read or parsed.
    pub fn open(state_dir: &Path, base_url: &Url) -> Result<Self, StorageError> {
        std::fs::create_dir_all(state_dir)?;

        let path = state_dir.join(format!("rasenmaeher-{}.json", deployment_hash(base_url)));
        let state = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            DeploymentState::default()
        };

        Ok(Self {
            inner: Arc::new(LocalStoreInner {
                path,
                state: Mutex::new(state),
            }),
        })
    }

    /// Get the persisted bearer credential, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.lock().token.clone().map(SecretString::from)
    }

    /// Get the persisted callsign, if any.
    #[must_use]
    pub fn callsign(&self) -> Option<Callsign> {
        self.lock().callsign.clone()
    }

    /// Get the persisted approval code, if any.
    #[must_use]
    pub fn approve_code(&self) -> Option<ApprovalCode> {
        self.lock().approve_code.clone()
    }

    /// Persist the credential bundle obtained from an enrollment flow.
    ///
    /// The approval code is `None` on the admin bootstrap path, which has
    /// no in-person approval step.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn set_credentials(
        &self,
        token: &SecretString,
        callsign: &Callsign,
        approve_code: Option<&ApprovalCode>,
    ) -> Result<(), StorageError> {
        {
            let mut state = self.lock();
            state.token = Some(token.expose_secret().to_owned());
            state.callsign = Some(callsign.clone());
            state.approve_code = approve_code.cloned();
        }
        self.persist()
    }

    /// Drop all persisted credentials, keeping onboarding flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn clear_credentials(&self) -> Result<(), StorageError> {
        {
            let mut state = self.lock();
            state.token = None;
            state.callsign = None;
            state.approve_code = None;
        }
        self.persist()
    }

    /// Record that the onboarding step `flag` has been shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn mark_seen(&self, flag: &str) -> Result<(), StorageError> {
        let changed = self.lock().seen.insert(flag.to_owned());
        if changed { self.persist() } else { Ok(()) }
    }

    /// Check whether the onboarding step `flag` has been shown.
    #[must_use]
    pub fn is_seen(&self, flag: &str) -> bool {
        self.lock().seen.contains(flag)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = {
            let state = self.lock();
            serde_json::to_string_pretty(&*state)?
        };
        std::fs::write(&self.inner.path, json)?;
        Ok(())
    }

    #[allow(clippy::unwrap_used)] // lock poisoning is unrecoverable here
    fn lock(&self) -> std::sync::MutexGuard<'_, DeploymentState> {
        self.inner.state.lock().unwrap()
    }
}

/// Short stable hash identifying a deployment by its base URL.
fn deployment_hash(base_url: &Url) -> String {
    let digest = Sha256::digest(base_url.as_str().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(DEPLOYMENT_HASH_LEN);
    hash
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_url() -> Url {
        Url::parse("https://mtls.deployment.example.com").unwrap()
    }

    #[test]
    fn test_roundtrip_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), &test_url()).unwrap();

        let token = SecretString::from("jwt-value".to_owned());
        let callsign = Callsign::parse("eagle1").unwrap();
        let code = ApprovalCode::parse("ZZZ999AA").unwrap();

        store
            .set_credentials(&token, &callsign, Some(&code))
            .unwrap();

        // Reopen from disk and check the values survived.
        let reopened = LocalStore::open(dir.path(), &test_url()).unwrap();
        assert_eq!(reopened.token().unwrap().expose_secret(), "jwt-value");
        assert_eq!(reopened.callsign().unwrap(), callsign);
        assert_eq!(reopened.approve_code().unwrap(), code);
    }

    #[test]
    fn test_clear_credentials_keeps_seen_flags() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), &test_url()).unwrap();

        let token = SecretString::from("jwt".to_owned());
        let callsign = Callsign::parse("eagle1").unwrap();
        store.set_credentials(&token, &callsign, None).unwrap();
        store.mark_seen("walkthrough").unwrap();

        store.clear_credentials().unwrap();

        let reopened = LocalStore::open(dir.path(), &test_url()).unwrap();
        assert!(reopened.token().is_none());
        assert!(reopened.callsign().is_none());
        assert!(reopened.is_seen("walkthrough"));
    }

    #[test]
    fn test_deployments_do_not_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let store_a = LocalStore::open(dir.path(), &test_url()).unwrap();
        let store_b =
            LocalStore::open(dir.path(), &Url::parse("https://other.example.com").unwrap())
                .unwrap();

        let token = SecretString::from("jwt".to_owned());
        let callsign = Callsign::parse("eagle1").unwrap();
        store_a.set_credentials(&token, &callsign, None).unwrap();

        assert!(store_b.token().is_none());
    }

    #[test]
    fn test_seen_flags() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path(), &test_url()).unwrap();

        assert!(!store.is_seen("tour"));
        store.mark_seen("tour").unwrap();
        assert!(store.is_seen("tour"));

        // Marking twice is a no-op.
        store.mark_seen("tour").unwrap();
        assert!(store.is_seen("tour"));
    }

    #[test]
    fn test_corrupt_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = test_url();
        let path = dir
            .path()
            .join(format!("rasenmaeher-{}.json", deployment_hash(&url)));
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            LocalStore::open(dir.path(), &url),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_deployment_hash_is_stable() {
        assert_eq!(deployment_hash(&test_url()), deployment_hash(&test_url()));
        assert_eq!(deployment_hash(&test_url()).len(), DEPLOYMENT_HASH_LEN);
    }
}
