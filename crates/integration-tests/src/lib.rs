//! Integration tests for the Rasenmaeher client.
//!
//! Every test runs against a `wiremock` stand-in for the backend; no real
//! deployment is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rasenmaeher-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `classifier` - login-code classification and precedence
//! - `enrollment_flow` - end-to-end invite enrollment
//! - `admin_bootstrap` - first-admin two-step credential exchange
//! - `invites` - invite lifecycle, toggles, bulk partial failure
//! - `role_guardrails` - self-protection checks make zero network calls
//! - `identity` - identity resolver status triage

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test support code; panicking on setup failure is the desired behavior.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use url::Url;
use wiremock::MockServer;

use rasenmaeher_client::{ApiClient, LocalStore};

/// A mock backend deployment plus a client and store wired against it.
pub struct TestDeployment {
    /// The mock backend. Mount expectations here.
    pub server: MockServer,
    /// Client pointed at the mock backend, with no credential.
    pub client: ApiClient,
    /// Local store namespaced to the mock backend's URL.
    pub store: LocalStore,
    _state_dir: tempfile::TempDir,
}

impl TestDeployment {
    /// Start a fresh mock deployment.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = Url::parse(&server.uri()).unwrap();

        let client = ApiClient::with_base_url(base_url.clone());
        let state_dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(state_dir.path(), &base_url).unwrap();

        Self {
            server,
            client,
            store,
            _state_dir: state_dir,
        }
    }
}
