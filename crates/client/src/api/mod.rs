//! Typed REST client for the Rasenmaeher backend.
//!
//! Every backend endpoint the workflows consume gets one thin, typed wrapper
//! here, grouped by backend area:
//!
//! - [`auth`] - `check-auth` capability probes
//! - [`tokens`] - code/credential exchange and admin bootstrap
//! - [`enrollment`] - invite codes, enrollment records, accept/lock
//! - [`people`] - user listing, promote/demote, removal
//!
//! Response bodies are deserialized into explicit DTO structs at this
//! boundary; nothing downstream touches raw JSON.

pub mod auth;
pub mod enrollment;
pub mod people;
pub mod tokens;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

use crate::config::Config;

/// Errors that can occur when talking to the Rasenmaeher backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (network, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend accepted the request shape but refused it.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Credentials were missing or not accepted.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The backend returned a status this client does not expect.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, best effort.
        body: String,
    },

    /// A response field failed boundary validation.
    #[error("Invalid response field {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was refused.
        reason: String,
    },
}

impl ApiError {
    /// Returns true if the backend refused the request with a 400-class
    /// answer (as opposed to this client failing to reach or parse it).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Unauthorized(_))
    }
}

/// Rasenmaeher REST API client.
///
/// Cheap to clone; all clones share one connection pool and one cached
/// bearer credential. The credential cache is written through
/// [`ApiClient::set_token`] and [`ApiClient::clear_token`] only.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// In-memory credential cache (persisted externally via `LocalStore`).
    token: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client from configuration.
    ///
    /// If the configuration carries a bootstrap token it becomes the initial
    /// cached credential.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                token: RwLock::new(config.token.clone()),
            }),
        }
    }

    /// Create a client pointing at an explicit base URL with no credential.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
                token: RwLock::new(None),
            }),
        }
    }

    /// Get the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Set the bearer credential used for subsequent requests.
    pub async fn set_token(&self, token: SecretString) {
        *self.inner.token.write().await = Some(token);
    }

    /// Get the current credential (if set).
    pub async fn token(&self) -> Option<SecretString> {
        self.inner.token.read().await.clone()
    }

    /// Check whether a credential is cached.
    pub async fn has_token(&self) -> bool {
        self.inner.token.read().await.is_some()
    }

    /// Clear the cached credential.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Build a request for `path` (relative to the base URL), attaching the
    /// cached bearer credential when one is set.
    pub(crate) async fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.endpoint(path);
        let builder = self.inner.client.request(method, url);

        match self.inner.token.read().await.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Build a request with an explicit bearer credential, bypassing the
    /// cache. Used by the two-step admin exchange, where the second call
    /// must be authorized by the first call's result before anything is
    /// committed to the cache.
    pub(crate) fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: &SecretString,
    ) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, self.endpoint(path))
            .bearer_auth(token.expose_secret())
    }

    /// Build a request with no credential attached.
    pub(crate) fn request_anonymous(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.inner.client.request(method, self.endpoint(path))
    }

    fn endpoint(&self, path: &str) -> Url {
        // Paths are compile-time constants under /api/v1; a join can only
        // fail against a cannot-be-a-base URL.
        match self.inner.base_url.join(path) {
            Ok(url) => url,
            Err(e) => {
                debug_assert!(false, "endpoint join failed for {path}: {e}");
                tracing::error!(path, error = %e, "endpoint join failed, targeting base URL");
                self.inner.base_url.clone()
            }
        }
    }
}

/// Map a non-success response into the [`ApiError`] taxonomy.
///
/// 401 becomes [`ApiError::Unauthorized`], other 400-class statuses become
/// [`ApiError::Rejected`] with the backend's reason, and anything else is
/// [`ApiError::UnexpectedStatus`].
pub(crate) async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let reason = extract_detail(&body);

    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized(reason)
    } else if status.is_client_error() {
        ApiError::Rejected(reason)
    } else {
        ApiError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
    }
}

/// Pull a human-readable `detail` field out of an error body, falling back
/// to the raw body.
fn extract_detail(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Detail {
        detail: Option<String>,
    }

    serde_json::from_str::<Detail>(body)
        .ok()
        .and_then(|d| d.detail)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "no detail provided".to_owned()
            } else {
                body.to_owned()
            }
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected("callsign taken".to_owned());
        assert_eq!(err.to_string(), "Rejected: callsign taken");

        let err = ApiError::UnexpectedStatus {
            status: 502,
            body: "bad gateway".to_owned(),
        };
        assert_eq!(err.to_string(), "Unexpected status 502: bad gateway");
    }

    #[test]
    fn test_is_rejection() {
        assert!(ApiError::Rejected(String::new()).is_rejection());
        assert!(ApiError::Unauthorized(String::new()).is_rejection());
        assert!(
            !ApiError::UnexpectedStatus {
                status: 500,
                body: String::new()
            }
            .is_rejection()
        );
    }

    #[test]
    fn test_extract_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "callsign taken"}"#),
            "callsign taken"
        );
        assert_eq!(extract_detail("plain text"), "plain text");
        assert_eq!(extract_detail(""), "no detail provided");
    }

    #[test]
    fn test_endpoint_joins_relative_to_base() {
        let client =
            ApiClient::with_base_url(Url::parse("https://rasenmaeher.example.com").unwrap());
        assert_eq!(
            client.endpoint("/api/v1/check-auth/mtls_or_jwt").as_str(),
            "https://rasenmaeher.example.com/api/v1/check-auth/mtls_or_jwt"
        );
    }

    #[test]
    #[should_panic(expected = "endpoint join failed")]
    fn test_endpoint_asserts_on_unjoinable_base() {
        // A cannot-be-a-base URL is the one way `Url::join` can fail here.
        let client = ApiClient::with_base_url(Url::parse("mailto:ops@example.com").unwrap());
        let _ = client.endpoint("/api/v1/check-auth/mtls_or_jwt");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client =
            ApiClient::with_base_url(Url::parse("https://rasenmaeher.example.com").unwrap());
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_token_cache() {
        let client =
            ApiClient::with_base_url(Url::parse("https://rasenmaeher.example.com").unwrap());
        assert!(!client.has_token().await);

        client.set_token(SecretString::from("jwt".to_owned())).await;
        assert!(client.has_token().await);
        assert_eq!(client.token().await.unwrap().expose_secret(), "jwt");

        client.clear_token().await;
        assert!(!client.has_token().await);
    }
}
