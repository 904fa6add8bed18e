//! `check-auth` capability probes.
//!
//! These endpoints answer "who am I" questions. A 401/403 answer is a
//! negative capability result, not an error; only statuses outside the
//! expected set propagate as [`ApiError`].

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use rasenmaeher_core::{AuthMechanism, Callsign};

use super::{ApiClient, ApiError, error_from_response};

const MTLS_OR_JWT_PATH: &str = "/api/v1/check-auth/mtls_or_jwt";
const VALID_USER_PATH: &str = "/api/v1/check-auth/validuser";
const VALID_ADMIN_PATH: &str = "/api/v1/check-auth/validuser/admin";

/// Response body of the auth-mechanism probe.
#[derive(Debug, Deserialize)]
struct MechanismResponse {
    /// "mtls" or "jwt".
    #[serde(rename = "type")]
    kind: String,
}

/// Response body of the valid-user probe.
#[derive(Debug, Deserialize)]
struct ValidUserResponse {
    callsign: String,
}

/// Ask the backend how the caller is authenticated.
///
/// Returns `None` when the backend answers 401/403 (not authenticated by
/// either mechanism).
///
/// # Errors
///
/// Returns an error on network failure, an unparseable body, or an
/// unexpected status.
#[instrument(skip(client))]
pub async fn check_auth_mechanism(client: &ApiClient) -> Result<Option<AuthMechanism>, ApiError> {
    let response = client.request(Method::GET, MTLS_OR_JWT_PATH).await.send().await?;

    match response.status() {
        StatusCode::OK => {
            let body: MechanismResponse = response.json().await?;
            match body.kind.as_str() {
                "mtls" => Ok(Some(AuthMechanism::Certificate)),
                "jwt" => Ok(Some(AuthMechanism::Token)),
                other => Err(ApiError::InvalidField {
                    field: "type",
                    reason: format!("unknown auth mechanism {other:?}"),
                }),
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
        _ => Err(error_from_response(response).await),
    }
}

/// Ask the backend whether the caller is an accepted user, and under which
/// callsign.
///
/// Returns `None` when the backend answers 401/403 (credential issued but
/// not yet accepted, or no credential at all).
///
/// # Errors
///
/// Returns an error on network failure, an unexpected status, or a callsign
/// that fails boundary validation.
#[instrument(skip(client))]
pub async fn check_valid_user(client: &ApiClient) -> Result<Option<Callsign>, ApiError> {
    let response = client.request(Method::GET, VALID_USER_PATH).await.send().await?;

    match response.status() {
        StatusCode::OK => {
            let body: ValidUserResponse = response.json().await?;
            let callsign =
                Callsign::parse(&body.callsign).map_err(|e| ApiError::InvalidField {
                    field: "callsign",
                    reason: e.to_string(),
                })?;
            Ok(Some(callsign))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
        _ => Err(error_from_response(response).await),
    }
}

/// Ask the backend whether the caller holds the admin role.
///
/// A 403 means "valid user, not an admin" and maps to `Ok(false)`.
///
/// # Errors
///
/// Returns an error on network failure or any status outside {200, 403}.
#[instrument(skip(client))]
pub async fn check_admin(client: &ApiClient) -> Result<bool, ApiError> {
    let response = client.request(Method::GET, VALID_ADMIN_PATH).await.send().await?;

    match response.status() {
        StatusCode::OK => Ok(true),
        StatusCode::FORBIDDEN => Ok(false),
        _ => Err(error_from_response(response).await),
    }
}
