//! Credential exchange and admin bootstrap endpoints.

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rasenmaeher_core::Callsign;

use super::{ApiClient, ApiError, error_from_response};

const CHECK_CODE_PATH: &str = "/api/v1/firstuser/check-code";
const ADD_ADMIN_PATH: &str = "/api/v1/firstuser/add-admin";
const EXCHANGE_PATH: &str = "/api/v1/token/code/exchange";

#[derive(Debug, Deserialize)]
struct CheckCodeResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    jwt: String,
}

#[derive(Debug, Serialize)]
struct AddAdminRequest<'a> {
    callsign: &'a str,
}

#[derive(Debug, Deserialize)]
struct AddAdminResponse {
    jwt_exchange_code: String,
}

/// Check whether `code` is a valid admin bootstrap code.
///
/// A 404 answer means the code is not known and maps to `Ok(false)`.
///
/// # Errors
///
/// Returns an error on network failure or an unexpected status.
#[instrument(skip(client, code))]
pub async fn check_bootstrap_code(client: &ApiClient, code: &str) -> Result<bool, ApiError> {
    let response = client
        .request_anonymous(Method::GET, CHECK_CODE_PATH)
        .query(&[("temp_admin_code", code)])
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {
            let body: CheckCodeResponse = response.json().await?;
            Ok(body.ok)
        }
        StatusCode::NOT_FOUND => Ok(false),
        _ => Err(error_from_response(response).await),
    }
}

/// Exchange a one-time code for a bearer credential.
///
/// Used twice on the admin bootstrap path: once with the login code and once
/// with the exchange code minted by [`add_admin`].
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] if the backend refuses the code, or any
/// other [`ApiError`] variant on transport/status failures.
#[instrument(skip(client, code))]
pub async fn exchange_code(client: &ApiClient, code: &str) -> Result<SecretString, ApiError> {
    let response = client
        .request_anonymous(Method::POST, EXCHANGE_PATH)
        .json(&ExchangeRequest { code })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: ExchangeResponse = response.json().await?;
    Ok(SecretString::from(body.jwt))
}

/// Claim `callsign` as the deployment's first admin identity.
///
/// Must be authorized with the credential obtained from the *first*
/// [`exchange_code`] call; returns a fresh exchange code for the final
/// credential. Callers own the ordering.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] when the callsign is already claimed, or
/// any other [`ApiError`] variant on transport/status failures.
#[instrument(skip(client, bearer), fields(callsign = %callsign))]
pub async fn add_admin(
    client: &ApiClient,
    bearer: &SecretString,
    callsign: &Callsign,
) -> Result<String, ApiError> {
    let response = client
        .request_with_token(Method::POST, ADD_ADMIN_PATH, bearer)
        .json(&AddAdminRequest {
            callsign: callsign.as_str(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: AddAdminResponse = response.json().await?;
    Ok(body.jwt_exchange_code)
}
