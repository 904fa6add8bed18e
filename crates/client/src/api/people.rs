//! User listing and role-change endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rasenmaeher_core::{Callsign, UserRecord};

use super::{ApiClient, ApiError, error_from_response};

const PEOPLE_LIST_PATH: &str = "/api/v1/people/list";
const PEOPLE_PATH: &str = "/api/v1/people";
const PROMOTE_PATH: &str = "/api/v1/enrollment/promote";
const DEMOTE_PATH: &str = "/api/v1/enrollment/demote";

#[derive(Debug, Deserialize)]
struct PeopleListResponse {
    callsign_list: Vec<PersonEntry>,
}

#[derive(Debug, Deserialize)]
struct PersonEntry {
    callsign: String,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CallsignRequest<'a> {
    callsign: &'a str,
}

/// List all enrolled users with their roles.
///
/// # Errors
///
/// Returns an error on transport/status failures or when an entry fails
/// boundary validation.
#[instrument(skip(client))]
pub async fn list_users(client: &ApiClient) -> Result<Vec<UserRecord>, ApiError> {
    let response = client
        .request(Method::GET, PEOPLE_LIST_PATH)
        .await
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: PeopleListResponse = response.json().await?;

    body.callsign_list
        .into_iter()
        .map(|entry| {
            let callsign = Callsign::parse(&entry.callsign).map_err(|e| ApiError::InvalidField {
                field: "callsign",
                reason: e.to_string(),
            })?;
            Ok(UserRecord {
                callsign,
                roles: entry.roles.into_iter().collect(),
            })
        })
        .collect()
}

/// Grant the admin role to a user.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client), fields(callsign = %callsign))]
pub async fn promote(client: &ApiClient, callsign: &Callsign) -> Result<(), ApiError> {
    role_change(client, PROMOTE_PATH, callsign).await
}

/// Revoke the admin role from a user.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client), fields(callsign = %callsign))]
pub async fn demote(client: &ApiClient, callsign: &Callsign) -> Result<(), ApiError> {
    role_change(client, DEMOTE_PATH, callsign).await
}

async fn role_change(
    client: &ApiClient,
    path: &str,
    callsign: &Callsign,
) -> Result<(), ApiError> {
    let response = client
        .request(Method::POST, path)
        .await
        .json(&CallsignRequest {
            callsign: callsign.as_str(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}

/// Remove a user from the deployment entirely.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client), fields(callsign = %callsign))]
pub async fn delete_user(client: &ApiClient, callsign: &Callsign) -> Result<(), ApiError> {
    let path = format!("{PEOPLE_PATH}/{callsign}");
    let response = client.request(Method::DELETE, &path).await.send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}
