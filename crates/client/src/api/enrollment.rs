//! Enrollment and invite-code endpoints.

use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use rasenmaeher_core::{
    ApprovalCode, Callsign, EnrollmentRecord, EnrollmentState, InviteCode, InviteCodeToken,
    LoginCode,
};

use super::{ApiClient, ApiError, error_from_response};

const INVITECODE_PATH: &str = "/api/v1/enrollment/invitecode";
const INVITECODE_CREATE_PATH: &str = "/api/v1/enrollment/invitecode/create";
const INVITECODE_ACTIVATE_PATH: &str = "/api/v1/enrollment/invitecode/activate";
const INVITECODE_DEACTIVATE_PATH: &str = "/api/v1/enrollment/invitecode/deactivate";
const INVITECODE_ENROLL_PATH: &str = "/api/v1/enrollment/invitecode/enroll";
const POOLS_PATH: &str = "/api/v1/enrollment/pools";
const LIST_PATH: &str = "/api/v1/enrollment/list";
const ACCEPT_PATH: &str = "/api/v1/enrollment/accept";
const LOCK_PATH: &str = "/api/v1/enrollment/lock";
const ACCEPTED_PATH: &str = "/api/v1/enrollment/have-i-been-accepted";

/// Credential bundle issued when a user enrolls against an invite code.
#[derive(Debug)]
pub struct EnrollmentIssued {
    /// The callsign the backend confirmed.
    pub callsign: Callsign,
    /// The approval code for the admin handoff.
    pub approval_code: ApprovalCode,
    /// The issued bearer credential.
    pub jwt: SecretString,
}

#[derive(Debug, Deserialize)]
struct InviteCheckResponse {
    invitecode_is_active: bool,
}

#[derive(Debug, Serialize)]
struct EnrollRequest<'a> {
    invite_code: &'a str,
    callsign: &'a str,
}

#[derive(Debug, Deserialize)]
struct EnrollResponse {
    callsign: String,
    approvecode: String,
    jwt: String,
}

#[derive(Debug, Deserialize)]
struct InviteCreateResponse {
    invite_code: String,
}

#[derive(Debug, Serialize)]
struct InviteCodeRequest<'a> {
    invite_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    pools: Vec<PoolEntry>,
}

#[derive(Debug, Deserialize)]
struct PoolEntry {
    invitecode: String,
    active: bool,
    owner_cs: String,
    created: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentListResponse {
    callsign_list: Vec<EnrollmentListEntry>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentListEntry {
    callsign: String,
    state: EnrollmentState,
}

#[derive(Debug, Serialize)]
struct AcceptRequest<'a> {
    callsign: &'a str,
    approvecode: &'a str,
}

#[derive(Debug, Serialize)]
struct LockRequest<'a> {
    callsign: &'a str,
    lock_reason: &'a str,
}

#[derive(Debug, Deserialize)]
struct AcceptedResponse {
    have_i_been_accepted: bool,
}

/// Check whether `code` is a currently active enrollment invite code.
///
/// A 404 answer means the code is not known and maps to `Ok(false)`.
///
/// # Errors
///
/// Returns an error on network failure or an unexpected status.
#[instrument(skip(client, code))]
pub async fn check_invite_code(client: &ApiClient, code: &str) -> Result<bool, ApiError> {
    let response = client
        .request_anonymous(Method::GET, INVITECODE_PATH)
        .query(&[("invitecode", code)])
        .send()
        .await?;

    match response.status() {
        StatusCode::OK => {
            let body: InviteCheckResponse = response.json().await?;
            Ok(body.invitecode_is_active)
        }
        StatusCode::NOT_FOUND => Ok(false),
        _ => Err(error_from_response(response).await),
    }
}

/// Claim `callsign` against `invite_code`, creating a pending enrollment.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] when the callsign is already in use, or
/// any other [`ApiError`] variant on transport/status failures. Fields of
/// the response are validated at this boundary.
#[instrument(skip(client, invite_code), fields(callsign = %callsign))]
pub async fn enroll(
    client: &ApiClient,
    invite_code: &LoginCode,
    callsign: &Callsign,
) -> Result<EnrollmentIssued, ApiError> {
    let response = client
        .request_anonymous(Method::POST, INVITECODE_ENROLL_PATH)
        .json(&EnrollRequest {
            invite_code: invite_code.as_str(),
            callsign: callsign.as_str(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: EnrollResponse = response.json().await?;

    let callsign = Callsign::parse(&body.callsign).map_err(|e| ApiError::InvalidField {
        field: "callsign",
        reason: e.to_string(),
    })?;
    let approval_code =
        ApprovalCode::parse(&body.approvecode).map_err(|e| ApiError::InvalidField {
            field: "approvecode",
            reason: e.to_string(),
        })?;

    Ok(EnrollmentIssued {
        callsign,
        approval_code,
        jwt: SecretString::from(body.jwt),
    })
}

/// Create a new invite code owned by the calling admin.
///
/// # Errors
///
/// Returns an error on transport/status failures or when the minted code
/// fails boundary validation.
#[instrument(skip(client))]
pub async fn create_invite_code(client: &ApiClient) -> Result<InviteCodeToken, ApiError> {
    let response = client
        .request(Method::POST, INVITECODE_CREATE_PATH)
        .await
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: InviteCreateResponse = response.json().await?;
    InviteCodeToken::parse(&body.invite_code).map_err(|e| ApiError::InvalidField {
        field: "invite_code",
        reason: e.to_string(),
    })
}

/// Activate an invite code so new enrollments are accepted against it.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client))]
pub async fn activate_invite_code(
    client: &ApiClient,
    code: &InviteCodeToken,
) -> Result<(), ApiError> {
    set_invite_code_active(client, code, true).await
}

/// Deactivate an invite code. Already-enrolled users are unaffected.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client))]
pub async fn deactivate_invite_code(
    client: &ApiClient,
    code: &InviteCodeToken,
) -> Result<(), ApiError> {
    set_invite_code_active(client, code, false).await
}

async fn set_invite_code_active(
    client: &ApiClient,
    code: &InviteCodeToken,
    active: bool,
) -> Result<(), ApiError> {
    let path = if active {
        INVITECODE_ACTIVATE_PATH
    } else {
        INVITECODE_DEACTIVATE_PATH
    };

    let response = client
        .request(Method::PUT, path)
        .await
        .json(&InviteCodeRequest {
            invite_code: code.as_str(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}

/// Permanently delete an invite code.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client))]
pub async fn delete_invite_code(
    client: &ApiClient,
    code: &InviteCodeToken,
) -> Result<(), ApiError> {
    let path = format!("{INVITECODE_PATH}/{code}");
    let response = client.request(Method::DELETE, &path).await.send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}

/// List all invite codes of the deployment.
///
/// # Errors
///
/// Returns an error on transport/status failures or when an entry fails
/// boundary validation.
#[instrument(skip(client))]
pub async fn list_invite_codes(client: &ApiClient) -> Result<Vec<InviteCode>, ApiError> {
    let response = client.request(Method::GET, POOLS_PATH).await.send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: PoolsResponse = response.json().await?;

    body.pools
        .into_iter()
        .map(|entry| {
            let owner = Callsign::parse(&entry.owner_cs).map_err(|e| ApiError::InvalidField {
                field: "owner_cs",
                reason: e.to_string(),
            })?;
            let code =
                InviteCodeToken::parse(&entry.invitecode).map_err(|e| ApiError::InvalidField {
                    field: "invitecode",
                    reason: e.to_string(),
                })?;
            Ok(InviteCode {
                code,
                active: entry.active,
                owner,
                created_at: entry.created,
            })
        })
        .collect()
}

/// List all enrollment records of the deployment.
///
/// # Errors
///
/// Returns an error on transport/status failures or when an entry fails
/// boundary validation.
#[instrument(skip(client))]
pub async fn list_enrollments(client: &ApiClient) -> Result<Vec<EnrollmentRecord>, ApiError> {
    let response = client.request(Method::GET, LIST_PATH).await.send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: EnrollmentListResponse = response.json().await?;

    body.callsign_list
        .into_iter()
        .map(|entry| {
            let callsign = Callsign::parse(&entry.callsign).map_err(|e| ApiError::InvalidField {
                field: "callsign",
                reason: e.to_string(),
            })?;
            Ok(EnrollmentRecord {
                callsign,
                state: entry.state,
            })
        })
        .collect()
}

/// Approve a pending enrollee, authenticated by their approval code.
///
/// # Errors
///
/// Returns [`ApiError::Rejected`] with the backend's reason when the
/// approval is refused; the record stays pending in that case.
#[instrument(skip(client, approval_code), fields(callsign = %callsign))]
pub async fn accept(
    client: &ApiClient,
    callsign: &Callsign,
    approval_code: &ApprovalCode,
) -> Result<(), ApiError> {
    let response = client
        .request(Method::POST, ACCEPT_PATH)
        .await
        .json(&AcceptRequest {
            callsign: callsign.as_str(),
            approvecode: approval_code.as_str(),
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}

/// Reject a pending enrollee, locking them out with `reason`.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client), fields(callsign = %callsign))]
pub async fn lock(client: &ApiClient, callsign: &Callsign, reason: &str) -> Result<(), ApiError> {
    let response = client
        .request(Method::POST, LOCK_PATH)
        .await
        .json(&LockRequest {
            callsign: callsign.as_str(),
            lock_reason: reason,
        })
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}

/// Poll whether the calling enrollee has been accepted yet.
///
/// # Errors
///
/// Returns an error on transport/status failures.
#[instrument(skip(client))]
pub async fn have_i_been_accepted(client: &ApiClient) -> Result<bool, ApiError> {
    let response = client.request(Method::GET, ACCEPTED_PATH).await.send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: AcceptedResponse = response.json().await?;
    Ok(body.have_i_been_accepted)
}
