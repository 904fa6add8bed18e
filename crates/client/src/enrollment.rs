//! The enrollment state machine.
//!
//! Drives a new user (or the deployment's first admin) from a raw login
//! code to a persisted bearer credential:
//!
//! ```text
//! CodeEntry -> Classifying -> CallsignEntry -> Submitting
//!     -> AdminIssued                      (admin bootstrap path)
//!     -> EnrollmentPending -> Accepted    (invite path)
//! ```
//!
//! Invalid or unknown codes land in `Invalid`, which accepts a new code
//! like `CodeEntry` does. A refused callsign returns the machine to
//! `CallsignEntry` with the classified code intact, so only the callsign
//! has to be re-entered.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use rasenmaeher_core::{ApprovalCode, Callsign, CallsignError, CodeKind, LoginCode, LoginCodeError};

use crate::api::{self, ApiClient, ApiError};
use crate::classifier::{self, ClassifierError};
use crate::storage::{LocalStore, StorageError};

/// Default cadence for the acceptance poller.
pub const ACCEPTANCE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Errors that can occur while driving the enrollment workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The login code failed local shape validation.
    #[error("Invalid login code: {0}")]
    InvalidCode(#[from] LoginCodeError),

    /// The callsign failed local shape validation.
    #[error("Invalid callsign: {0}")]
    InvalidCallsign(#[from] CallsignError),

    /// Neither validity probe recognized the code.
    #[error("Login code not recognized")]
    UnknownCode,

    /// The backend refused the callsign, typically because it is taken.
    #[error("Callsign already in use: {0}")]
    CallsignTaken(String),

    /// The requested operation is not valid in the current state.
    #[error("Operation {0} is not valid in the current workflow state")]
    WrongState(&'static str),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persisting the issued credentials failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ClassifierError> for WorkflowError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::InvalidCode(e) => Self::InvalidCode(e),
            ClassifierError::Api(e) => Self::Api(e),
        }
    }
}

/// Observable state of the enrollment workflow.
#[derive(Debug, Clone)]
pub enum WorkflowState {
    /// Waiting for a login code.
    CodeEntry,
    /// A code is being checked against the backend.
    Classifying,
    /// The code was recognized; waiting for a callsign.
    CallsignEntry {
        /// The normalized, classified login code.
        code: LoginCode,
        /// What kind of code it is.
        kind: CodeKind,
    },
    /// The callsign is being submitted.
    Submitting,
    /// Admin bootstrap completed; credentials are persisted.
    AdminIssued {
        /// The claimed admin callsign.
        callsign: Callsign,
    },
    /// Enrollment submitted; waiting for an admin to approve.
    EnrollmentPending {
        /// The claimed callsign.
        callsign: Callsign,
        /// Code to show the approving admin.
        approval_code: ApprovalCode,
    },
    /// An admin approved the enrollment.
    Accepted {
        /// The approved callsign.
        callsign: Callsign,
    },
    /// The last submitted code was refused; a new code may be entered.
    Invalid {
        /// Why the code was refused.
        reason: String,
    },
}

impl WorkflowState {
    /// True in states that accept [`EnrollmentWorkflow::submit_code`].
    #[must_use]
    pub const fn accepts_code(&self) -> bool {
        matches!(self, Self::CodeEntry | Self::Invalid { .. })
    }
}

/// The enrollment workflow: one instance per enrollment attempt.
#[derive(Debug)]
pub struct EnrollmentWorkflow {
    client: ApiClient,
    store: LocalStore,
    state: WorkflowState,
}

impl EnrollmentWorkflow {
    /// Create a workflow in `CodeEntry`.
    #[must_use]
    pub const fn new(client: ApiClient, store: LocalStore) -> Self {
        Self {
            client,
            store,
            state: WorkflowState::CodeEntry,
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub const fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Submit a raw login code for classification.
    ///
    /// Valid from `CodeEntry` and `Invalid`. On success the machine moves
    /// to `CallsignEntry`; a malformed or unrecognized code moves it to
    /// `Invalid`, from where a new code may be submitted.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::WrongState`] when called out of turn,
    /// [`WorkflowError::InvalidCode`] or [`WorkflowError::UnknownCode`]
    /// for refused codes, and [`WorkflowError::Api`] on probe failures.
    #[instrument(skip(self, raw_code))]
    pub async fn submit_code(&mut self, raw_code: &str) -> Result<CodeKind, WorkflowError> {
        if !self.state.accepts_code() {
            return Err(WorkflowError::WrongState("submit_code"));
        }
        self.state = WorkflowState::Classifying;

        let (code, classification) = match classifier::classify(&self.client, raw_code).await {
            Ok(classified) => classified,
            Err(e) => {
                self.state = WorkflowState::Invalid {
                    reason: e.to_string(),
                };
                return Err(e.into());
            }
        };

        let kind = classification.kind();
        if kind == CodeKind::Unknown {
            self.state = WorkflowState::Invalid {
                reason: "login code not recognized".to_owned(),
            };
            return Err(WorkflowError::UnknownCode);
        }

        info!(?kind, "login code accepted");
        self.state = WorkflowState::CallsignEntry { code, kind };
        Ok(kind)
    }

    /// Submit the desired callsign, completing the code's path.
    ///
    /// On the admin bootstrap path this runs the three-call exchange and
    /// lands in `AdminIssued`; on the invite path it enrolls and lands in
    /// `EnrollmentPending`. Either way the issued credential is persisted
    /// and installed on the API client before the state changes.
    ///
    /// Any submission failure returns the machine to `CallsignEntry`, so
    /// a different callsign can be tried without re-entering the code.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::CallsignTaken`] when the backend refuses
    /// the callsign, [`WorkflowError::InvalidCallsign`] on local
    /// validation failure, and [`WorkflowError::WrongState`] out of turn.
    #[instrument(skip(self), fields(callsign = raw_callsign))]
    pub async fn submit_callsign(
        &mut self,
        raw_callsign: &str,
    ) -> Result<&WorkflowState, WorkflowError> {
        let WorkflowState::CallsignEntry { code, kind } = self.state.clone() else {
            return Err(WorkflowError::WrongState("submit_callsign"));
        };

        // Validate locally before burning a network round trip.
        let callsign = Callsign::parse(raw_callsign)?;
        self.state = WorkflowState::Submitting;

        let submitted = match kind {
            CodeKind::AdminBootstrap => self.bootstrap_admin(&code, &callsign).await,
            CodeKind::EnrollmentInvite => self.enroll_user(&code, &callsign).await,
            CodeKind::Unknown => Err(WorkflowError::UnknownCode),
        };

        match submitted {
            Ok(next) => {
                self.state = next;
                Ok(&self.state)
            }
            Err(e) => {
                self.state = WorkflowState::CallsignEntry { code, kind };
                match e {
                    WorkflowError::Api(ApiError::Rejected(reason)) => {
                        Err(WorkflowError::CallsignTaken(reason))
                    }
                    other => Err(other),
                }
            }
        }
    }

    /// Admin bootstrap: a strictly sequential three-call exchange. Each
    /// call is authorized by the previous call's result, so nothing runs
    /// concurrently and a failure anywhere aborts the chain.
    async fn bootstrap_admin(
        &self,
        code: &LoginCode,
        callsign: &Callsign,
    ) -> Result<WorkflowState, WorkflowError> {
        let first_jwt = api::tokens::exchange_code(&self.client, code.as_str()).await?;
        let exchange = api::tokens::add_admin(&self.client, &first_jwt, callsign).await?;
        let jwt = api::tokens::exchange_code(&self.client, &exchange).await?;

        self.store.set_credentials(&jwt, callsign, None)?;
        self.client.set_token(jwt).await;

        info!("admin bootstrap complete");
        Ok(WorkflowState::AdminIssued {
            callsign: callsign.clone(),
        })
    }

    async fn enroll_user(
        &self,
        code: &LoginCode,
        callsign: &Callsign,
    ) -> Result<WorkflowState, WorkflowError> {
        let issued = api::enrollment::enroll(&self.client, code, callsign).await?;

        self.store
            .set_credentials(&issued.jwt, &issued.callsign, Some(&issued.approval_code))?;
        self.client.set_token(issued.jwt).await;

        info!("enrollment submitted, awaiting approval");
        Ok(WorkflowState::EnrollmentPending {
            callsign: issued.callsign,
            approval_code: issued.approval_code,
        })
    }

    /// Block until an admin approves the pending enrollment.
    ///
    /// Polls the backend every `interval`; transient poll failures are
    /// logged and retried on the next tick. Completes exactly once, moving
    /// the machine to `Accepted`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::WrongState`] unless the machine is in
    /// `EnrollmentPending`.
    #[instrument(skip(self))]
    pub async fn wait_for_acceptance(&mut self, interval: Duration) -> Result<(), WorkflowError> {
        let WorkflowState::EnrollmentPending { callsign, .. } = self.state.clone() else {
            return Err(WorkflowError::WrongState("wait_for_acceptance"));
        };

        loop {
            tokio::time::sleep(interval).await;

            match api::enrollment::have_i_been_accepted(&self.client).await {
                Ok(true) => {
                    info!(%callsign, "enrollment accepted");
                    self.state = WorkflowState::Accepted { callsign };
                    return Ok(());
                }
                Ok(false) => {}
                Err(e) => warn!(error = %e, "acceptance poll failed, will retry"),
            }
        }
    }
}
