//! Rasenmaeher client - enrollment, invites, approvals, and role management.
//!
//! This crate implements the client side of a Rasenmaeher deployment's
//! enrollment and role-authorization workflow. The REST backend is an
//! external collaborator; everything here is typed orchestration of its
//! endpoints.
//!
//! # Architecture
//!
//! - [`api`] - one typed wrapper per backend endpoint over `reqwest`
//! - [`identity`] - resolves who the caller is (mechanism, callsign, role)
//! - [`classifier`] - decides whether a login code is an admin bootstrap
//!   code or an enrollment invite code
//! - [`enrollment`] - the code -> callsign -> credential state machine
//! - [`invites`] - admin-side invite-code lifecycle with cached list state
//! - [`approvals`] - admin-side queue of pending enrollees
//! - [`roles`] - admin-side promote/demote/remove with guardrails
//! - [`storage`] - persisted per-deployment credential state
//!
//! # Example
//!
//! ```rust,ignore
//! use rasenmaeher_client::{ApiClient, Config, LocalStore};
//! use rasenmaeher_client::enrollment::EnrollmentWorkflow;
//!
//! let config = Config::from_env()?;
//! let client = ApiClient::new(&config);
//! let store = LocalStore::open(&config.state_dir, client.base_url())?;
//!
//! let mut workflow = EnrollmentWorkflow::new(client, store);
//! workflow.submit_code("abcd1234").await?;
//! workflow.submit_callsign("eagle1").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod approvals;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod identity;
pub mod invites;
pub mod poll;
pub mod roles;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use batch::BatchOutcome;
pub use config::{Config, ConfigError};
pub use error::ClientError;
pub use identity::IdentitySnapshot;
pub use poll::PollerHandle;
pub use storage::{LocalStore, StorageError};
