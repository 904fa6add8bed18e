//! Rasenmaeher Core - Shared types library.
//!
//! This crate provides common types used across all Rasenmaeher client
//! components:
//! - `client` - Typed REST client and workflow logic
//! - `cli` - Command-line front end for enrollment and administration
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for callsigns, codes, roles, and
//!   enrollment state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
