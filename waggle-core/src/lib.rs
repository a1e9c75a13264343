//! # waggle-core
//!
//! Core types, credential storage, and error handling for the waggle
//! session-management SDK.
//!
//! This crate provides the foundational pieces shared by the rest of the
//! workspace:
//!
//! - **Credentials**: the [`CredentialPair`] (access + refresh token) that
//!   backs a session
//! - **Identity**: the authenticated user's profile as reported by the
//!   identity service
//! - **Storage**: the [`CredentialStore`] trait with in-memory and on-disk
//!   backends
//! - **Errors**: the [`AuthError`] taxonomy and [`StorageError`]
//!
//! Token material is treated as opaque bearer bytes: it is never parsed,
//! never logged, and redacted from `Debug` output.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod credentials;
pub mod errors;
pub mod identity;
pub mod store;

pub use credentials::CredentialPair;
pub use errors::{AuthError, AuthResult, StorageError};
pub use identity::Identity;
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore, SharedStore};
