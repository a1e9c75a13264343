//! # waggle-client
//!
//! HTTP plumbing for the waggle session-management SDK: the identity API
//! client, the bearer-attaching request pipeline, and the single-flight
//! refresh coordinator.
//!
//! ## Core pieces
//!
//! - [`ServiceConfig`]: base URL, timeout, and client construction
//! - [`AuthHttpClient`]: wraps every outgoing request - attaches the stored
//!   access token, recovers from a 401 with exactly one refresh-and-retry
//! - [`RefreshCoordinator`]: collapses N concurrent refresh demands into a
//!   single network round trip whose outcome every caller shares
//! - [`IdentityClient`]: typed signup/login/refresh/logout/whoami operations
//!
//! The coordinator's own token call is the only request that bypasses the
//! pipeline, so a rejected refresh can never recurse into another refresh.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod refresh;
pub mod transport;
pub mod wire;

pub use api::IdentityClient;
pub use config::ServiceConfig;
pub use refresh::RefreshCoordinator;
pub use transport::AuthHttpClient;
pub use wire::{Envelope, SignupResponse, TokenGrant};
