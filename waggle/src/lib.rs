//! # Waggle - Client-Side Session Management SDK
//!
//! Waggle maintains a user's authentication session against a remote
//! identity service: it keeps a short-lived access token attached to every
//! outgoing request and transparently recovers from token expiry using a
//! longer-lived refresh token - without ever issuing more than one
//! concurrent refresh call, regardless of how many requests fail at once.
//!
//! ## Quick Start
//!
//! ```ignore
//! use waggle::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), waggle::AuthError> {
//!     let session = SessionBuilder::new("http://127.0.0.1:8000")
//!         .file_store("~/.config/myapp/credentials.json")
//!         .build();
//!
//!     session.init().await;
//!     if !session.state().is_authenticated() {
//!         session.login("user@example.com", "Passw0rd!").await?;
//!     }
//!
//!     let mut updates = session.subscribe();
//!     println!("{:?}", session.state().identity);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Waggle is organized as a workspace of focused crates:
//!
//! - [`waggle_core`] - credential pair, identity, storage backends, errors
//! - [`waggle_client`] - identity API client, request pipeline, and the
//!   single-flight refresh coordinator
//! - [`waggle_session`] - the reactive session state machine UI observes
//!
//! ## Guarantees
//!
//! - At most one refresh network call outstanding at any instant
//! - A request is retried at most once after an authorization failure
//! - Credential storage and session state never disagree about whether a
//!   session exists

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod builder;

pub use builder::SessionBuilder;

pub use waggle_core::{
    AuthError, AuthResult, CredentialPair, CredentialStore, FileCredentialStore, Identity,
    MemoryCredentialStore, SharedStore, StorageError,
};

pub use waggle_client::{
    AuthHttpClient, IdentityClient, RefreshCoordinator, ServiceConfig, SignupResponse,
};

pub use waggle_session::{Session, SessionState, SessionStatus};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        AuthError, AuthResult, CredentialPair, Identity, ServiceConfig, Session, SessionBuilder,
        SessionState, SessionStatus,
    };
}
