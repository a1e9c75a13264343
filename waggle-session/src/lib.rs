//! # waggle-session
//!
//! The process-wide reactive session state machine: the only component
//! downstream UI observes.
//!
//! A [`Session`] orchestrates init/login/signup/logout over the identity
//! client and credential store, and publishes immutable [`SessionState`]
//! snapshots through a watch channel. Observers subscribe; they are never
//! assumed.
//!
//! The machine cycles between authenticated and unauthenticated for the
//! life of the process - there is no terminal state.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod session;
mod state;

pub use session::Session;
pub use state::{SessionState, SessionStatus};
