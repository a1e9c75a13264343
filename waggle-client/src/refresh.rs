//! Single-flight credential refresh.
//!
//! The coordinator collapses N concurrent "I need a fresh access token"
//! demands into exactly one network round trip. The pending operation is an
//! explicit [`Shared`] future handle guarded by a mutex: the first caller
//! starts the refresh and stashes the handle, later callers attach to it,
//! and completion (success or failure) clears the slot so the next 401
//! starts a fresh attempt.

use crate::config::ServiceConfig;
use crate::wire::{rejection_detail, Envelope, RefreshRequest, TokenGrant, REFRESH_PATH};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};
use waggle_core::{AuthError, AuthResult, CredentialPair, SharedStore};

type PendingRefresh = Shared<BoxFuture<'static, Result<String, Arc<AuthError>>>>;

/// Coordinates credential refresh so at most one refresh call is
/// outstanding at any instant.
///
/// On success the renewed pair is persisted to the store before any waiter
/// resumes, so a retried request always dispatches strictly after the
/// credential write. On failure the store is left untouched - clearing it
/// is the request pipeline's decision.
pub struct RefreshCoordinator {
    client: Client,
    config: ServiceConfig,
    store: SharedStore,
    pending: Mutex<Option<PendingRefresh>>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("config", &self.config)
            .field("in_flight", &self.pending.lock().is_some())
            .finish()
    }
}

impl RefreshCoordinator {
    /// Create a coordinator using `client` for the bare refresh call.
    pub fn new(client: Client, config: ServiceConfig, store: SharedStore) -> Self {
        Self {
            client,
            config,
            store,
            pending: Mutex::new(None),
        }
    }

    /// Obtain a valid access token, refreshing at most once concurrently.
    ///
    /// Callers arriving while a refresh is outstanding attach to that same
    /// operation and observe its outcome. The error is shared between
    /// waiters, hence the `Arc`.
    pub async fn acquire(&self) -> Result<String, Arc<AuthError>> {
        let operation = {
            let mut pending = self.pending.lock();
            match pending.as_ref() {
                Some(operation) => {
                    debug!("attaching to in-flight credential refresh");
                    operation.clone()
                }
                None => {
                    let operation = run_refresh(
                        self.client.clone(),
                        self.config.clone(),
                        Arc::clone(&self.store),
                    )
                    .boxed()
                    .shared();
                    *pending = Some(operation.clone());
                    operation
                }
            }
            // Lock drops here; it is never held across an await.
        };

        let result = operation.clone().await;

        let mut pending = self.pending.lock();
        if pending
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&operation))
        {
            *pending = None;
        }
        drop(pending);

        result
    }
}

async fn run_refresh(
    client: Client,
    config: ServiceConfig,
    store: SharedStore,
) -> Result<String, Arc<AuthError>> {
    let pair = store.get().await.map_err(AuthError::from).map_err(Arc::new)?;
    let Some(pair) = pair else {
        return Err(Arc::new(AuthError::refresh_rejected(
            "no refresh credential stored",
        )));
    };

    debug!("refreshing access credential");
    let renewed = request_refresh(&client, &config, &pair.refresh)
        .await
        .map_err(Arc::new)?;

    // Persist before any waiter resumes: retried requests must observe the
    // renewed pair, never a half-written one.
    store
        .set(&renewed)
        .await
        .map_err(AuthError::from)
        .map_err(Arc::new)?;

    Ok(renewed.access)
}

/// One bare refresh round trip: no bearer header, no retry-on-401.
///
/// Shared with [`IdentityClient::refresh`](crate::IdentityClient::refresh);
/// neither caller persists here - the coordinator owns the storage write.
pub(crate) async fn request_refresh(
    client: &Client,
    config: &ServiceConfig,
    refresh_token: &str,
) -> AuthResult<CredentialPair> {
    let response = client
        .post(config.url(REFRESH_PATH))
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|err| AuthError::network(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let reason = rejection_detail(status, &body);
        warn!(status = %status, "credential refresh rejected");
        return Err(AuthError::refresh_rejected(reason));
    }

    let envelope: Envelope<TokenGrant> = response
        .json()
        .await
        .map_err(|err| AuthError::invalid_response(err.to_string()))?;
    let grant = envelope.into_data("refresh")?;
    Ok(CredentialPair::from(grant))
}
