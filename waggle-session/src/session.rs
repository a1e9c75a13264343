//! The session state machine.

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};
use waggle_client::{IdentityClient, SignupResponse};
use waggle_core::{AuthResult, SharedStore};

use crate::state::SessionState;

/// Orchestrates login/signup/logout/init and publishes state snapshots.
///
/// The session is the only writer of [`SessionState`] and the only
/// component that persists a credential pair on login - keeping the
/// storage write at one auditable call site. Operations that mutate
/// state are serialized by an internal guard, so overlapping calls
/// (say, a login racing a logout) cannot interleave their writes.
pub struct Session {
    api: IdentityClient,
    store: SharedStore,
    state: watch::Sender<SessionState>,
    op_guard: Mutex<()>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", &self.api)
            .field("state", &self.state.borrow().status())
            .finish()
    }
}

impl Session {
    /// Create a session over an identity client and credential store.
    pub fn new(api: IdentityClient, store: SharedStore) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            store,
            state,
            op_guard: Mutex::new(()),
        }
    }

    /// The identity client, for callers that need raw API access.
    pub fn api(&self) -> &IdentityClient {
        &self.api
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// Receivers observe every published snapshot; external UI subscribes
    /// here instead of being assumed.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Restore the session from stored credentials.
    ///
    /// With nothing stored this settles on unauthenticated without a
    /// network call. Any failure clears storage, records the message, and
    /// still settles on unauthenticated - loading is never left set and
    /// state never disagrees with storage about "has a session".
    pub async fn init(&self) {
        let _op = self.op_guard.lock().await;
        self.update(|state| {
            state.loading = true;
            state.error = None;
        });

        if let Err(err) = self.fetch_identity().await {
            warn!(error = %err, "session init failed; clearing stored credentials");
            if let Err(storage_err) = self.store.clear().await {
                warn!(error = %storage_err, "could not clear credential storage");
            }
            self.update(|state| {
                state.identity = None;
                state.error = Some(err.to_string());
            });
        }

        self.update(|state| {
            state.loading = false;
            state.initialized = true;
        });
    }

    /// Authenticate and establish a session.
    ///
    /// Persists the issued pair, then verifies it with an identity fetch.
    /// If that fetch fails the just-stored pair is rolled back, so storage
    /// never claims a session the state machine denies.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<()> {
        let _op = self.op_guard.lock().await;
        self.update(|state| state.error = None);

        let pair = self.api.login(email, password).await?;
        self.store.set(&pair).await?;

        if let Err(err) = self.fetch_identity().await {
            warn!(error = %err, "identity fetch after login failed; rolling back credentials");
            self.store.clear().await?;
            self.update(|state| state.identity = None);
            return Err(err);
        }
        Ok(())
    }

    /// Register a new account.
    ///
    /// Does not establish a session and does not touch identity or
    /// loading; callers navigate to login themselves afterwards.
    pub async fn signup(&self, email: &str, password: &str) -> AuthResult<SignupResponse> {
        let _op = self.op_guard.lock().await;
        self.update(|state| state.error = None);
        self.api.signup(email, password).await
    }

    /// End the session.
    ///
    /// Remote invalidation is best-effort; the session always ends up
    /// unauthenticated with storage cleared, whatever the server said.
    pub async fn logout(&self) {
        let _op = self.op_guard.lock().await;
        self.update(|state| state.error = None);

        let refresh = match self.store.get().await {
            Ok(pair) => pair.map(|pair| pair.refresh),
            Err(err) => {
                warn!(error = %err, "could not read stored credentials during logout");
                None
            }
        };

        if let Err(err) = self.api.logout(refresh.as_deref()).await {
            debug!(error = %err, "remote logout failed; ending session locally");
        }

        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "could not clear credential storage during logout");
        }
        self.update(|state| state.identity = None);
    }

    /// Re-fetch the identity without touching tokens.
    ///
    /// With no stored access credential this clears the identity and makes
    /// no network call.
    pub async fn refresh_me(&self) -> AuthResult<()> {
        let _op = self.op_guard.lock().await;
        self.fetch_identity().await
    }

    async fn fetch_identity(&self) -> AuthResult<()> {
        let has_access = self
            .store
            .get()
            .await?
            .is_some_and(|pair| !pair.access.is_empty());
        if !has_access {
            self.update(|state| state.identity = None);
            return Ok(());
        }

        let identity = self.api.whoami().await?;
        self.update(|state| state.identity = Some(identity));
        Ok(())
    }

    fn update(&self, mutate: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(mutate);
    }
}
