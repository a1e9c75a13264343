//! Typed operations against the identity service.
//!
//! The client is stateless request/response shaping: it owns no session
//! state and never writes credential storage. Persisting the pair returned
//! by [`login`](IdentityClient::login) is the session's job, so the storage
//! write stays atomic and auditable at one call site.

use crate::config::ServiceConfig;
use crate::refresh::request_refresh;
use crate::transport::AuthHttpClient;
use crate::wire::{
    rejection_detail, Envelope, LoginRequest, LogoutRequest, SignupRequest, SignupResponse,
    TokenGrant, LOGIN_PATH, LOGOUT_PATH, ME_PATH, SIGNUP_PATH,
};
use reqwest::{Response, StatusCode};
use tracing::debug;
use waggle_core::{AuthError, AuthResult, CredentialPair, Identity, SharedStore};

/// Client for the identity service's five operations.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: AuthHttpClient,
}

impl IdentityClient {
    /// Create a client dispatching through a fresh request pipeline.
    pub fn new(config: ServiceConfig, store: SharedStore) -> Self {
        Self {
            http: AuthHttpClient::new(config, store),
        }
    }

    /// Create a client over an existing pipeline.
    pub fn with_http(http: AuthHttpClient) -> Self {
        Self { http }
    }

    /// The request pipeline, for dispatching business endpoints.
    pub fn http(&self) -> &AuthHttpClient {
        &self.http
    }

    /// Register a new account. Does not establish a session.
    pub async fn signup(&self, email: &str, password: &str) -> AuthResult<SignupResponse> {
        let response = self
            .http
            .post(SIGNUP_PATH, &SignupRequest { email, password })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::signup_rejected(rejection_detail(status, &body)));
        }

        decode::<SignupResponse>(response, "signup").await
    }

    /// Exchange email + password for a credential pair.
    ///
    /// The returned pair is not persisted here; the caller decides.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<CredentialPair> {
        let response = match self.http.post(LOGIN_PATH, &LoginRequest { email, password }).await {
            Ok(response) => response,
            // A login that ends in an authorization failure, before or after
            // the pipeline's recovery attempt, means the credentials were bad.
            Err(AuthError::Unauthorized) => return Err(AuthError::InvalidCredentials),
            Err(err) => return Err(err),
        };

        let status = response.status();
        if !status.is_success() {
            debug!(status = %status, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let grant = decode::<TokenGrant>(response, "login").await?;
        Ok(CredentialPair::from(grant))
    }

    /// Trade a refresh token for a new credential pair.
    ///
    /// Bare round trip, no persistence - the refresh coordinator is the one
    /// storage-write site for renewed pairs.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<CredentialPair> {
        request_refresh(self.http.client(), self.http.config(), refresh_token).await
    }

    /// Best-effort remote session invalidation.
    ///
    /// With no refresh token this is a local no-op: no request is made.
    pub async fn logout(&self, refresh_token: Option<&str>) -> AuthResult<()> {
        let Some(refresh_token) = refresh_token else {
            debug!("logout without a stored session is a local no-op");
            return Ok(());
        };

        let response = self
            .http
            .post(LOGOUT_PATH, &LogoutRequest { refresh_token })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::invalid_response(rejection_detail(status, &body)));
        }
        Ok(())
    }

    /// Fetch the authenticated user's identity.
    pub async fn whoami(&self) -> AuthResult<Identity> {
        let response = self.http.get(ME_PATH).await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::invalid_response(rejection_detail(status, &body)));
        }

        decode::<Identity>(response, "whoami").await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
    operation: &str,
) -> AuthResult<T> {
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|err| AuthError::invalid_response(err.to_string()))?;
    envelope.into_data(operation)
}
