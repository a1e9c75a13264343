//! The request pipeline.
//!
//! Every outgoing request is wrapped by two stages. Outbound: if the store
//! holds an access credential, attach it as a bearer header; otherwise the
//! request proceeds unauthenticated. Inbound: a 401 response triggers one
//! refresh-and-retry through the [`RefreshCoordinator`]; a second 401
//! propagates unchanged, so retry amplification is bounded at exactly one
//! extra call per failed request.

use crate::config::ServiceConfig;
use crate::refresh::RefreshCoordinator;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use waggle_core::{AuthError, AuthResult, SharedStore};

/// HTTP client wrapper that attaches credentials and recovers from expiry.
///
/// Reads credentials, never writes them - except for the forced clear when
/// a refresh attempt fails and the session is no longer recoverable.
#[derive(Debug, Clone)]
pub struct AuthHttpClient {
    client: Client,
    config: ServiceConfig,
    store: SharedStore,
    refresher: Arc<RefreshCoordinator>,
}

impl AuthHttpClient {
    /// Create a pipeline over `config`, reading credentials from `store`.
    pub fn new(config: ServiceConfig, store: SharedStore) -> Self {
        let client = config.build_client();
        let refresher = Arc::new(RefreshCoordinator::new(
            client.clone(),
            config.clone(),
            Arc::clone(&store),
        ));
        Self {
            client,
            config,
            store,
            refresher,
        }
    }

    /// The service configuration this pipeline dispatches against.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The underlying reqwest client (shared with the coordinator).
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Execute a GET request through both pipeline stages.
    pub async fn get(&self, path: &str) -> AuthResult<Response> {
        self.execute(Method::GET, path, Option::<&()>::None).await
    }

    /// Execute a POST request with a JSON body through both pipeline stages.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AuthResult<Response> {
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> AuthResult<Response> {
        let url = self.config.url(path);
        // Explicit per-dispatch retry context; never a flag mutated on a
        // shared request object.
        let mut retried = false;
        let mut bearer = self.stored_access().await?;

        loop {
            let response = self
                .send_once(method.clone(), &url, body, bearer.as_deref())
                .await?;

            if response.status() != StatusCode::UNAUTHORIZED || retried {
                return Ok(response);
            }

            retried = true;
            match self.refresher.acquire().await {
                Ok(access) => {
                    debug!(url = %url, "retrying request with renewed access credential");
                    bearer = Some(access);
                }
                Err(err) => {
                    warn!(error = %err, "credential refresh failed; clearing stored session");
                    self.store.clear().await?;
                    // The caller sees the original authorization failure,
                    // not the refresh error.
                    return Err(AuthError::Unauthorized);
                }
            }
        }
    }

    async fn stored_access(&self) -> AuthResult<Option<String>> {
        Ok(self.store.get().await?.map(|pair| pair.access))
    }

    async fn send_once<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> AuthResult<Response> {
        debug!(
            method = %method,
            url = %url,
            authenticated = bearer.is_some(),
            "dispatching request"
        );

        let mut request = self.client.request(method, url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().await.map_err(map_transport_error)
    }
}

fn map_transport_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::network("request timed out")
    } else if err.is_connect() {
        AuthError::network(format!("connection failed: {err}"))
    } else {
        AuthError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{ME_PATH, REFRESH_PATH};
    use serde_json::json;
    use std::time::Duration;
    use waggle_core::{CredentialPair, MemoryCredentialStore};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store_with(access: &str, refresh: &str) -> SharedStore {
        let store: SharedStore = Arc::new(MemoryCredentialStore::new());
        store
            .set(&CredentialPair::new(access, refresh))
            .await
            .unwrap();
        store
    }

    fn pipeline(server: &MockServer, store: SharedStore) -> AuthHttpClient {
        AuthHttpClient::new(ServiceConfig::new(server.uri()), store)
    }

    #[tokio::test]
    async fn attaches_stored_access_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .and(header("authorization", "Bearer stored-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with("stored-access", "stored-refresh").await;
        let response = pipeline(&server, store).get(ME_PATH).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn proceeds_unauthenticated_without_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store: SharedStore = Arc::new(MemoryCredentialStore::new());
        let err = pipeline(&server, Arc::clone(&store))
            .get(ME_PATH)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let requests = server.received_requests().await.unwrap();
        let me_request = requests
            .iter()
            .find(|r| r.url.path() == ME_PATH)
            .expect("request was dispatched");
        assert!(!me_request.headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn recovers_from_expiry_with_one_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .and(header("authorization", "Bearer stale-access"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .and(header("authorization", "Bearer fresh-access"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"id": 1, "email": "a@b.com", "role": "USER"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"access_token": "fresh-access", "refresh_token": "fresh-refresh"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with("stale-access", "stale-refresh").await;
        let response = pipeline(&server, Arc::clone(&store))
            .get(ME_PATH)
            .await
            .unwrap();

        // The caller sees the retried response, not the original 401.
        assert_eq!(response.status(), StatusCode::OK);
        let pair = store.get().await.unwrap().unwrap();
        assert_eq!(pair.access, "fresh-access");
        assert_eq!(pair.refresh, "fresh-refresh");
    }

    #[tokio::test]
    async fn concurrent_expired_requests_refresh_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .and(header("authorization", "Bearer stale-access"))
            .respond_with(ResponseTemplate::new(401))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .and(header("authorization", "Bearer fresh-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": null})))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(50))
                    .set_body_json(json!({
                        "data": {"access_token": "fresh-access", "refresh_token": "fresh-refresh"}
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with("stale-access", "stale-refresh").await;
        let client = pipeline(&server, store);

        let (a, b, c) = tokio::join!(client.get(ME_PATH), client.get(ME_PATH), client.get(ME_PATH));
        assert_eq!(a.unwrap().status(), StatusCode::OK);
        assert_eq!(b.unwrap().status(), StatusCode::OK);
        assert_eq!(c.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn second_authorization_failure_propagates_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"access_token": "fresh-access", "refresh_token": "fresh-refresh"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with("stale-access", "stale-refresh").await;
        let response = pipeline(&server, store).get(ME_PATH).await.unwrap();

        // Retried once, still 401: no third attempt, status surfaces as-is.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_failure_clears_store_and_surfaces_the_original_401() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ME_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "about:blank",
                "title": "Unauthorized",
                "status": 401,
                "detail": "refresh token expired"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_with("stale-access", "stale-refresh").await;
        let err = pipeline(&server, Arc::clone(&store))
            .get(ME_PATH)
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(store.get().await.unwrap(), None);
    }
}
