use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use elearn_session::SessionStore;
use elearn_types::api::ErrorBody;

use crate::config::ClientConfig;
use crate::error::{ApiError, error_from_body};

/// Session lifecycle signals for whatever owns navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    LoggedIn { username: String },

    LoggedOut,

    /// The backend rejected the token. The session is gone and the front
    /// end should show the login screen.
    SessionExpired,
}

/// Shared request helper for every backend call.
///
/// Cheap to clone; clones share the HTTP connection pool, the session
/// store and the event channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    session: SessionStore,
    events: broadcast::Sender<ClientEvent>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        let (events, _) = broadcast::channel(16);
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url,
                session,
                events,
            }),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.inner.events.send(event);
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.inner.base_url, endpoint)
    }

    /// Start a request against `endpoint` (a path beginning with `/`).
    pub fn builder(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.inner.http.request(method, self.url(endpoint))
    }

    /// Attach the bearer token, send, and apply the response policy.
    ///
    /// Returns the response only when the status is 2xx.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let builder = match self.inner.session.token().map_err(ApiError::storage)? {
            Some(token) => {
                debug!("Sending request with bearer token (length {})", token.len());
                builder.bearer_auth(token)
            }
            None => {
                debug!("Sending request without a token");
                builder
            }
        };

        let response = builder.send().await?;
        self.check(response).await
    }

    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }

        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        let err = error_from_body(status.as_u16(), body);
        debug!("Request failed with {}: {}", status, err);
        Err(err)
    }

    /// Clear the session and tell subscribers to go back to login.
    fn expire_session(&self) {
        warn!("Backend rejected the session token, logging out");
        if let Err(e) = self.inner.session.clear() {
            error!("Failed to clear session after 401: {}", e);
        }
        self.emit(ClientEvent::SessionExpired);
    }

    // -- JSON verbs --

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.execute(self.builder(Method::GET, endpoint)).await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.builder(Method::POST, endpoint).json(body))
            .await?;
        decode(response).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.builder(Method::PUT, endpoint).json(body))
            .await?;
        decode(response).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let response = self.execute(self.builder(Method::DELETE, endpoint)).await?;
        decode(response).await
    }

    /// GET a JSON array. Any other shape is logged and read as empty.
    pub async fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>, ApiError> {
        match self.get::<Value>(endpoint).await? {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map_err(|e| ApiError::MalformedResponse(e.to_string())),
            other => {
                warn!(
                    "Expected a list from {}, got {}; using an empty list",
                    endpoint,
                    json_kind(&other)
                );
                Ok(Vec::new())
            }
        }
    }
}

pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
