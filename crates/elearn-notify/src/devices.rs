use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use elearn_client::ApiClient;
use elearn_types::api::{DeviceTokenRequest, DeviceTokenResponse};

pub const FCM_TOKEN_KEY: &str = "fcm_token";
pub const REGISTERED_AT_KEY: &str = "fcm_token_registered_at";

/// Keeps the backend informed of this device's push token.
///
/// The token is cached in the durable store so it survives restarts and
/// logouts. Registration needs a logged-in session; without one it is
/// skipped and retried on the next sync. Failures are logged, never
/// returned: a missing push registration must not break the caller.
#[derive(Clone)]
pub struct DeviceTokens {
    client: ApiClient,
}

impl DeviceTokens {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn cached_token(&self) -> anyhow::Result<Option<String>> {
        self.client.session().get(FCM_TOKEN_KEY)
    }

    /// When the backend last accepted the cached token.
    pub fn registered_at(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        match self.client.session().get(REGISTERED_AT_KEY)? {
            Some(raw) => Ok(Some(DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc))),
            None => Ok(None),
        }
    }

    /// Send `token` to the backend. Returns whether it was accepted.
    pub async fn register(&self, token: &str) -> bool {
        match self.client.session().is_authenticated() {
            Ok(true) => {}
            Ok(false) => {
                debug!("No session, skipping push token registration");
                return false;
            }
            Err(e) => {
                error!("Cannot read session for push token registration: {}", e);
                return false;
            }
        }

        debug!("Registering push token (length {})", token.len());
        let request = DeviceTokenRequest {
            fcm_token: token.to_string(),
        };
        let resp: DeviceTokenResponse = match self.client.post("/notifications/token", &request).await {
            Ok(resp) => resp,
            Err(e) => {
                error!("Failed to register push token: {}", e);
                return false;
            }
        };

        info!(
            "Push token registered (device {:?}, push active: {}): {}",
            resp.id_device, resp.firebase_active, resp.message
        );
        if let Err(e) = self
            .client
            .session()
            .set(REGISTERED_AT_KEY, &Utc::now().to_rfc3339(), true)
        {
            error!("Failed to record push token registration time: {}", e);
        }
        true
    }

    /// The push provider issued a new token.
    pub async fn on_token_refresh(&self, token: &str) -> bool {
        self.cache(token);
        self.register(token).await
    }

    /// Register the cached token, falling back to `fresh` when nothing is
    /// cached yet. Call after login.
    pub async fn sync_with_backend(&self, fresh: Option<&str>) -> bool {
        let cached = match self.cached_token() {
            Ok(cached) => cached,
            Err(e) => {
                error!("Cannot read cached push token: {}", e);
                None
            }
        };

        if let Some(token) = cached {
            return self.register(&token).await;
        }

        match fresh {
            Some(token) if !token.trim().is_empty() => {
                self.cache(token);
                self.register(token).await
            }
            _ => {
                debug!("No push token available to sync");
                false
            }
        }
    }

    fn cache(&self, token: &str) {
        if let Err(e) = self.client.session().set(FCM_TOKEN_KEY, token, true) {
            error!("Failed to cache push token: {}", e);
        }
    }
}
