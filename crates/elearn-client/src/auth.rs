use tracing::{info, warn};

use elearn_types::Session;
use elearn_types::api::{ErrorBody, LoginRequest, LoginResponse};

use crate::client::{ApiClient, ClientEvent, decode};
use crate::error::ApiError;

const MISSING_CREDENTIALS: &str = "Username dan password harus diisi";
const LOGIN_FAILED: &str = "Login gagal. Periksa username dan password Anda.";

/// Which login route to use. The backend only lets staff through the web
/// route and only students through the mobile one; each answers 403 for
/// the other kind of account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginEndpoint {
    #[default]
    Web,
    Mobile,
}

impl LoginEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Web => "/auth/login",
            Self::Mobile => "/auth/login/mobile",
        }
    }
}

impl ApiClient {
    /// Log in through the web route and persist the session.
    ///
    /// `remember` puts the session in the durable store; otherwise it only
    /// lives as long as the ephemeral one. A rejected password is reported
    /// as an ordinary error and does not go through the 401 logout path,
    /// since there is no session to expire yet.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<Session, ApiError> {
        self.login_via(LoginEndpoint::Web, username, password, remember)
            .await
    }

    /// Student login. The profile additionally carries `id_mahasiswa`,
    /// `nim`, `id_kelas` and `nama_kelas`.
    pub async fn login_mobile(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<Session, ApiError> {
        self.login_via(LoginEndpoint::Mobile, username, password, remember)
            .await
    }

    pub async fn login_via(
        &self,
        endpoint: LoginEndpoint,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<Session, ApiError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ApiError::Validation(MISSING_CREDENTIALS.to_string()));
        }

        let response = self
            .http()
            .post(self.url(endpoint.path()))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            let message = body
                .detail
                .and_then(|d| d.as_text())
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!("Login for {} at {} rejected with {}", username, endpoint.path(), status);
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let login: LoginResponse = decode(response).await?;
        let session = Session::from_login(login);
        self.session()
            .save(&session, remember)
            .map_err(ApiError::storage)?;

        info!(
            "Logged in as {} (role {}, {})",
            session.username,
            session.role,
            if remember { "remembered" } else { "this session only" }
        );
        self.emit(ClientEvent::LoggedIn {
            username: session.username.clone(),
        });
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().clear().map_err(ApiError::storage)?;
        info!("Logged out");
        self.emit(ClientEvent::LoggedOut);
        Ok(())
    }
}
