/// E-Learn API client.
///
/// Provides:
/// - `ApiClient`: bearer-authenticated JSON requests with the shared
///   401 / 422 / error-body policy
/// - Login and logout on top of `SessionStore`
/// - Informasi (announcement), materi and jadwal endpoints, multipart upload
/// - `Poller`: fixed-cadence refresh that always runs the latest task

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod informasi;
pub mod jadwal;
pub mod materi;
pub mod polling;
pub mod upload;

pub use auth::LoginEndpoint;
pub use client::{ApiClient, ClientEvent};
pub use config::ClientConfig;
pub use error::ApiError;
pub use polling::{DEFAULT_INTERVAL, OverlapPolicy, Poller};
