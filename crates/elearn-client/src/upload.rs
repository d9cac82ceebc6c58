use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ApiClient, decode};
use crate::error::ApiError;

impl ApiClient {
    /// Send a multipart form.
    ///
    /// No `Content-Type` is set here: reqwest writes
    /// `multipart/form-data; boundary=...` itself, and a hand-set header
    /// would lose the boundary.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
        method: Method,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(self.builder(method, endpoint).multipart(form))
            .await?;
        decode(response).await
    }

    /// Upload one file from disk under form field `field`.
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        field: &str,
        path: &Path,
    ) -> Result<T, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::File(format!("Cannot read {}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        debug!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), endpoint);

        let mut part = Part::bytes(bytes).file_name(file_name);
        if let Some(mime) = guess_mime(path) {
            part = part.mime_str(mime)?;
        }

        let form = Form::new().part(field.to_string(), part);
        self.upload(endpoint, form, Method::POST).await
    }
}

/// Content type for the image formats the backend accepts.
fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}
