use elearn_types::api::{ErrorBody, ErrorDetail};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401. The session is already cleared by the
    /// time the caller sees this.
    #[error("Session expired")]
    SessionExpired,

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("File error: {0}")]
    File(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn storage(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// Turn a non-2xx, non-401 response into an error.
///
/// A 422 carrying a list of issues becomes one `Validation` string with
/// the issues joined by `; `. Everything else is reported through
/// `detail`, then `message`, then the bare status.
pub fn error_from_body(status: u16, body: ErrorBody) -> ApiError {
    match (status, body.detail) {
        (422, Some(ErrorDetail::Issues(issues))) => {
            let joined = issues
                .iter()
                .map(|issue| issue.describe())
                .collect::<Vec<_>>()
                .join("; ");
            ApiError::Validation(format!("Validation error: {}", joined))
        }
        (422, Some(detail)) => {
            ApiError::Validation(detail.as_text().unwrap_or_default())
        }
        (_, detail) => {
            let message = detail
                .and_then(|d| match d {
                    ErrorDetail::Issues(issues) => Some(
                        issues
                            .iter()
                            .map(|issue| issue.describe())
                            .collect::<Vec<_>>()
                            .join("; "),
                    ),
                    other => other.as_text(),
                })
                .or(body.message)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status));
            ApiError::Http { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> ErrorBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn validation_list_is_joined() {
        let err = error_from_body(
            422,
            body(r#"{"detail":[{"loc":["body","judul"],"msg":"field required"},{"loc":["body","priority"],"msg":"ensure this value is less than or equal to 100"}]}"#),
        );
        assert_eq!(
            err.to_string(),
            "Validation error: body.judul: field required; body.priority: ensure this value is less than or equal to 100"
        );
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn validation_string_is_used_verbatim() {
        let err = error_from_body(422, body(r#"{"detail":"tanggal_selesai harus setelah tanggal_mulai"}"#));
        assert_eq!(err.to_string(), "tanggal_selesai harus setelah tanggal_mulai");
    }

    #[test]
    fn detail_then_message_then_status() {
        let err = error_from_body(400, body(r#"{"detail":"Username sudah digunakan","message":"ignored"}"#));
        assert_eq!(err.to_string(), "Username sudah digunakan");
        assert_eq!(err.status(), Some(400));

        let err = error_from_body(500, body(r#"{"message":"db down"}"#));
        assert_eq!(err.to_string(), "db down");

        let err = error_from_body(404, ErrorBody::default());
        assert_eq!(err.to_string(), "HTTP error! status: 404");
    }

    #[test]
    fn unprocessable_without_detail_is_plain_http_error() {
        let err = error_from_body(422, ErrorBody::default());
        assert!(matches!(err, ApiError::Http { status: 422, .. }));
    }
}
