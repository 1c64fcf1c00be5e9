use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure outcome of a movie catalog operation.
///
/// Cloneable so that every caller joined onto one coalesced request receives
/// the same outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Movie not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Classify a non-success response from the remote store.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        if status == StatusCode::NOT_FOUND {
            Error::NotFound
        } else if status.is_client_error() {
            Error::Validation(message)
        } else if status.is_server_error() {
            Error::Server {
                status: status.as_u16(),
                message,
            }
        } else {
            Error::Unknown(message)
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Unknown(format!("Invalid response body: {}", err))
        } else if let Some(status) = err.status() {
            Error::from_status(status, "")
        } else {
            Error::Network(err.to_string())
        }
    }
}

/// Prefer the store's `{"error": "..."}` / `{"message": "..."}` payload, fall
/// back to the raw body, then to the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["error", "message"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_string()
    }
}
