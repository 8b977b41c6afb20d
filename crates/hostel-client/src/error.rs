use thiserror::Error;

/// Everything here is recoverable at the caller's level: the user may
/// retry the action. There is no fatal path in this layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing or rejected credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A file transfer failed (non-2xx response or network error).
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// An operation was attempted against a form in a state that
    /// forbids it, e.g. editing files on an approved form.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Client-side validation rejected the request before any network
    /// call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend answered with a non-2xx status. The message is the
    /// raw response body.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store error: {0}")]
    Session(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
