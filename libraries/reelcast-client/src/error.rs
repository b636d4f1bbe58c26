//! Error types for the Reelcast client.

use thiserror::Error;

/// Low-level transport failure: a connection fault, a local IO fault, or
/// an HTTP response with a status outside `[200, 400)`.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Server answered with a status outside the accepted range
    #[error("HTTP response code={code}, body={body}")]
    Status {
        /// The HTTP status code
        code: u16,
        /// The response body text
        body: String,
    },

    /// Connection-level failure (DNS, connect, TLS, timeout)
    #[error("connection failed: {0}")]
    Connection(String),

    /// Local file IO failed during an upload or download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The HTTP status code, when the server produced one.
    pub fn code(&self) -> Option<u16> {
        match self {
            TransportError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Connection(err.to_string())
    }
}

/// Errors surfaced by [`crate::MediaClient`] operations.
///
/// Resource-family APIs remap these into their own error types, keeping
/// the authentication-vs-generic distinction intact across layers.
#[derive(Error, Debug)]
pub enum MediaError {
    /// A call failed for a reason other than authentication
    #[error("Server returned code {} and message {message}", display_code(.code))]
    Service {
        /// The HTTP status code, if the failure produced one
        code: Option<u16>,
        /// The underlying failure description
        message: String,
    },

    /// Fetching a fresh authentication signature failed, or the server
    /// handed back a signature that fails validation
    #[error("authentication failed: {message}")]
    AuthenticationFailed {
        /// The HTTP status code, if the failure produced one
        code: Option<u16>,
        /// The underlying failure description
        message: String,
    },

    /// Invalid caller input, detected before any network call
    #[error("{0}")]
    Validation(String),

    /// Failed to decode a server response
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl MediaError {
    /// Maps a transport failure into the generic service error.
    pub(crate) fn service_from(err: TransportError) -> Self {
        MediaError::Service {
            code: err.code(),
            message: err.to_string(),
        }
    }

    /// Maps a transport failure during a signature fetch into the
    /// distinguished authentication error.
    pub(crate) fn auth_failed_from(err: TransportError) -> Self {
        MediaError::AuthenticationFailed {
            code: err.code(),
            message: err.to_string(),
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn code(&self) -> Option<u16> {
        match self {
            MediaError::Service { code, .. } | MediaError::AuthenticationFailed { code, .. } => {
                *code
            }
            _ => None,
        }
    }
}

fn display_code(code: &Option<u16>) -> String {
    code.map(|c| c.to_string()).unwrap_or_default()
}

/// Result type for media client operations.
pub type Result<T> = std::result::Result<T, MediaError>;
