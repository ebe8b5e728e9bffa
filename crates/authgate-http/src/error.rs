/// Boxed error from a transport or token source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors a transport implementation can report.
///
/// Transports may use their own error type instead; this one covers the
/// common cases.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),

    /// No response arrived in time.
    #[error("request timed out")]
    Timeout,

    /// Reading or writing the request failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`AuthorizedClient`](crate::AuthorizedClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request needs a credential and nobody is signed in.
    #[error("not signed in")]
    NotAuthenticated,

    /// The server rejected the credential (HTTP 401).
    #[error("credential rejected by the server")]
    Unauthorized,

    /// Any other non-success status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The access token could not be obtained.
    #[error("could not obtain an access token: {0}")]
    Token(#[source] BoxError),

    /// A JSON body could not be encoded or decoded.
    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
