use thiserror::Error;

/// Failures raised by the client outside the server's structured error codes.
///
/// `Clone` so a failed library load can be handed to every waiting caller.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ForumError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("crypto error: {0}")]
    Crypto(String),
    #[error("script load failed: {0}")]
    Script(String),
}

impl From<serde_json::Error> for ForumError {
    fn from(e: serde_json::Error) -> Self {
        ForumError::MalformedResponse(e.to_string())
    }
}
