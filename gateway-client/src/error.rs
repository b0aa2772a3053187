//! Error types for the gateway client.

use sourcechat_common::UnknownFamily;

/// Everything a gateway call can fail with.
///
/// `AuthExpired` has already been handled by the client (session cleared,
/// expiry signalled) by the time a caller sees it; callers only need to stop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Session expired, please log in again")]
    AuthExpired,

    /// The backend answered with a non-success status.
    #[error("{0}")]
    Request(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Whether this error ended the session.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Error::AuthExpired)
    }
}

impl From<UnknownFamily> for Error {
    fn from(e: UnknownFamily) -> Self {
        Error::Routing(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
