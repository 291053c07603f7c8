// Error taxonomy shared by the library modules. The binary wraps these in
// `anyhow` with extra context before printing them.

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Caller-supplied data rejected before any request is sent.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The instance could not be reached (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The instance answered but the payload could not be interpreted.
    #[error("unexpected response from instance: {0}")]
    Protocol(String),
    /// The note creation endpoint answered with something other than 200.
    #[error("unexpected status: {status}")]
    Publish { status: StatusCode },
    /// The authorization check was rejected by the instance.
    #[error("authorization failed: {0}")]
    Auth(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was raised before any network use.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
