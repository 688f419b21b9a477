use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Network-level failure: connection refused, reset, timed out.
    /// Retried per the client's retry strategy.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The shard answered with a non-success status. Deterministic backend
    /// decision, never retried.
    #[error("shard returned HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("{0}")]
    Url(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments.
    #[error("base URL cannot be used as a base")]
    UrlNotABase,

    #[error("{0}")]
    Config(#[from] accessmux_config::Error),
}

impl Error {
    /// Whether a retry could plausibly change the outcome.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(cause) => {
                cause.is_connect() || cause.is_timeout() || cause.is_request()
            }
            _ => false,
        }
    }
}
