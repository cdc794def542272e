use miette::Diagnostic;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("request to {url} failed after {attempts} attempt(s)")]
    #[diagnostic(help(
        "Check that the analysis backend is reachable, or run `intake scan` to analyze locally"
    ))]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("authentication expired or was rejected by {url}")]
    #[diagnostic(help(
        "Sign in again and export a fresh token, or run `intake scan` to analyze locally"
    ))]
    Auth { url: String },

    #[error("endpoint not found: {url}")]
    #[diagnostic(help("Check `api.base_url` in intake.toml and the task id"))]
    NotFound { url: String },

    #[error("request to {url} was cancelled")]
    Cancelled { url: String },

    #[error("{url} answered with status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("invalid JSON body from {url}")]
    InvalidBody {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { .. } => Some(401),
            Error::NotFound { .. } => Some(404),
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller should fall back to cached or local results.
    pub fn is_offline(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Auth { .. })
    }
}
