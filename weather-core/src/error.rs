use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`crate::WeatherApiClient`] and its transports.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be completed, or completed with a non-success status.
    /// `status` is `None` when no response was received at all.
    #[error("transport error{}: {message}", fmt_status(.status))]
    Transport {
        status: Option<StatusCode>,
        message: String,
    },

    /// The body was not a JSON array of forecast records.
    #[error("failed to decode forecast response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The request was aborted by a deadline or cancellation signal.
    #[error("request was cancelled before completion")]
    Cancelled,
}

impl ClientError {
    pub fn transport<S: Into<String>>(status: Option<StatusCode>, message: S) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    /// Status code of a completed-but-failed request, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ClientError::Cancelled;
        }
        ClientError::transport(err.status(), err.to_string())
    }
}

impl From<reqwest_middleware::Error> for ClientError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            // The retry middleware wraps the last underlying error once it gives up.
            reqwest_middleware::Error::Middleware(e) => {
                if e.chain().any(is_timeout) {
                    ClientError::Cancelled
                } else {
                    ClientError::transport(None, format!("{e:#}"))
                }
            }
        }
    }
}

fn is_timeout(cause: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
        return e.is_timeout();
    }
    matches!(
        cause.downcast_ref::<reqwest_middleware::Error>(),
        Some(reqwest_middleware::Error::Reqwest(e)) if e.is_timeout()
    )
}

fn fmt_status(status: &Option<StatusCode>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}
