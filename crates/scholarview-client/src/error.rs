//! Error taxonomy for acquisition, streaming and refresh

/// Failure of a client operation.
///
/// Only readiness failures are retried internally; every other variant is
/// terminal for the cycle that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Readiness polling gave up after a bounded number of attempts
    ReadinessTimeout { attempts: u32 },
    /// Network failure or unparseable response
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// Backend answered with an `{error}` body
    ServerReported(String),
    /// Error event, malformed event, or premature end of the streaming channel
    Stream(String),
    /// Manual refresh failed; prior data is preserved
    UpdateFailure(String),
    /// Caller cancelled the cycle
    Cancelled,
    /// Another acquisition cycle is still running
    CycleInFlight,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadinessTimeout { attempts } => {
                write!(f, "server not ready after {attempts} attempts")
            }
            Self::Transport {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Transport {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::ServerReported(msg) => f.write_str(msg),
            Self::Stream(msg) => f.write_str(msg),
            Self::UpdateFailure(msg) => f.write_str(msg),
            Self::Cancelled => f.write_str("cancelled"),
            Self::CycleInFlight => f.write_str("an acquisition is already in progress"),
        }
    }
}

impl std::error::Error for ClientError {}

impl ClientError {
    /// Create transport error from reqwest error, without the request URL
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        Self::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.without_url().to_string(),
        }
    }

    /// Response body could not be decoded
    pub fn decode(e: &serde_json::Error) -> Self {
        Self::Transport {
            status: None,
            message: format!("invalid response body: {e}"),
        }
    }

    /// Whether the readiness poller should try again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ServerReported(_))
    }
}
