//! Server readiness polling with a fixed retry delay

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::transport::Transport;

/// Delay between readiness probes
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How long to keep probing an unready server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub retry_delay: Duration,
    /// `None` probes until cancelled
    pub max_attempts: Option<u32>,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

/// Probe the status endpoint until it reports ready.
///
/// Every failure is treated as transient (server still starting): sleeps
/// `retry_delay` and tries again, calling `on_retry` with the failed attempt
/// number. No backoff. Returns the number of attempts made.
pub async fn wait_until_ready<T: Transport>(
    transport: &T,
    policy: &ReadinessPolicy,
    cancel: &CancellationToken,
    mut on_retry: impl FnMut(u32, &ClientError),
) -> Result<u32, ClientError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let probe = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            probe = transport.server_status() => probe,
        };
        let err = match probe {
            Ok(status) if status.is_ready() => {
                log::debug!("Server ready after {attempt} attempt(s)");
                return Ok(attempt);
            }
            Ok(_) => ClientError::ServerReported("server is starting".to_string()),
            Err(e) => e,
        };

        if !err.is_retryable() {
            return Err(err);
        }
        if policy.max_attempts.is_some_and(|max| attempt >= max) {
            log::error!("Server not ready after {attempt} attempts: {err}");
            return Err(ClientError::ReadinessTimeout { attempts: attempt });
        }

        log::debug!(
            "Server not ready (attempt {attempt}): {err}, retrying in {:?}",
            policy.retry_delay
        );
        on_retry(attempt, &err);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            _ = tokio::time::sleep(policy.retry_delay) => {}
        }
    }
}
