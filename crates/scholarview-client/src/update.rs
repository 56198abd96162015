//! Manual refresh request

use crate::error::ClientError;
use crate::transport::Transport;
use crate::wire::UpdateOutcome;

/// Ask the backend to recompute publications.
///
/// Any failure (network, decode, or `success: false`) is reported as
/// [`ClientError::UpdateFailure`]. Nothing is applied locally; on success
/// the caller re-runs a full acquisition.
pub async fn request_update<T: Transport>(transport: &T) -> Result<UpdateOutcome, ClientError> {
    match transport.update().await {
        Ok(outcome) => {
            log::info!(
                "Backend refreshed publications{}",
                outcome
                    .last_updated
                    .map(|ts| format!(" at {}", ts.format("%Y-%m-%d %H:%M")))
                    .unwrap_or_default()
            );
            Ok(outcome)
        }
        Err(ClientError::UpdateFailure(message)) => {
            log::warn!("Update failed: {message}");
            Err(ClientError::UpdateFailure(message))
        }
        Err(e) => {
            log::warn!("Update request failed: {e}");
            Err(ClientError::UpdateFailure(format!(
                "Failed to update publications: {e}"
            )))
        }
    }
}
