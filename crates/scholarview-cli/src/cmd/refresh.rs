//! `scholarview refresh` - ask the backend to recompute, then reload

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use scholarview_client::{AcquisitionController, ClientError, Transport};
use scholarview_core::ProgressContext;

use super::{interrupted, show, with_progress};

/// Load the current data first so a failed update can still report it.
pub async fn run<T: Transport>(
    ctl: &AcquisitionController<T>,
    progress: &ProgressContext,
    cancel: &CancellationToken,
) -> Result<()> {
    let before = interrupted(with_progress(ctl, progress, ctl.run(cancel)).await)?;
    progress.println(format!("Current: {}", show::summary(&before)));

    match with_progress(ctl, progress, ctl.refresh(cancel)).await {
        Ok(outcome) => {
            println!("Refreshed: {}", show::summary(&outcome.result));
            Ok(())
        }
        Err(ClientError::UpdateFailure(message)) => {
            // Nothing was replaced; the data loaded above is still current
            if let Some(current) = ctl.current() {
                println!("Still showing: {}", show::summary(&current));
            }
            anyhow::bail!("{message}")
        }
        Err(e) => interrupted(Err(e)),
    }
}
