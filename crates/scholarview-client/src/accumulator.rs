//! Progress accumulation over a streaming channel

use tokio_util::sync::CancellationToken;

use scholarview_core::{AcquisitionResult, ProgressSnapshot};

use crate::error::ClientError;
use crate::transport::StreamHandle;
use crate::wire::StreamEvent;

/// Consumes one acquisition cycle's event stream.
///
/// Progress snapshots go to the observer in arrival order; `current` never
/// decreases (regressions are dropped). The first `error` or `done` ends
/// consumption and the channel is closed on every exit path.
#[derive(Debug, Default)]
pub struct ProgressAccumulator {
    latest: ProgressSnapshot,
    delivered: usize,
}

impl ProgressAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent snapshot delivered to the observer
    pub fn latest(&self) -> &ProgressSnapshot {
        &self.latest
    }

    /// Number of progress callbacks made so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Read events until a terminal event, a channel failure, or cancellation.
    ///
    /// The observer must not block; it runs inline on the reading task.
    pub async fn consume(
        &mut self,
        handle: &mut StreamHandle,
        cancel: &CancellationToken,
        mut observer: impl FnMut(&ProgressSnapshot),
    ) -> Result<AcquisitionResult, ClientError> {
        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break Err(ClientError::Cancelled),
                next = handle.next_event() => next,
            };
            match next {
                None => {
                    break Err(ClientError::Stream(
                        "stream ended before completion".to_string(),
                    ));
                }
                Some(Err(e)) => break Err(e),
                Some(Ok(StreamEvent::Progress(snapshot))) => {
                    if snapshot.current < self.latest.current {
                        log::debug!(
                            "Dropping out-of-order progress {} < {}",
                            snapshot.current,
                            self.latest.current
                        );
                        continue;
                    }
                    self.latest = snapshot;
                    self.delivered += 1;
                    observer(&self.latest);
                }
                Some(Ok(StreamEvent::Error(message))) => break Err(ClientError::Stream(message)),
                Some(Ok(StreamEvent::Done(data))) => break Ok(AcquisitionResult::from_stream(data)),
            }
        };
        handle.close();
        outcome
    }
}
