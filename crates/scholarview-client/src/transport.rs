//! Transport seam between the controller and the backend

use std::future::Future;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use scholarview_core::AcquisitionResult;

use crate::error::ClientError;
use crate::wire::{CacheStatus, ServerStatus, StreamEvent, UpdateOutcome};

/// Boxed stream of decoded channel events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, ClientError>> + Send>>;

/// Owner of an open streaming channel.
///
/// The channel is closed exactly once: by [`StreamHandle::close`] or, failing
/// that, on drop. Events are no longer read after closing.
pub struct StreamHandle {
    events: Option<EventStream>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl StreamHandle {
    pub fn new(events: EventStream) -> Self {
        Self {
            events: Some(events),
            on_close: None,
        }
    }

    /// Run `hook` when the channel is closed.
    pub fn with_close_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Next event, or `None` once the channel has ended or been closed.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, ClientError>> {
        match self.events.as_mut() {
            Some(events) => events.next().await,
            None => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_none()
    }

    /// Drop the underlying connection. Idempotent.
    pub fn close(&mut self) {
        let Some(events) = self.events.take() else {
            return;
        };
        drop(events);
        log::debug!("Streaming channel closed");
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Answer to the initial publications request.
#[derive(Debug)]
pub enum Acquisition {
    /// Server answered with a complete (cached) result
    Immediate(AcquisitionResult),
    /// Server redirected to the streaming channel, which is now open
    Streaming(StreamHandle),
}

/// Backend operations used by the controller.
pub trait Transport: Send + Sync {
    /// Lightweight readiness probe
    fn server_status(&self) -> impl Future<Output = Result<ServerStatus, ClientError>> + Send;

    /// Request publications, opening the stream when the server redirects to it
    fn acquire(&self) -> impl Future<Output = Result<Acquisition, ClientError>> + Send;

    /// Ask the backend to recompute and re-cache publications
    fn update(&self) -> impl Future<Output = Result<UpdateOutcome, ClientError>> + Send;

    /// Backend cache metadata
    fn cache_status(&self) -> impl Future<Output = Result<CacheStatus, ClientError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn handle_with_counter(events: Vec<Result<StreamEvent, ClientError>>) -> (StreamHandle, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let counter = closes.clone();
        let handle = StreamHandle::new(Box::pin(futures_util::stream::iter(events)))
            .with_close_hook(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        (handle, closes)
    }

    #[test]
    fn close_is_idempotent() {
        let (mut handle, closes) = handle_with_counter(vec![]);
        handle.close();
        handle.close();
        drop(handle);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_closes() {
        let (handle, closes) = handle_with_counter(vec![]);
        drop(handle);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_handle_yields_nothing() {
        let (mut handle, _) = handle_with_counter(vec![Ok(StreamEvent::Error("x".into()))]);
        handle.close();
        assert!(handle.is_closed());
        assert!(handle.next_event().await.is_none());
    }
}
