//! Acquisition controller: readiness → acquire → ready/failed.
//!
//! State and progress are published on `tokio::sync::watch` channels so a
//! front-end can render them while the cycle runs. Only one cycle (initial
//! or refresh) may run at a time; overlapping calls fail with
//! [`ClientError::CycleInFlight`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use scholarview_core::{AcquisitionResult, ProgressSnapshot};

use crate::accumulator::ProgressAccumulator;
use crate::error::ClientError;
use crate::readiness::{ReadinessPolicy, wait_until_ready};
use crate::transport::{Acquisition, Transport};
use crate::update::request_update;
use crate::wire::{CacheStatus, UpdateOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    CheckingServer,
    Acquiring,
    Ready(Arc<AcquisitionResult>),
    Failed(String),
}

impl ControllerState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckingServer => "checking",
            Self::Acquiring => "acquiring",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Marks a cycle as running; cleared on drop.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ClientError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::CycleInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Outcome of a successful manual refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub update: UpdateOutcome,
    pub result: Arc<AcquisitionResult>,
}

pub struct AcquisitionController<T> {
    transport: T,
    policy: ReadinessPolicy,
    state: watch::Sender<ControllerState>,
    progress: watch::Sender<ProgressSnapshot>,
    /// Last successful result; only replaced by a later success
    current: watch::Sender<Option<Arc<AcquisitionResult>>>,
    in_flight: AtomicBool,
    #[cfg(test)]
    history: std::sync::Mutex<Vec<&'static str>>,
}

impl<T: Transport> AcquisitionController<T> {
    pub fn new(transport: T, policy: ReadinessPolicy) -> Self {
        Self {
            transport,
            policy,
            state: watch::Sender::new(ControllerState::CheckingServer),
            progress: watch::Sender::new(ProgressSnapshot::reset()),
            current: watch::Sender::new(None),
            in_flight: AtomicBool::new(false),
            #[cfg(test)]
            history: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.borrow().clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress.subscribe()
    }

    /// The current result, if any cycle has succeeded.
    pub fn current(&self) -> Option<Arc<AcquisitionResult>> {
        self.current.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one full acquisition cycle.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<Arc<AcquisitionResult>, ClientError> {
        let _guard = CycleGuard::acquire(&self.in_flight)?;
        self.run_cycle(cancel).await
    }

    /// Ask the backend to refresh, then replace the current result with a new cycle.
    ///
    /// An update failure leaves both the state and the current result untouched.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<RefreshOutcome, ClientError> {
        let _guard = CycleGuard::acquire(&self.in_flight)?;
        let update = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            update = request_update(&self.transport) => update?,
        };
        let result = self.run_cycle(cancel).await?;
        Ok(RefreshOutcome { update, result })
    }

    /// Backend cache metadata; does not touch controller state.
    pub async fn cache_status(&self) -> Result<CacheStatus, ClientError> {
        self.transport.cache_status().await
    }

    async fn run_cycle(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<AcquisitionResult>, ClientError> {
        self.progress.send_replace(ProgressSnapshot::reset());
        self.set_state(ControllerState::CheckingServer);

        let ready = wait_until_ready(&self.transport, &self.policy, cancel, |_, _| {
            self.set_state(ControllerState::CheckingServer);
        })
        .await;
        if let Err(e) = ready {
            return Err(self.fail(e));
        }

        self.set_state(ControllerState::Acquiring);
        let result = match self.acquire(cancel).await {
            Ok(result) => Arc::new(result),
            Err(e) => return Err(self.fail(e)),
        };

        log::info!(
            "Loaded {} publications for {} (cache: {}, fresh: {})",
            result.publications.len(),
            result.author.name,
            result.from_cache,
            result.is_fresh
        );
        self.current.send_replace(Some(result.clone()));
        self.set_state(ControllerState::Ready(result.clone()));
        Ok(result)
    }

    async fn acquire(&self, cancel: &CancellationToken) -> Result<AcquisitionResult, ClientError> {
        let acquisition = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            acquisition = self.transport.acquire() => acquisition?,
        };
        match acquisition {
            Acquisition::Immediate(result) => Ok(result),
            Acquisition::Streaming(mut handle) => {
                let mut accumulator = ProgressAccumulator::new();
                let result = accumulator
                    .consume(&mut handle, cancel, |snapshot| {
                        self.progress.send_replace(snapshot.clone());
                    })
                    .await;
                log::debug!(
                    "Stream finished after {} progress updates (last {}/{})",
                    accumulator.delivered(),
                    accumulator.latest().current,
                    accumulator.latest().total
                );
                result
            }
        }
    }

    fn set_state(&self, state: ControllerState) {
        log::debug!("Controller -> {}", state.name());
        #[cfg(test)]
        self.history.lock().unwrap().push(state.name());
        self.state.send_replace(state);
    }

    fn fail(&self, e: ClientError) -> ClientError {
        log::error!("Acquisition failed: {e}");
        self.set_state(ControllerState::Failed(e.to_string()));
        e
    }
}
