//! In-memory transport and event builders for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scholarview_core::{
    AcquisitionResult, AuthorStats, ProfileData, ProgressSnapshot, PublicationRecord,
};

use crate::error::ClientError;
use crate::transport::{Acquisition, StreamHandle, Transport};
use crate::wire::{CacheStatus, ServerStatus, StreamEvent, UpdateOutcome};

pub fn ready() -> Result<ServerStatus, ClientError> {
    Ok(ServerStatus {
        status: Some("ready".into()),
        cache_exists: Some(true),
        ..Default::default()
    })
}

pub fn down() -> Result<ServerStatus, ClientError> {
    Err(ClientError::Transport {
        status: None,
        message: "connection refused".into(),
    })
}

pub fn progress(current: u64, total: u64) -> Result<StreamEvent, ClientError> {
    Ok(StreamEvent::Progress(ProgressSnapshot {
        current,
        total,
        latest_item: format!("Paper {current}"),
    }))
}

pub fn profile(n: usize) -> ProfileData {
    ProfileData {
        author: AuthorStats {
            name: "Jane Doe".into(),
            citations: 100,
            h_index: 5,
            i10_index: 3,
        },
        publications: (0..n)
            .map(|i| PublicationRecord {
                title: Some(format!("Paper {i}")),
                citations: i as u64,
                ..Default::default()
            })
            .collect(),
    }
}

pub fn done(n: usize) -> Result<StreamEvent, ClientError> {
    Ok(StreamEvent::Done(profile(n)))
}

pub fn cached(n: usize, is_fresh: bool) -> AcquisitionResult {
    AcquisitionResult::from_cached(profile(n), true, is_fresh, None)
}

/// Handle over a fixed event list, plus a counter of channel closes.
pub fn scripted_handle(
    events: Vec<Result<StreamEvent, ClientError>>,
) -> (StreamHandle, Arc<AtomicUsize>) {
    let closes = Arc::new(AtomicUsize::new(0));
    let counter = closes.clone();
    let handle = StreamHandle::new(Box::pin(futures_util::stream::iter(events)))
        .with_close_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    (handle, closes)
}

/// What `acquire` answers with.
#[derive(Clone)]
pub enum Script {
    Immediate(AcquisitionResult),
    Stream(Vec<Result<StreamEvent, ClientError>>),
    Fail(ClientError),
}

/// Scripted backend. Status results are consumed in order; once exhausted
/// the server is ready.
pub struct FakeTransport {
    statuses: Mutex<VecDeque<Result<ServerStatus, ClientError>>>,
    script: Mutex<Script>,
    update: Mutex<Result<UpdateOutcome, ClientError>>,
    calls: Mutex<Vec<&'static str>>,
    pub closes: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            script: Mutex::new(Script::Immediate(cached(1, true))),
            update: Mutex::new(Ok(UpdateOutcome {
                last_updated: None,
                data: None,
            })),
            calls: Mutex::new(Vec::new()),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_statuses(self, statuses: Vec<Result<ServerStatus, ClientError>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_script(self, script: Script) -> Self {
        self.set_script(script);
        self
    }

    pub fn with_update(self, update: Result<UpdateOutcome, ClientError>) -> Self {
        *self.update.lock().unwrap() = update;
        self
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Transport for FakeTransport {
    async fn server_status(&self) -> Result<ServerStatus, ClientError> {
        self.record("status");
        self.statuses.lock().unwrap().pop_front().unwrap_or_else(ready)
    }

    async fn acquire(&self) -> Result<Acquisition, ClientError> {
        self.record("acquire");
        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Immediate(result) => Ok(Acquisition::Immediate(result)),
            Script::Stream(events) => {
                let counter = self.closes.clone();
                let handle = StreamHandle::new(Box::pin(futures_util::stream::iter(events)))
                    .with_close_hook(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    });
                Ok(Acquisition::Streaming(handle))
            }
            Script::Fail(e) => Err(e),
        }
    }

    async fn update(&self) -> Result<UpdateOutcome, ClientError> {
        self.record("update");
        self.update.lock().unwrap().clone()
    }

    async fn cache_status(&self) -> Result<CacheStatus, ClientError> {
        self.record("cache_status");
        Ok(CacheStatus::default())
    }
}
