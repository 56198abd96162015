//! JSON bodies exchanged with the profile backend

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

use scholarview_core::model::null_as_default;
use scholarview_core::{AcquisitionResult, ProfileData, ProgressSnapshot};

use crate::error::ClientError;

/// Parse a backend timestamp.
///
/// The backend emits naive ISO-8601 (`2024-03-01T09:30:00.123456`); RFC 3339
/// with an offset is accepted and converted to local time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = s.parse::<NaiveDateTime>() {
        return Some(ts);
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Local).naive_local())
}

/// Unparseable timestamps become `None` instead of failing the whole body.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.as_deref().and_then(|s| {
        let ts = parse_timestamp(s);
        if ts.is_none() {
            log::debug!("Ignoring unparseable timestamp {s:?}");
        }
        ts
    }))
}

/// `GET /status`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerStatus {
    pub ready: Option<bool>,
    pub status: Option<String>,
    pub cache_exists: Option<bool>,
}

impl ServerStatus {
    /// Explicit `ready` wins, then `status == "ready"`; a bare object counts as ready.
    pub fn is_ready(&self) -> bool {
        match (self.ready, self.status.as_deref()) {
            (Some(ready), _) => ready,
            (None, Some(status)) => status == "ready",
            (None, None) => true,
        }
    }
}

/// `GET /publications` when answered synchronously
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicationsBody {
    pub data: Option<ProfileData>,
    pub error: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub from_cache: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_fresh: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<NaiveDateTime>,
}

impl PublicationsBody {
    pub fn into_result(self) -> Result<AcquisitionResult, ClientError> {
        if let Some(error) = self.error {
            return Err(ClientError::ServerReported(error));
        }
        let data = self.data.ok_or_else(|| ClientError::Transport {
            status: None,
            message: "response has neither data nor error".to_string(),
        })?;
        Ok(AcquisitionResult::from_cached(
            data,
            self.from_cache,
            self.is_fresh,
            self.last_updated,
        ))
    }
}

/// One decoded event from the streaming channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Progress(ProgressSnapshot),
    Error(String),
    Done(ProfileData),
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(default)]
    progress: Option<ProgressSnapshot>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    done: bool,
    #[serde(default)]
    data: Option<ProfileData>,
}

impl StreamEvent {
    /// Decode the `data:` payload of one SSE event.
    ///
    /// Precedence is `error`, then `progress`, then `done`. Anything else is malformed.
    pub fn parse(payload: &str) -> Result<Self, ClientError> {
        let raw: RawEvent = serde_json::from_str(payload)
            .map_err(|e| ClientError::Stream(format!("malformed stream event: {e}")))?;

        if let Some(error) = raw.error {
            return Ok(Self::Error(error));
        }
        if let Some(progress) = raw.progress {
            return Ok(Self::Progress(progress));
        }
        if raw.done {
            return raw
                .data
                .map(Self::Done)
                .ok_or_else(|| ClientError::Stream("done event without data".to_string()));
        }
        Err(ClientError::Stream(format!(
            "unrecognized stream event: {payload}"
        )))
    }
}

/// `POST /publications/update`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateBody {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    pub message: Option<String>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<NaiveDateTime>,
    pub data: Option<ProfileData>,
}

/// Successful manual refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub last_updated: Option<NaiveDateTime>,
    pub data: Option<ProfileData>,
}

impl UpdateBody {
    pub fn into_outcome(self) -> Result<UpdateOutcome, ClientError> {
        if !self.success {
            return Err(ClientError::UpdateFailure(
                self.message
                    .unwrap_or_else(|| "Failed to update publications".to_string()),
            ));
        }
        Ok(UpdateOutcome {
            last_updated: self.last_updated,
            data: self.data,
        })
    }
}

/// `GET /publications/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub has_cache: bool,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<NaiveDateTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_fresh: bool,
}

/// Cache status body, which may instead carry `{error}`
#[derive(Debug, Deserialize)]
pub(crate) struct CacheStatusBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub status: CacheStatus,
}

impl CacheStatusBody {
    pub fn into_status(self) -> Result<CacheStatus, ClientError> {
        match self.error {
            Some(error) => Err(ClientError::ServerReported(error)),
            None => Ok(self.status),
        }
    }
}
