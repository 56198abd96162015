//! Wire and domain types for a researcher profile and its publication feed

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat `null` the same as an absent field, falling back to `T::default()`.
///
/// The backend fills records from scraped metadata, so any field may be
/// `null` on the wire (`year`, `citations` in particular).
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let opt: Option<T> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// A single publication as received from the backend. Never mutated after receipt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicationRecord {
    pub title: Option<String>,
    /// Author list as one string (e.g. `"A Smith and B Jones"`)
    pub authors: Option<String>,
    pub venue: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub year: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub citations: u64,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
}

impl PublicationRecord {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Author-level citation metrics, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthorStats {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub citations: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub h_index: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub i10_index: u32,
}

/// `{author, publications}` block shared by the cached, streamed and update payloads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
    pub author: AuthorStats,
    #[serde(deserialize_with = "null_as_default")]
    pub publications: Vec<PublicationRecord>,
}

/// Outcome of one acquisition cycle.
///
/// Replaced wholesale on refresh; consumers hold it behind an `Arc` and
/// treat it as immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionResult {
    pub author: AuthorStats,
    pub publications: Vec<PublicationRecord>,
    pub from_cache: bool,
    pub is_fresh: bool,
    pub last_updated: Option<NaiveDateTime>,
}

impl AcquisitionResult {
    /// Build from a cached (synchronous) response with its metadata.
    pub fn from_cached(
        data: ProfileData,
        from_cache: bool,
        is_fresh: bool,
        last_updated: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            author: data.author,
            publications: data.publications,
            from_cache,
            is_fresh,
            last_updated,
        }
    }

    /// Build from a freshly streamed payload: not cached, fresh, stamped now.
    pub fn from_stream(data: ProfileData) -> Self {
        Self {
            author: data.author,
            publications: data.publications,
            from_cache: false,
            is_fresh: true,
            last_updated: Some(chrono::Local::now().naive_local()),
        }
    }
}

/// Latest progress of a streamed acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub current: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
    /// Title of the item most recently processed by the backend
    #[serde(rename = "latest", deserialize_with = "null_as_default")]
    pub latest_item: String,
}

impl ProgressSnapshot {
    /// The `{0, 0, ""}` snapshot every cycle starts from.
    pub fn reset() -> Self {
        Self::default()
    }
}
