//! Small display helpers shared by front-ends

use chrono::NaiveDateTime;

use crate::model::{AcquisitionResult, ProgressSnapshot};

const SCHOLAR_CITES_URL: &str = "https://scholar.google.com/scholar?cites=";

/// Google Scholar "cited by" search for a title.
pub fn citation_search_url(title: &str) -> String {
    format!("{SCHOLAR_CITES_URL}{}", urlencoding::encode(title))
}

/// Where the displayed data came from and how old it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBanner {
    pub from_cache: bool,
    pub is_fresh: bool,
    pub last_updated: Option<NaiveDateTime>,
}

impl CacheBanner {
    pub fn of(result: &AcquisitionResult) -> Self {
        Self {
            from_cache: result.from_cache,
            is_fresh: result.is_fresh,
            last_updated: result.last_updated,
        }
    }
}

impl std::fmt::Display for CacheBanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.from_cache {
            let freshness = if self.is_fresh { "fresh" } else { "stale" };
            write!(f, "Using cached data ({freshness})")?;
        } else {
            f.write_str("Live data")?;
        }
        if let Some(ts) = self.last_updated {
            write!(f, ", last updated {}", ts.format("%Y-%m-%d %H:%M"))?;
        }
        Ok(())
    }
}

/// `"{current}/{total}: {latest}"`, or just the item while the total is unknown.
pub fn progress_message(snapshot: &ProgressSnapshot) -> String {
    if snapshot.total == 0 {
        return snapshot.latest_item.clone();
    }
    format!(
        "{}/{}: {}",
        snapshot.current, snapshot.total, snapshot.latest_item
    )
}

/// Format number with thousand separators.
pub fn fmt_num(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
