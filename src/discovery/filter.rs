//! Filter Compiler
//!
//! Translates raw caller-supplied query parameters into a normalized
//! `QueryFilter`. Compilation is total: malformed pagination clamps to
//! defaults instead of failing, and unknown enum values fall back to their
//! neutral variant. The compiled filter carries the pure predicate used by
//! in-process catalog backends and a cutoff timestamp computed once per
//! request so pagination stays stable within it.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogItem, Status};
use crate::config::DiscoveryConfig;

/// Time window for engagement-based queries
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrame {
    Daily,
    Weekly,
    Monthly,
    #[default]
    All,
}

impl TimeFrame {
    /// Parse a caller-supplied value; anything unknown means no lower bound
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "daily" => TimeFrame::Daily,
            "weekly" => TimeFrame::Weekly,
            "monthly" => TimeFrame::Monthly,
            "all" => TimeFrame::All,
            other => {
                debug!("unknown time frame {:?}, defaulting to all", other);
                TimeFrame::All
            }
        }
    }

    /// Earliest admissible `updated_at` for this window, anchored at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeFrame::Daily => now - Duration::days(1),
            TimeFrame::Weekly => now - Duration::days(7),
            TimeFrame::Monthly => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            TimeFrame::All => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Raw query parameters as they arrive from the routing layer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQueryParams {
    /// Free-text query matched against title and description
    pub query: Option<String>,
    /// Comma-separated genre list
    pub genre: Option<String>,
    /// Comma-separated language list
    pub language: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub time_frame: Option<String>,
}

/// Normalized predicate description for one catalog query
///
/// An absent dimension matches everything. Provided sets are OR'd internally
/// (any listed genre matches); dimensions AND together.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub text: Option<String>,
    pub genres: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub status: Option<Status>,
    pub page: u32,
    pub page_size: u32,
    pub time_frame: TimeFrame,
    /// Computed once per request from a single "now" reference
    pub cutoff: DateTime<Utc>,
}

impl QueryFilter {
    /// Compile raw parameters into a normalized filter. Never fails.
    pub fn compile(raw: &RawQueryParams, now: DateTime<Utc>, config: &DiscoveryConfig) -> Self {
        let page = match raw.page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            Some(p) => {
                debug!("clamping page {} to 1", p);
                1
            }
            None => 1,
        };

        let page_size = match raw.limit {
            Some(l) if l >= 1 => (l.min(config.max_page_size as i64)) as u32,
            Some(l) => {
                debug!("clamping page size {} to default", l);
                config.default_page_size
            }
            None => config.default_page_size,
        };

        let time_frame = raw
            .time_frame
            .as_deref()
            .map(TimeFrame::parse)
            .unwrap_or_default();

        Self {
            text: raw
                .query
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            genres: parse_list(raw.genre.as_deref()),
            languages: parse_list(raw.language.as_deref()),
            status: raw.status.as_deref().and_then(Status::parse),
            page,
            page_size,
            time_frame,
            cutoff: time_frame.cutoff(now),
        }
    }

    /// Filter for the trending scan: active items inside the window
    pub fn for_trending(raw: &RawQueryParams, now: DateTime<Utc>, config: &DiscoveryConfig) -> Self {
        let time_frame = raw
            .time_frame
            .as_deref()
            .map(TimeFrame::parse)
            .unwrap_or_default();

        Self {
            text: None,
            genres: None,
            languages: None,
            status: Some(Status::Active),
            page: 1,
            page_size: config.default_page_size,
            time_frame,
            cutoff: time_frame.cutoff(now),
        }
    }

    /// Filter for recommendation candidates: all active items
    pub fn for_recommendation(config: &DiscoveryConfig) -> Self {
        Self {
            text: None,
            genres: None,
            languages: None,
            status: Some(Status::Active),
            page: 1,
            page_size: config.default_page_size,
            time_frame: TimeFrame::All,
            cutoff: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Skip/limit pair for the catalog store
    pub fn skip_limit(&self) -> (u64, u64) {
        (
            (self.page as u64 - 1) * self.page_size as u64,
            self.page_size as u64,
        )
    }

    /// The pure predicate this filter describes
    pub fn matches(&self, item: &CatalogItem) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let in_title = item.title.to_lowercase().contains(&needle);
            let in_description = item.description.to_lowercase().contains(&needle);
            if !in_title && !in_description {
                return false;
            }
        }

        if let Some(genres) = &self.genres {
            if !intersects(genres, &item.genres) {
                return false;
            }
        }

        if let Some(languages) = &self.languages {
            if !intersects(languages, &item.languages) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }

        item.updated_at >= self.cutoff
    }
}

/// Parse a comma-separated list into a non-empty set, or None
fn parse_list(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn intersects(wanted: &[String], present: &[String]) -> bool {
    wanted.iter().any(|w| present.iter().any(|p| p == w))
}
