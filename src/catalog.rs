//! Catalog domain types
//!
//! Items live in an external document store; the engine only ever reads
//! them. Engagement counters are owned by the like/listen/share operations
//! of that store and are non-negative by construction here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status of a catalog item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    /// Parse a caller-supplied status string, `None` for anything unknown
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Some(Status::Active),
            "inactive" => Some(Status::Inactive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A show in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub genres: Vec<String>,
    pub languages: Vec<String>,
    pub listen_count: u64,
    pub likes: u64,
    pub shares: u64,
    pub comment_count: u64,
    pub updated_at: DateTime<Utc>,
    /// Owning host reference (opaque user id)
    pub host: String,
}

impl CatalogItem {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Capture the counters needed for scoring at query time
    pub fn engagement(&self) -> EngagementSnapshot {
        EngagementSnapshot {
            listens: self.listen_count,
            likes: self.likes,
            shares: self.shares,
            comments: self.comment_count,
        }
    }
}

/// Read-only view of an item's engagement counters, captured once per query
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub listens: u64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("active"), Some(Status::Active));
        assert_eq!(Status::parse("INACTIVE"), Some(Status::Inactive));
        assert_eq!(Status::parse("archived"), None);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "\"active\"");
        assert_eq!(
            serde_json::to_string(&Status::Inactive).unwrap(),
            "\"inactive\""
        );
    }
}
