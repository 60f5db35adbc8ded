//! User Signals and Criteria Aggregation
//!
//! Collects a user's ranking signals (interests, favorite item ids, search
//! history) into one de-duplicated criteria set for a single recommendation
//! query. Signals are a read-only view resolved by the profile collaborator;
//! nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-user ranking signals, resolved once per request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSignals {
    /// Interest tags (genre names, topics)
    pub interests: Vec<String>,
    /// Ids of items the user has favorited
    pub favorites: Vec<String>,
    /// Free-text search terms, most-recent-last
    pub search_history: Vec<String>,
}

impl UserSignals {
    /// True when the user carries no signal of any kind
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty() && self.favorites.is_empty() && self.search_history.is_empty()
    }

    /// True when `id` is one of the user's favorite items
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }
}

/// De-duplicated union of a user's signals for one query
///
/// interests ∪ favorites ∪ search-history terms; order is irrelevant, so a
/// sorted set keeps construction deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    terms: BTreeSet<String>,
}

impl CriteriaSet {
    /// Build the criteria set from a user's signals
    pub fn from_signals(signals: &UserSignals) -> Self {
        let terms = signals
            .interests
            .iter()
            .chain(signals.favorites.iter())
            .chain(signals.search_history.iter())
            .cloned()
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Count how many of `candidates` appear in the criteria set
    pub fn overlap_count<'a, I>(&self, candidates: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter(|c| self.terms.contains(*c))
            .count()
    }
}
