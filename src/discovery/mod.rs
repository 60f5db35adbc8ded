//! Discovery & Ranking Module
//!
//! Turns raw engagement counters and per-user interest signals into ordered
//! candidate lists for the catalog's query modes.
//!
//! ## Architecture
//!
//! 1. **Signals** - Fold a user's interests, favorites, and search history
//!    into one de-duplicated criteria set
//! 2. **Filter** - Compile raw caller parameters into a normalized predicate
//!    with a per-request time cutoff
//! 3. **Retriever** - Execute the predicate against the catalog collaborator
//!    with skip/limit paging and total-count metadata
//! 4. **Trending** - Weighted engagement scoring with a deterministic
//!    descending ranking
//! 5. **Matcher** - Criteria-overlap scoring with a recency fallback when no
//!    signals exist
//! 6. **Engine** - Per-mode orchestration behind one façade
//!
//! ## Query Modes
//!
//! - **search**: filtered, paginated catalog listing (no scores)
//! - **trending**: engagement-weighted top-N over a time window
//! - **related** / **recommended**: signal-matched top-N; `related` gives a
//!   direct favorite-id match double weight, which is the only difference
//!   between the two
//!
//! Every query is an independent, read-only computation: the module holds no
//! state between requests and never writes back to its collaborators.

pub mod engine;
pub mod filter;
pub mod matcher;
pub mod retriever;
pub mod signals;
pub mod trending;

// Re-export the types that are actually used externally
pub use engine::{DiscoveryEngine, DiscoveryResponse, PagedResult, QueryMode, RankedResult, ScoredItem};
pub use filter::{QueryFilter, RawQueryParams, TimeFrame};
pub use signals::{CriteriaSet, UserSignals};
pub use trending::ScoringWeights;
