//! Collaborator interfaces consumed by the discovery engine
//!
//! The engine never touches persistence directly: it reads catalog items
//! through [`CatalogStore`] and user signals through [`UserProfileProvider`].
//! Two backends implement the pair — PostgreSQL for production and an
//! in-memory store for tests and local development.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::catalog::CatalogItem;
use crate::discovery::filter::QueryFilter;
use crate::discovery::signals::UserSignals;
use crate::error::Result;

pub use memory::{MemoryCatalog, MemoryProfiles};
pub use postgres::{PostgresCatalog, PostgresProfiles};

/// Read access to the item catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Execute the compiled predicate, returning one page of matches plus
    /// the total match count before pagination.
    ///
    /// Implementations must return items ordered by `updated_at` descending
    /// then id ascending; the contract keeps search pagination and the
    /// matcher's recency fallback deterministic across backends.
    async fn find(
        &self,
        filter: &QueryFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<CatalogItem>, u64)>;
}

/// Read access to per-user ranking signals.
#[async_trait]
pub trait UserProfileProvider: Send + Sync {
    /// Resolve a user's signals, or `Error::UserNotFound` for unknown users.
    async fn signals(&self, user_id: &str) -> Result<UserSignals>;
}
