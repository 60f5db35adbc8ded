//! In-memory store backend
//!
//! Backs the collaborator traits with plain vectors for unit/integration
//! tests and local development. Honors the same ordering contract as the
//! PostgreSQL backend.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::catalog::CatalogItem;
use crate::discovery::filter::QueryFilter;
use crate::discovery::signals::UserSignals;
use crate::error::{Error, Result};

use super::{CatalogStore, UserProfileProvider};

/// In-memory catalog
#[derive(Default)]
pub struct MemoryCatalog {
    items: RwLock<Vec<CatalogItem>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn insert(&self, item: CatalogItem) {
        self.items
            .write()
            .expect("catalog lock poisoned")
            .push(item);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find(
        &self,
        filter: &QueryFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<CatalogItem>, u64)> {
        let items = self.items.read().expect("catalog lock poisoned");

        let mut matches: Vec<CatalogItem> = items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();

        // ordering contract: updated_at descending, id ascending
        matches.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matches.len() as u64;
        let page: Vec<CatalogItem> = matches
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();

        Ok((page, total))
    }
}

/// In-memory user profile provider
#[derive(Default)]
pub struct MemoryProfiles {
    profiles: RwLock<HashMap<String, UserSignals>>,
}

impl MemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: impl Into<String>, signals: UserSignals) {
        self.profiles
            .write()
            .expect("profile lock poisoned")
            .insert(user_id.into(), signals);
    }
}

#[async_trait]
impl UserProfileProvider for MemoryProfiles {
    async fn signals(&self, user_id: &str) -> Result<UserSignals> {
        self.profiles
            .read()
            .expect("profile lock poisoned")
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::user_not_found(user_id))
    }
}
