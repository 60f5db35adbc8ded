//! Candidate Retriever
//!
//! Executes a compiled predicate against the catalog collaborator and
//! returns a bounded page with total-count metadata. A collaborator failure
//! aborts the whole query as a retrieval error; callers never see a partial
//! result or a silently empty page.

use std::sync::Arc;

use tracing::warn;

use crate::catalog::CatalogItem;
use crate::error::{Error, Result};
use crate::store::CatalogStore;

use super::filter::QueryFilter;

/// One page of candidates plus the match count before pagination
#[derive(Debug, Clone)]
pub struct CandidatePage {
    pub items: Vec<CatalogItem>,
    pub total_items: u64,
    pub page_size: u32,
}

impl CandidatePage {
    /// ceil(total_items / page_size)
    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.page_size.max(1) as u64)
    }
}

/// Pulls candidate pages from the catalog collaborator
#[derive(Clone)]
pub struct CandidateRetriever {
    store: Arc<dyn CatalogStore>,
}

impl CandidateRetriever {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Retrieve the page described by the filter's pagination fields
    pub async fn retrieve(&self, filter: &QueryFilter) -> Result<CandidatePage> {
        let (skip, limit) = filter.skip_limit();

        let (mut items, total_items) = self
            .store
            .find(filter, skip, limit)
            .await
            .map_err(retrieval_error)?;

        // the page never exceeds the requested size, whatever the backend did
        items.truncate(limit as usize);

        Ok(CandidatePage {
            items,
            total_items,
            page_size: filter.page_size,
        })
    }

    /// Retrieve every match for a ranking scan, bounded by `max_candidates`
    pub async fn retrieve_all(
        &self,
        filter: &QueryFilter,
        max_candidates: usize,
    ) -> Result<Vec<CatalogItem>> {
        let (items, total_items) = self
            .store
            .find(filter, 0, max_candidates as u64)
            .await
            .map_err(retrieval_error)?;

        if total_items > items.len() as u64 {
            warn!(
                "ranking scan truncated to {} of {} matching items",
                items.len(),
                total_items
            );
        }

        Ok(items)
    }
}

fn retrieval_error(err: Error) -> Error {
    match err {
        // a user-facing retrieval error stays as-is
        Error::Retrieval { .. } => err,
        other => Error::retrieval_with_source("catalog store query failed", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Status;
    use crate::config::DiscoveryConfig;
    use crate::discovery::filter::RawQueryParams;
    use crate::store::MemoryCatalog;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    struct FailingStore;

    #[async_trait]
    impl CatalogStore for FailingStore {
        async fn find(
            &self,
            _filter: &QueryFilter,
            _skip: u64,
            _limit: u64,
        ) -> Result<(Vec<CatalogItem>, u64)> {
            Err(Error::database("connection refused"))
        }
    }

    fn item(id: &str, days_ago: i64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Show {}", id),
            description: String::new(),
            status: Status::Active,
            genres: vec![],
            languages: vec![],
            listen_count: 0,
            likes: 0,
            shares: 0,
            comment_count: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
                - Duration::days(days_ago),
            host: "host-1".to_string(),
        }
    }

    fn filter(page: i64, limit: i64) -> QueryFilter {
        QueryFilter::compile(
            &RawQueryParams {
                page: Some(page),
                limit: Some(limit),
                ..Default::default()
            },
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap(),
            &DiscoveryConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_page_length_bounded_and_total_pages_ceil() {
        let store = Arc::new(MemoryCatalog::with_items(
            (0..7).map(|i| item(&format!("i{}", i), i)).collect(),
        ));
        let retriever = CandidateRetriever::new(store);

        let page = retriever.retrieve(&filter(1, 3)).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_items, 7);
        assert_eq!(page.total_pages(), 3);

        // last page is the remainder
        let page = retriever.retrieve(&filter(3, 3)).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty_with_metadata() {
        let store = Arc::new(MemoryCatalog::with_items(vec![item("a", 0)]));
        let retriever = CandidateRetriever::new(store);

        let page = retriever.retrieve(&filter(5, 10)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 1);
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_store_failure_surfaces_as_retrieval_error() {
        tokio_test::block_on(async {
            let retriever = CandidateRetriever::new(Arc::new(FailingStore));

            let err = retriever.retrieve(&filter(1, 10)).await.unwrap_err();
            assert!(matches!(err, Error::Retrieval { .. }));

            let err = retriever
                .retrieve_all(&filter(1, 10), 100)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Retrieval { .. }));
        });
    }

    #[tokio::test]
    async fn test_retrieve_all_respects_candidate_cap() {
        let store = Arc::new(MemoryCatalog::with_items(
            (0..20).map(|i| item(&format!("i{:02}", i), i)).collect(),
        ));
        let retriever = CandidateRetriever::new(store);

        let items = retriever.retrieve_all(&filter(1, 10), 5).await.unwrap();
        assert_eq!(items.len(), 5);
    }
}
