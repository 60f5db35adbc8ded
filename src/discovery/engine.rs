//! Ranking Façade
//!
//! Orchestrates the discovery components per query mode and returns a
//! uniform result envelope. Stateless: every call is an independent,
//! side-effect-free computation — the engine never writes back to the
//! catalog or user profiles, and never retries a failed collaborator call.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::CatalogItem;
use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::store::{CatalogStore, UserProfileProvider};

use super::filter::{QueryFilter, RawQueryParams};
use super::matcher::{self, FavoriteBoost};
use super::retriever::CandidateRetriever;
use super::trending;

/// A candidate with its computed score. Scores are derived per request and
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub score: f64,
}

/// Shared ranking order: score descending, later `updated_at` first, then
/// id ascending. Total, so repeated runs over one snapshot are identical.
pub(crate) fn sort_ranked(scored: &mut [ScoredItem]) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.item.updated_at.cmp(&a.item.updated_at))
            .then_with(|| a.item.id.cmp(&b.item.id))
    });
}

/// Ordered scored items for the ranked query modes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    pub items: Vec<ScoredItem>,
    pub total_items: u64,
    pub total_pages: u64,
}

impl RankedResult {
    /// Leaderboard envelope: everything fits one page by construction
    fn leaderboard(items: Vec<ScoredItem>) -> Self {
        Self {
            total_items: items.len() as u64,
            total_pages: 1,
            items,
        }
    }
}

/// Score-free page for the search mode
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult {
    pub items: Vec<CatalogItem>,
    pub total_items: u64,
    pub total_pages: u64,
    pub page: u32,
}

/// The four query modes the façade dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    Search,
    Trending,
    Related,
    Recommended,
}

/// Uniform response envelope across modes
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DiscoveryResponse {
    Paged(PagedResult),
    Ranked(RankedResult),
}

/// Discovery & ranking engine
///
/// Holds the collaborator handles and per-process configuration; everything
/// else is request-scoped.
#[derive(Clone)]
pub struct DiscoveryEngine {
    retriever: CandidateRetriever,
    profiles: Arc<dyn UserProfileProvider>,
    config: DiscoveryConfig,
}

impl DiscoveryEngine {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        profiles: Arc<dyn UserProfileProvider>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            retriever: CandidateRetriever::new(catalog),
            profiles,
            config,
        }
    }

    /// Dispatch one query. User-scoped modes fail without a user context.
    pub async fn query(
        &self,
        mode: QueryMode,
        raw: &RawQueryParams,
        user_id: Option<&str>,
    ) -> Result<DiscoveryResponse> {
        match mode {
            QueryMode::Search => Ok(DiscoveryResponse::Paged(self.search(raw).await?)),
            QueryMode::Trending => Ok(DiscoveryResponse::Ranked(self.trending(raw).await?)),
            QueryMode::Related => {
                let user_id = user_id.ok_or(Error::UnauthenticatedQuery)?;
                Ok(DiscoveryResponse::Ranked(self.related(user_id).await?))
            }
            QueryMode::Recommended => {
                let user_id = user_id.ok_or(Error::UnauthenticatedQuery)?;
                Ok(DiscoveryResponse::Ranked(self.recommended(user_id).await?))
            }
        }
    }

    /// Filtered, paginated catalog search. No scoring.
    pub async fn search(&self, raw: &RawQueryParams) -> Result<PagedResult> {
        let filter = QueryFilter::compile(raw, Utc::now(), &self.config);
        let page = self.retriever.retrieve(&filter).await?;

        debug!(
            "search returned {} of {} items (page {})",
            page.items.len(),
            page.total_items,
            filter.page
        );

        Ok(PagedResult {
            total_pages: page.total_pages(),
            total_items: page.total_items,
            items: page.items,
            page: filter.page,
        })
    }

    /// Engagement-weighted leaderboard over the requested time window
    pub async fn trending(&self, raw: &RawQueryParams) -> Result<RankedResult> {
        let filter = QueryFilter::for_trending(raw, Utc::now(), &self.config);
        let candidates = self
            .retriever
            .retrieve_all(&filter, self.config.max_candidates)
            .await?;

        let ranked = trending::rank(candidates, &self.config.weights, self.config.top_n);
        debug!(
            "trending ({:?}) ranked {} items",
            filter.time_frame,
            ranked.len()
        );

        Ok(RankedResult::leaderboard(ranked))
    }

    /// Signal-matched items with the favorite-id boost
    pub async fn related(&self, user_id: &str) -> Result<RankedResult> {
        self.match_for_user(user_id, FavoriteBoost::Double).await
    }

    /// Signal-matched items; favorites contribute a single point
    pub async fn recommended(&self, user_id: &str) -> Result<RankedResult> {
        self.match_for_user(user_id, FavoriteBoost::Single).await
    }

    async fn match_for_user(&self, user_id: &str, boost: FavoriteBoost) -> Result<RankedResult> {
        let signals = self.profiles.signals(user_id).await?;

        let filter = QueryFilter::for_recommendation(&self.config);
        let candidates = self
            .retriever
            .retrieve_all(&filter, self.config.max_candidates)
            .await?;

        let ranked = matcher::match_candidates(candidates, &signals, boost, self.config.top_n);
        debug!(
            "matched {} items for user {} ({:?})",
            ranked.len(),
            user_id,
            boost
        );

        Ok(RankedResult::leaderboard(ranked))
    }
}
