//! Trending Scorer
//!
//! Computes a weighted engagement score per candidate and produces a stable
//! descending ranking. The weight defaults are policy constants that callers
//! reproduce for compatibility; alternate values arrive through
//! `DiscoveryConfig` for tests and tuning.

use crate::catalog::{CatalogItem, EngagementSnapshot};

use super::engine::{sort_ranked, ScoredItem};

/// Engagement weights for the trending score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub listens: f64,
    pub likes: f64,
    pub shares: f64,
    pub comments: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        // Contract defaults: listens dominate, likes follow, shares and
        // comments trail equally
        Self {
            listens: 0.5,
            likes: 0.3,
            shares: 0.1,
            comments: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Weighted engagement score. Deterministic and pure: the same snapshot
    /// always produces the same score.
    pub fn score(&self, engagement: &EngagementSnapshot) -> f64 {
        engagement.listens as f64 * self.listens
            + engagement.likes as f64 * self.likes
            + engagement.shares as f64 * self.shares
            + engagement.comments as f64 * self.comments
    }
}

/// Rank candidates by trending score, truncated to the top `n`.
///
/// Trending is a fixed-size leaderboard, not a deep paged listing. Ordering
/// is a total order: score descending, then later `updated_at`, then id
/// ascending, so repeated calls over the same snapshot are byte-identical.
pub fn rank(candidates: Vec<CatalogItem>, weights: &ScoringWeights, n: usize) -> Vec<ScoredItem> {
    let mut scored: Vec<ScoredItem> = candidates
        .into_iter()
        .map(|item| {
            let score = weights.score(&item.engagement());
            ScoredItem { item, score }
        })
        .collect();

    sort_ranked(&mut scored);
    scored.truncate(n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Status;
    use chrono::{Duration, TimeZone, Utc};

    fn item(id: &str, listens: u64, likes: u64, shares: u64, comments: u64) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Show {}", id),
            description: String::new(),
            status: Status::Active,
            genres: vec![],
            languages: vec![],
            listen_count: listens,
            likes,
            shares,
            comment_count: comments,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            host: "host-1".to_string(),
        }
    }

    #[test]
    fn test_weighted_score_contract_values() {
        let weights = ScoringWeights::default();

        // likes=10 alone scores 3.0; listens=20 alone scores 10.0
        let a = item("a", 0, 10, 0, 0);
        let b = item("b", 20, 0, 0, 0);
        assert_eq!(weights.score(&a.engagement()), 3.0);
        assert_eq!(weights.score(&b.engagement()), 10.0);

        let ranked = rank(vec![a, b], &weights, 10);
        assert_eq!(ranked[0].item.id, "b");
        assert_eq!(ranked[1].item.id, "a");
    }

    #[test]
    fn test_score_monotonic_in_each_counter() {
        let weights = ScoringWeights::default();
        let base = weights.score(&item("a", 5, 5, 5, 5).engagement());

        assert!(weights.score(&item("a", 6, 5, 5, 5).engagement()) > base);
        assert!(weights.score(&item("a", 5, 6, 5, 5).engagement()) > base);
        assert!(weights.score(&item("a", 5, 5, 6, 5).engagement()) > base);
        assert!(weights.score(&item("a", 5, 5, 5, 6).engagement()) > base);
    }

    #[test]
    fn test_equal_scores_break_on_recency_then_id() {
        let weights = ScoringWeights::default();

        let mut older = item("a", 10, 0, 0, 0);
        older.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut newer = item("b", 10, 0, 0, 0);
        newer.updated_at = older.updated_at + Duration::hours(1);

        let ranked = rank(vec![older.clone(), newer.clone()], &weights, 10);
        assert_eq!(ranked[0].item.id, "b");

        // identical timestamps: lower id first
        let twin_x = item("x", 10, 0, 0, 0);
        let twin_w = item("w", 10, 0, 0, 0);
        let ranked = rank(vec![twin_x, twin_w], &weights, 10);
        assert_eq!(ranked[0].item.id, "w");
    }

    #[test]
    fn test_rank_truncates_to_leaderboard_size() {
        let weights = ScoringWeights::default();
        let candidates: Vec<CatalogItem> =
            (0..25).map(|i| item(&format!("i{:02}", i), i, 0, 0, 0)).collect();

        let ranked = rank(candidates, &weights, 10);
        assert_eq!(ranked.len(), 10);
        // highest listens first
        assert_eq!(ranked[0].item.id, "i24");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let weights = ScoringWeights::default();
        let candidates: Vec<CatalogItem> =
            (0..10).map(|i| item(&format!("i{}", i), 3, 3, 3, 3)).collect();

        let first = rank(candidates.clone(), &weights, 10);
        let second = rank(candidates, &weights, 10);

        let ids: Vec<&str> = first.iter().map(|s| s.item.id.as_str()).collect();
        let ids2: Vec<&str> = second.iter().map(|s| s.item.id.as_str()).collect();
        assert_eq!(ids, ids2);
    }
}
