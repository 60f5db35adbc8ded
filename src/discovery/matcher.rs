//! Recommendation Matcher
//!
//! Scores candidates by overlap with a user's criteria set. The `related`
//! and `recommended` query modes share this algorithm; the one behavioral
//! distinction is the weight of a direct favorite-id match. With no signals
//! at all the matcher falls back to recency instead of failing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::CatalogItem;

use super::engine::{sort_ranked, ScoredItem};
use super::signals::{CriteriaSet, UserSignals};

/// Weight of a direct favorite-id match in the overlap score
///
/// In `related` mode a favorite counts double: it seeds the criteria set
/// like any other signal AND carries a direct-id boost. In `recommended`
/// mode it contributes a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteBoost {
    Single,
    Double,
}

impl FavoriteBoost {
    fn points(self) -> usize {
        match self {
            FavoriteBoost::Single => 1,
            FavoriteBoost::Double => 2,
        }
    }
}

/// Score and rank candidates against the user's signals.
///
/// Candidates with no overlap are excluded. Ties break by later
/// `updated_at`, then id ascending. The result is truncated to `n`.
pub fn match_candidates(
    candidates: Vec<CatalogItem>,
    signals: &UserSignals,
    boost: FavoriteBoost,
    n: usize,
) -> Vec<ScoredItem> {
    let criteria = CriteriaSet::from_signals(signals);

    if criteria.is_empty() {
        debug!("no user signals, falling back to recency");
        return recency_fallback(candidates, n);
    }

    let mut scored: Vec<ScoredItem> = candidates
        .into_iter()
        .filter(|item| item.is_active())
        .filter_map(|item| {
            let score = overlap_score(&item, &criteria, boost);
            if score == 0 {
                None
            } else {
                Some(ScoredItem {
                    score: score as f64,
                    item,
                })
            }
        })
        .collect();

    sort_ranked(&mut scored);
    scored.truncate(n);
    scored
}

/// Overlap between the candidate's (genres ∪ languages ∪ {own id when
/// favorited}) and the criteria set
fn overlap_score(item: &CatalogItem, criteria: &CriteriaSet, boost: FavoriteBoost) -> usize {
    // genre/language union is a set: a tag present in both lists counts once
    let tags: BTreeSet<&str> = item
        .genres
        .iter()
        .chain(item.languages.iter())
        .map(String::as_str)
        .collect();

    let mut score = criteria.overlap_count(tags);
    if criteria.contains(&item.id) {
        score += boost.points();
    }
    score
}

/// Neutral fallback: the `n` most-recently-updated active items, unscored
fn recency_fallback(candidates: Vec<CatalogItem>, n: usize) -> Vec<ScoredItem> {
    let mut recent: Vec<ScoredItem> = candidates
        .into_iter()
        .filter(|item| item.is_active())
        .map(|item| ScoredItem { item, score: 0.0 })
        .collect();

    sort_ranked(&mut recent);
    recent.truncate(n);
    recent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Status;
    use chrono::{Duration, TimeZone, Utc};

    fn item(id: &str, genres: &[&str], languages: &[&str]) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Show {}", id),
            description: String::new(),
            status: Status::Active,
            genres: genres.iter().map(|s| s.to_string()).collect(),
            languages: languages.iter().map(|s| s.to_string()).collect(),
            listen_count: 0,
            likes: 0,
            shares: 0,
            comment_count: 0,
            updated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            host: "host-1".to_string(),
        }
    }

    fn signals(interests: &[&str], favorites: &[&str], history: &[&str]) -> UserSignals {
        UserSignals {
            interests: interests.iter().map(|s| s.to_string()).collect(),
            favorites: favorites.iter().map(|s| s.to_string()).collect(),
            search_history: history.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_interest_match_includes_only_overlapping_items() {
        let catalog = vec![item("x", &["comedy"], &[]), item("y", &["news"], &[])];
        let user = signals(&["comedy"], &[], &[]);

        let result = match_candidates(catalog, &user, FavoriteBoost::Single, 10);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].item.id, "x");
        assert_eq!(result[0].score, 1.0);
    }

    #[test]
    fn test_zero_overlap_candidates_excluded() {
        let catalog = vec![item("x", &["sports"], &["de"])];
        let user = signals(&["comedy"], &[], &["history"]);

        let result = match_candidates(catalog, &user, FavoriteBoost::Single, 10);
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_criteria_falls_back_to_recency_with_zero_scores() {
        let mut a = item("a", &["news"], &[]);
        a.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut b = item("b", &["comedy"], &[]);
        b.updated_at = a.updated_at + Duration::days(1);
        let mut inactive = item("c", &["tech"], &[]);
        inactive.status = Status::Inactive;
        inactive.updated_at = a.updated_at + Duration::days(2);

        let result = match_candidates(
            vec![a, b, inactive],
            &UserSignals::default(),
            FavoriteBoost::Single,
            2,
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].item.id, "b");
        assert_eq!(result[1].item.id, "a");
        assert!(result.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_favorite_counts_double_in_related_mode() {
        // Z is favorited AND matches on genre
        let z = item("z", &["comedy"], &[]);
        let user = signals(&["comedy"], &["z"], &[]);

        let related = match_candidates(vec![z.clone()], &user, FavoriteBoost::Double, 10);
        assert_eq!(related.len(), 1);
        // one genre overlap + two favorite points, never more
        assert_eq!(related[0].score, 3.0);

        let recommended = match_candidates(vec![z], &user, FavoriteBoost::Single, 10);
        assert_eq!(recommended[0].score, 2.0);
    }

    #[test]
    fn test_duplicate_tag_across_genre_and_language_counts_once() {
        let mut dup = item("d", &["english"], &["english"]);
        dup.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let user = signals(&["english"], &[], &[]);

        let result = match_candidates(vec![dup], &user, FavoriteBoost::Single, 10);
        assert_eq!(result[0].score, 1.0);
    }

    #[test]
    fn test_ranking_descending_with_recency_tie_break() {
        let mut two_hits = item("late", &["comedy", "news"], &[]);
        two_hits.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut one_hit = item("solo", &["comedy"], &[]);
        one_hit.updated_at = two_hits.updated_at + Duration::days(5);
        let mut newer_two_hits = item("fresh", &["comedy", "news"], &[]);
        newer_two_hits.updated_at = two_hits.updated_at + Duration::days(1);

        let user = signals(&["comedy", "news"], &[], &[]);
        let result = match_candidates(
            vec![two_hits, one_hit, newer_two_hits],
            &user,
            FavoriteBoost::Single,
            10,
        );

        let ids: Vec<&str> = result.iter().map(|s| s.item.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "late", "solo"]);
    }

    #[test]
    fn test_inactive_candidates_never_scored() {
        let mut hidden = item("h", &["comedy"], &[]);
        hidden.status = Status::Inactive;
        let user = signals(&["comedy"], &[], &[]);

        let result = match_candidates(vec![hidden], &user, FavoriteBoost::Single, 10);
        assert!(result.is_empty());
    }
}
