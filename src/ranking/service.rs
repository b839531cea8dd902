use chrono::{NaiveDate, Utc};

use super::confidence::ConfidenceLevel;
use super::strategy::{self, RankingStrategy};
use crate::movie::{Movie, RankedMovie};

/// Ranking operations consumed by the catalog views.
///
/// Implementations must be pure with respect to their inputs: movies are
/// reordered (or filtered, for top-rated) but never modified.
pub trait RankingService: Send + Sync {
    fn apply_popularity_ranking(&self, movies: Vec<Movie>) -> Vec<Movie>;

    fn apply_top_rated_ranking(&self, movies: Vec<Movie>, min_votes: u32) -> Vec<Movie>;

    fn apply_search_relevance_ranking(&self, movies: Vec<Movie>, query: &str) -> Vec<Movie>;

    fn apply_recency_ranking(&self, movies: Vec<Movie>) -> Vec<Movie>;

    fn apply_wilson_score_ranking(
        &self,
        movies: Vec<Movie>,
        confidence: ConfidenceLevel,
    ) -> Vec<Movie>;

    fn rank(&self, strategy: &RankingStrategy, movies: Vec<Movie>) -> Vec<RankedMovie>;
}

/// Default [`RankingService`]. Date-sensitive strategies use the system
/// clock unless a reference date is pinned.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieRanker {
    pinned_today: Option<NaiveDate>,
}

impl MovieRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(today: NaiveDate) -> Self {
        Self {
            pinned_today: Some(today),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

impl RankingService for MovieRanker {
    fn apply_popularity_ranking(&self, movies: Vec<Movie>) -> Vec<Movie> {
        strategy::apply_popularity_ranking(movies, self.today())
    }

    fn apply_top_rated_ranking(&self, movies: Vec<Movie>, min_votes: u32) -> Vec<Movie> {
        strategy::apply_top_rated_ranking(movies, min_votes)
    }

    fn apply_search_relevance_ranking(&self, movies: Vec<Movie>, query: &str) -> Vec<Movie> {
        strategy::apply_search_relevance_ranking(movies, query)
    }

    fn apply_recency_ranking(&self, movies: Vec<Movie>) -> Vec<Movie> {
        strategy::apply_recency_ranking(movies, self.today())
    }

    fn apply_wilson_score_ranking(
        &self,
        movies: Vec<Movie>,
        confidence: ConfidenceLevel,
    ) -> Vec<Movie> {
        strategy::apply_wilson_score_ranking(movies, confidence)
    }

    fn rank(&self, strategy: &RankingStrategy, movies: Vec<Movie>) -> Vec<RankedMovie> {
        strategy::rank(strategy, movies, self.today())
    }
}
