use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use tracing::debug;

use super::confidence::ConfidenceLevel;
use super::scoring::{popularity_score, recency_score, relevance_score, wilson_score};
use crate::movie::{Movie, RankedMovie};

/// Vote threshold applied by the top-rated view unless overridden.
pub const DEFAULT_MIN_VOTES: u32 = 100;
/// Minimum average a movie needs to appear in the top-rated view.
pub const TOP_RATED_MIN_AVERAGE: f64 = 7.0;
/// Weight of the Wilson score inside the recency key.
const RECENCY_WILSON_WEIGHT: f64 = 0.3;

/// The named orderings the catalog exposes.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingStrategy {
    Popular,
    TopRated { min_votes: u32 },
    SearchRelevance { query: String },
    Recency,
    Wilson { confidence: ConfidenceLevel },
}

impl RankingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            RankingStrategy::Popular => "popular",
            RankingStrategy::TopRated { .. } => "top_rated",
            RankingStrategy::SearchRelevance { .. } => "search",
            RankingStrategy::Recency => "recency",
            RankingStrategy::Wilson { .. } => "wilson",
        }
    }
}

impl fmt::Display for RankingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a strategy name into a variant carrying default parameters.
impl FromStr for RankingStrategy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "popular" | "popularity" => Ok(RankingStrategy::Popular),
            "top_rated" | "top-rated" => Ok(RankingStrategy::TopRated {
                min_votes: DEFAULT_MIN_VOTES,
            }),
            "search" | "search_relevance" => Ok(RankingStrategy::SearchRelevance {
                query: String::new(),
            }),
            "recency" | "discover" => Ok(RankingStrategy::Recency),
            "wilson" => Ok(RankingStrategy::Wilson {
                confidence: ConfidenceLevel::default(),
            }),
            other => Err(anyhow!("unknown ranking strategy {other:?}")),
        }
    }
}

/// Descending lexicographic sort key. Unused slots stay at 0.
#[derive(Debug, Clone, Copy, Default)]
struct SortKey {
    primary: f64,
    secondary: f64,
    tertiary: f64,
}

impl SortKey {
    fn descending(&self, other: &Self) -> Ordering {
        other
            .primary
            .total_cmp(&self.primary)
            .then_with(|| other.secondary.total_cmp(&self.secondary))
            .then_with(|| other.tertiary.total_cmp(&self.tertiary))
    }
}

/// Scores every movie once, then stable-sorts by the resulting keys so
/// exact ties keep their input order.
fn order_by<F>(movies: Vec<Movie>, key: F) -> Vec<RankedMovie>
where
    F: Fn(&Movie) -> SortKey,
{
    let mut keyed: Vec<(SortKey, Movie)> = movies
        .into_iter()
        .map(|movie| (key(&movie), movie))
        .collect();
    keyed.sort_by(|(left, _), (right, _)| left.descending(right));
    keyed
        .into_iter()
        .map(|(key, movie)| RankedMovie {
            movie,
            score: key.primary,
        })
        .collect()
}

fn strip_scores(ranked: Vec<RankedMovie>) -> Vec<Movie> {
    ranked.into_iter().map(|ranked| ranked.movie).collect()
}

fn wilson_ranked(movies: Vec<Movie>, confidence: ConfidenceLevel) -> Vec<RankedMovie> {
    order_by(movies, |movie| SortKey {
        primary: wilson_score(movie.vote_average, movie.vote_count, confidence),
        secondary: movie.vote_average,
        tertiary: f64::from(movie.vote_count),
    })
}

fn popularity_ranked(movies: Vec<Movie>, today: NaiveDate) -> Vec<RankedMovie> {
    order_by(movies, |movie| SortKey {
        primary: popularity_score(movie, today),
        secondary: f64::from(movie.vote_count),
        tertiary: 0.0,
    })
}

fn top_rated_ranked(movies: Vec<Movie>, min_votes: u32) -> Vec<RankedMovie> {
    let eligible: Vec<Movie> = movies
        .into_iter()
        .filter(|movie| {
            movie.vote_count >= min_votes && movie.vote_average >= TOP_RATED_MIN_AVERAGE
        })
        .collect();
    order_by(eligible, |movie| SortKey {
        primary: wilson_score(movie.vote_average, movie.vote_count, ConfidenceLevel::P99),
        secondary: movie.vote_average,
        tertiary: f64::from(movie.vote_count),
    })
}

fn search_ranked(movies: Vec<Movie>, query: &str) -> Vec<RankedMovie> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return wilson_ranked(movies, ConfidenceLevel::P95);
    }

    let normalized = trimmed.to_lowercase();
    order_by(movies, |movie| SortKey {
        primary: relevance_score(movie, &normalized),
        secondary: wilson_score(movie.vote_average, movie.vote_count, ConfidenceLevel::P95),
        tertiary: 0.0,
    })
}

fn recency_ranked(movies: Vec<Movie>, today: NaiveDate) -> Vec<RankedMovie> {
    order_by(movies, |movie| {
        let wilson = wilson_score(movie.vote_average, movie.vote_count, ConfidenceLevel::P95);
        SortKey {
            primary: recency_score(movie, today) + RECENCY_WILSON_WEIGHT * wilson,
            ..SortKey::default()
        }
    })
}

/// Orders by Wilson lower bound, then raw average, then vote count.
pub fn apply_wilson_score_ranking(
    movies: Vec<Movie>,
    confidence: ConfidenceLevel,
) -> Vec<Movie> {
    strip_scores(wilson_ranked(movies, confidence))
}

pub fn apply_popularity_ranking(movies: Vec<Movie>, today: NaiveDate) -> Vec<Movie> {
    strip_scores(popularity_ranked(movies, today))
}

/// Keeps movies with at least `min_votes` votes and a 7.0 average, ordered
/// by the 99% Wilson bound.
pub fn apply_top_rated_ranking(movies: Vec<Movie>, min_votes: u32) -> Vec<Movie> {
    strip_scores(top_rated_ranked(movies, min_votes))
}

/// A blank query falls back to the 95% Wilson ordering.
pub fn apply_search_relevance_ranking(movies: Vec<Movie>, query: &str) -> Vec<Movie> {
    strip_scores(search_ranked(movies, query))
}

pub fn apply_recency_ranking(movies: Vec<Movie>, today: NaiveDate) -> Vec<Movie> {
    strip_scores(recency_ranked(movies, today))
}

/// Applies `strategy` and keeps each movie's primary sort key.
pub fn rank(strategy: &RankingStrategy, movies: Vec<Movie>, today: NaiveDate) -> Vec<RankedMovie> {
    let input = movies.len();
    let ranked = match strategy {
        RankingStrategy::Popular => popularity_ranked(movies, today),
        RankingStrategy::TopRated { min_votes } => top_rated_ranked(movies, *min_votes),
        RankingStrategy::SearchRelevance { query } => search_ranked(movies, query),
        RankingStrategy::Recency => recency_ranked(movies, today),
        RankingStrategy::Wilson { confidence } => wilson_ranked(movies, *confidence),
    };
    debug!(
        strategy = strategy.name(),
        input,
        output = ranked.len(),
        "ranked movies"
    );
    ranked
}
