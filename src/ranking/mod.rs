mod confidence;
mod scoring;
mod service;
mod strategy;

pub use confidence::ConfidenceLevel;
pub use scoring::{popularity_score, recency_score, relevance_score, wilson_score};
pub use service::{MovieRanker, RankingService};
pub use strategy::{
    DEFAULT_MIN_VOTES, RankingStrategy, TOP_RATED_MIN_AVERAGE, apply_popularity_ranking,
    apply_recency_ranking, apply_search_relevance_ranking, apply_top_rated_ranking,
    apply_wilson_score_ranking, rank,
};
