use chrono::{Datelike, NaiveDate};

use super::confidence::ConfidenceLevel;
use crate::movie::Movie;

/// Lower bound of the Wilson score interval for a 0-10 rating backed by
/// `vote_count` votes. Returns 0 for unrated items.
pub fn wilson_score(rating: f64, vote_count: u32, confidence: ConfidenceLevel) -> f64 {
    if vote_count == 0 {
        return 0.0;
    }

    let n = vote_count as f64;
    let p = rating / 10.0;
    let z = confidence.z_score();
    let z2 = z * z;

    let denom = 1.0 + z2 / n;
    let center = p + z2 / (2.0 * n);
    let stddev = ((p * (1.0 - p) + z2 / (4.0 * n)) / n).sqrt();
    let bound = (center - z * stddev) / denom;

    // also folds -0.0 into 0.0 so descending sorts treat them alike
    if bound > 0.0 { bound.min(1.0) } else { 0.0 }
}

/// Blend of quality, log-scaled vote volume and calendar-year freshness.
pub fn popularity_score(movie: &Movie, today: NaiveDate) -> f64 {
    if movie.vote_count == 0 {
        return 0.0;
    }

    let rating_component = movie.vote_average / 10.0;
    let vote_component = f64::from(movie.vote_count.max(1)).log10() / 6.0;
    let recency_component = match movie.release_date {
        Some(date) => {
            let years_old = f64::from(today.year() - date.year());
            (1.0 - 0.02 * years_old).max(0.1)
        }
        None => 0.5,
    };

    0.4 * rating_component + 0.4 * vote_component + 0.2 * recency_component
}

/// Match quality against an already lowercased, non-empty query, with the
/// raw rating added as a tiebreaker inside each match tier.
pub fn relevance_score(movie: &Movie, normalized_query: &str) -> f64 {
    let title = movie.title.to_lowercase();

    let title_bonus = if title == normalized_query {
        100.0
    } else if title.starts_with(normalized_query) {
        50.0
    } else if title.contains(normalized_query) {
        25.0
    } else {
        0.0
    };

    let overview_bonus =
        if !movie.overview.is_empty() && movie.overview.to_lowercase().contains(normalized_query) {
            10.0
        } else {
            0.0
        };

    title_bonus + overview_bonus + movie.vote_average
}

/// Exponential decay over days since release, floored at 0.1.
///
/// Unknown dates score 0; upcoming releases get the flat floor so they are
/// not excluded from recency views.
pub fn recency_score(movie: &Movie, today: NaiveDate) -> f64 {
    const DECAY_DAYS: f64 = 365.0;
    const FLOOR: f64 = 0.1;

    let Some(release) = movie.release_date else {
        return 0.0;
    };
    if release > today {
        return FLOOR;
    }

    let days_since_release = (today - release).num_days() as f64;
    (-days_since_release / DECAY_DAYS).exp().max(FLOOR)
}
