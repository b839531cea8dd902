use std::env;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;

use crate::ranking::{ConfidenceLevel, DEFAULT_MIN_VOTES, RankingStrategy};

const DEFAULT_LIMIT: usize = 20;

/// Ranking run configuration driven by environment variables.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub catalog_path: PathBuf,
    pub strategy: RankingStrategy,
    pub limit: usize,
    pub today: Option<NaiveDate>,
}

impl RankingConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let catalog_path = env::var("CINERANK_CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/movies.json"));

        let strategy_name = env::var("CINERANK_STRATEGY").unwrap_or_else(|_| "popular".into());
        let strategy = match strategy_name.parse::<RankingStrategy>()? {
            RankingStrategy::TopRated { .. } => RankingStrategy::TopRated {
                min_votes: parse_var("CINERANK_MIN_VOTES")?.unwrap_or(DEFAULT_MIN_VOTES),
            },
            RankingStrategy::SearchRelevance { .. } => RankingStrategy::SearchRelevance {
                query: env::var("CINERANK_QUERY").unwrap_or_default(),
            },
            RankingStrategy::Wilson { .. } => RankingStrategy::Wilson {
                confidence: parse_var::<ConfidenceLevel>("CINERANK_CONFIDENCE")?
                    .unwrap_or_default(),
            },
            other => other,
        };

        let limit = parse_var("CINERANK_LIMIT")?.unwrap_or(DEFAULT_LIMIT);

        let today = env::var("CINERANK_TODAY")
            .ok()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .with_context(|| format!("parsing CINERANK_TODAY={raw:?}"))
            })
            .transpose()?;

        Ok(Self {
            catalog_path,
            strategy,
            limit,
            today,
        })
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: Into<anyhow::Error>,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| -> anyhow::Error { err.into() })
            .with_context(|| format!("parsing {name}={raw:?}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: &[&str] = &[
        "CINERANK_CATALOG_PATH",
        "CINERANK_STRATEGY",
        "CINERANK_QUERY",
        "CINERANK_CONFIDENCE",
        "CINERANK_MIN_VOTES",
        "CINERANK_LIMIT",
        "CINERANK_TODAY",
    ];

    /// Runs `body` with only the given CINERANK_* variables set, restoring
    /// the previous environment afterwards.
    fn with_env<F: FnOnce()>(values: &[(&str, &str)], body: F) {
        let previous: Vec<(&str, Option<String>)> =
            VARS.iter().map(|name| (*name, env::var(name).ok())).collect();

        // Mutating process environment is unsafe in Rust 2024 because it affects global state.
        unsafe {
            for name in VARS {
                env::remove_var(name);
            }
            for (name, value) in values {
                env::set_var(name, value);
            }
        }

        body();

        unsafe {
            for (name, value) in previous {
                match value {
                    Some(value) => env::set_var(name, value),
                    None => env::remove_var(name),
                }
            }
        }
    }

    // Single test so the environment is not mutated from parallel test threads.
    #[test]
    fn environment_drives_configuration() {
        with_env(&[], || {
            let config = RankingConfig::from_env().expect("config should load");
            assert_eq!(config.catalog_path, PathBuf::from("data/movies.json"));
            assert_eq!(config.strategy, RankingStrategy::Popular);
            assert_eq!(config.limit, 20);
            assert_eq!(config.today, None);
        });

        with_env(
            &[
                ("CINERANK_STRATEGY", "top_rated"),
                ("CINERANK_MIN_VOTES", "250"),
                ("CINERANK_TODAY", "2024-06-30"),
                ("CINERANK_LIMIT", "5"),
            ],
            || {
                let config = RankingConfig::from_env().expect("config should load");
                assert_eq!(
                    config.strategy,
                    RankingStrategy::TopRated { min_votes: 250 }
                );
                assert_eq!(config.limit, 5);
                assert_eq!(config.today, NaiveDate::from_ymd_opt(2024, 6, 30));
            },
        );

        with_env(
            &[
                ("CINERANK_STRATEGY", "wilson"),
                ("CINERANK_CONFIDENCE", "0.99"),
            ],
            || {
                let config = RankingConfig::from_env().expect("config should load");
                assert_eq!(
                    config.strategy,
                    RankingStrategy::Wilson {
                        confidence: ConfidenceLevel::P99
                    }
                );
            },
        );

        with_env(
            &[("CINERANK_STRATEGY", "search"), ("CINERANK_QUERY", "Dune")],
            || {
                let config = RankingConfig::from_env().expect("config should load");
                assert_eq!(
                    config.strategy,
                    RankingStrategy::SearchRelevance {
                        query: "Dune".into()
                    }
                );
            },
        );

        with_env(
            &[
                ("CINERANK_STRATEGY", "wilson"),
                ("CINERANK_CONFIDENCE", "0.5"),
            ],
            || {
                assert!(RankingConfig::from_env().is_err());
            },
        );

        with_env(&[("CINERANK_LIMIT", "lots")], || {
            assert!(RankingConfig::from_env().is_err());
        });
    }
}
