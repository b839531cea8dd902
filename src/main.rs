use std::io::{self, Write};

use anyhow::{Context, Result};
use cinerank::catalog;
use cinerank::config::RankingConfig;
use cinerank::ranking::{MovieRanker, RankingService};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .pretty()
        .init();

    let config = RankingConfig::from_env()?;
    info!(
        catalog_path = %config.catalog_path.display(),
        strategy = %config.strategy,
        limit = config.limit,
        today = ?config.today,
        "loaded configuration"
    );

    let movies = catalog::load_catalog(&config.catalog_path)?;

    let ranker = config.today.map(MovieRanker::at).unwrap_or_default();
    let mut ranked = ranker.rank(&config.strategy, movies);
    ranked.truncate(config.limit);
    info!(count = ranked.len(), today = %ranker.today(), "ranking complete");

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &ranked).context("writing ranked catalog")?;
    writeln!(stdout).context("writing ranked catalog")?;

    Ok(())
}
