use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{info, warn};

use crate::movie::Movie;

/// A catalog row before the ranking preconditions have been checked.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: u64,
    title: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: i64,
}

impl TryFrom<CatalogEntry> for Movie {
    type Error = anyhow::Error;

    fn try_from(entry: CatalogEntry) -> Result<Self> {
        if entry.title.trim().is_empty() {
            bail!("movie {} has an empty title", entry.id);
        }
        if !entry.vote_average.is_finite() || !(0.0..=10.0).contains(&entry.vote_average) {
            bail!(
                "movie {} has vote_average {} outside [0, 10]",
                entry.id,
                entry.vote_average
            );
        }
        let vote_count = u32::try_from(entry.vote_count).map_err(|_| {
            anyhow!(
                "movie {} has vote_count {} outside [0, {}]",
                entry.id,
                entry.vote_count,
                u32::MAX
            )
        })?;
        let release_date = entry
            .release_date
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .with_context(|| format!("movie {} has release_date {raw:?}", entry.id))
            })
            .transpose()?;

        Ok(Movie {
            id: entry.id,
            title: entry.title,
            overview: entry.overview.unwrap_or_default(),
            release_date,
            vote_average: entry.vote_average,
            vote_count,
        })
    }
}

/// Loads a catalog snapshot, choosing the TSV reader for `.tsv` files and
/// JSON otherwise. Rows that break the ranking preconditions are skipped.
pub fn load_catalog(path: &Path) -> Result<Vec<Movie>> {
    let is_tsv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let entries = if is_tsv {
        read_tsv_entries(reader).with_context(|| format!("reading {}", path.display()))?
    } else {
        serde_json::from_reader::<_, Vec<CatalogEntry>>(reader)
            .with_context(|| format!("decoding {}", path.display()))?
    };

    let movies = validate_entries(entries);
    info!(path = %path.display(), count = movies.len(), "loaded catalog");
    Ok(movies)
}

/// Parses a JSON array of catalog entries.
pub fn parse_json_catalog(json: &str) -> Result<Vec<Movie>> {
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(json).context("decoding catalog json")?;
    Ok(validate_entries(entries))
}

/// Parses a tab-separated catalog with a header row and the columns
/// `id, title, overview, release_date, vote_average, vote_count`.
pub fn parse_tsv_catalog<R: Read>(reader: R) -> Result<Vec<Movie>> {
    Ok(validate_entries(read_tsv_entries(reader)?))
}

fn validate_entries(entries: Vec<CatalogEntry>) -> Vec<Movie> {
    let total = entries.len();
    let movies: Vec<Movie> = entries
        .into_iter()
        .filter_map(|entry| match Movie::try_from(entry) {
            Ok(movie) => Some(movie),
            Err(err) => {
                warn!(error = %err, "rejecting catalog entry");
                None
            }
        })
        .collect();

    let rejected = total - movies.len();
    if rejected > 0 {
        warn!(rejected, total, "catalog contained invalid entries");
    }
    movies
}

fn read_tsv_entries<R: Read>(reader: R) -> Result<Vec<CatalogEntry>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading catalog row {}", line + 1))?;

        let Some(id) = parse_u64(record.get(0)) else {
            continue;
        };
        let Some(title) = non_null(record.get(1)) else {
            continue;
        };

        let vote_average = match non_null(record.get(4)) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("movie {id} has vote_average {raw:?}"))?,
            None => 0.0,
        };
        let vote_count = match non_null(record.get(5)) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("movie {id} has vote_count {raw:?}"))?,
            None => 0,
        };

        entries.push(CatalogEntry {
            id,
            title: title.to_string(),
            overview: non_null(record.get(2)).map(str::to_string),
            release_date: non_null(record.get(3)).map(str::to_string),
            vote_average,
            vote_count,
        });
    }

    Ok(entries)
}

fn non_null(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty() && *value != "\\N")
}

fn parse_u64(value: Option<&str>) -> Option<u64> {
    non_null(value)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_catalog_rejects_out_of_range_entries() {
        let json = r#"[
            {"id": 1, "title": "Alien", "overview": "In space.", "release_date": "1979-05-25", "vote_average": 8.1, "vote_count": 14000},
            {"id": 2, "title": "Broken", "vote_average": 11.0, "vote_count": 10},
            {"id": 3, "title": "Negative", "vote_average": 6.0, "vote_count": -4},
            {"id": 4, "title": "Unreleased", "release_date": null, "vote_average": 0.0, "vote_count": 0},
            {"id": 5, "title": "Bad Date", "release_date": "someday", "vote_average": 5.0, "vote_count": 3}
        ]"#;

        let movies = parse_json_catalog(json).expect("catalog should parse");
        let ids: Vec<u64> = movies.iter().map(|movie| movie.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(movies[0].release_date, NaiveDate::from_ymd_opt(1979, 5, 25));
        assert_eq!(movies[0].overview, "In space.");
        assert_eq!(movies[1].release_date, None);
    }

    #[test]
    fn tsv_catalog_treats_null_markers_as_absent() {
        let tsv = "id\ttitle\toverview\trelease_date\tvote_average\tvote_count\n\
                   10\tHeat\tA heist.\t1995-12-15\t7.9\t7000\n\
                   11\tUntitled Project\t\\N\t\\N\t\\N\t\\N\n\
                   \\N\tNo Id\t\t\t5.0\t10\n";

        let movies = parse_tsv_catalog(tsv.as_bytes()).expect("catalog should parse");
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].title, "Heat");
        assert_eq!(movies[0].vote_count, 7000);
        assert_eq!(movies[1].overview, "");
        assert_eq!(movies[1].release_date, None);
        assert_eq!(movies[1].vote_average, 0.0);
        assert_eq!(movies[1].vote_count, 0);
    }

    #[test]
    fn tsv_catalog_fails_on_unparsable_numbers() {
        let tsv = "id\ttitle\toverview\trelease_date\tvote_average\tvote_count\n\
                   10\tHeat\t\t1995-12-15\tgreat\t7000\n";
        assert!(parse_tsv_catalog(tsv.as_bytes()).is_err());
    }
}
