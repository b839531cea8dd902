use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A catalog entry as supplied by the persistence layer.
///
/// `vote_average` is on a 0-10 scale where 0 means "no ratings".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub vote_average: f64,
    pub vote_count: u32,
}

impl Movie {
    pub fn new(id: u64, title: impl Into<String>, vote_average: f64, vote_count: u32) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            release_date: None,
            vote_average,
            vote_count,
        }
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }

    pub fn released(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }
}

/// A movie paired with the primary key it was ordered by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{Token, assert_ser_tokens};

    #[test]
    fn movie_serializes_with_snake_case_fields() {
        let movie = Movie::new(603, "The Matrix", 8.2, 25_000).with_overview("Neo wakes up.");

        assert_ser_tokens(
            &movie,
            &[
                Token::Struct {
                    name: "Movie",
                    len: 6,
                },
                Token::Str("id"),
                Token::U64(603),
                Token::Str("title"),
                Token::Str("The Matrix"),
                Token::Str("overview"),
                Token::Str("Neo wakes up."),
                Token::Str("release_date"),
                Token::None,
                Token::Str("vote_average"),
                Token::F64(8.2),
                Token::Str("vote_count"),
                Token::U32(25_000),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn missing_overview_and_date_default_on_deserialize() {
        let movie: Movie = serde_json::from_str(
            r#"{"id": 1, "title": "Heat", "vote_average": 7.9, "vote_count": 7000}"#,
        )
        .expect("movie should parse");
        assert!(movie.overview.is_empty());
        assert_eq!(movie.release_date, None);
    }
}
