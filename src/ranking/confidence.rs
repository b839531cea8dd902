use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

/// Confidence levels accepted by the Wilson lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceLevel {
    P90,
    #[default]
    P95,
    P99,
}

impl ConfidenceLevel {
    /// Two-sided z-score for this level.
    pub fn z_score(self) -> f64 {
        match self {
            ConfidenceLevel::P90 => 1.645,
            ConfidenceLevel::P95 => 1.96,
            ConfidenceLevel::P99 => 2.576,
        }
    }

    pub fn probability(self) -> f64 {
        match self {
            ConfidenceLevel::P90 => 0.90,
            ConfidenceLevel::P95 => 0.95,
            ConfidenceLevel::P99 => 0.99,
        }
    }

    /// Maps a raw probability onto a level. Anything other than 0.90, 0.95
    /// or 0.99 falls back to 95%.
    pub fn from_probability(value: f64) -> Self {
        Self::matching(value).unwrap_or_default()
    }

    fn matching(value: f64) -> Option<Self> {
        const EPSILON: f64 = 1e-9;
        [
            ConfidenceLevel::P90,
            ConfidenceLevel::P95,
            ConfidenceLevel::P99,
        ]
        .into_iter()
        .find(|level| (level.probability() - value).abs() < EPSILON)
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.probability())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = anyhow::Error;

    /// Strict parse: accepts `0.90`/`0.9`/`90`/`90%` (and the 95/99 equivalents).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim().trim_end_matches('%');
        let value: f64 = trimmed
            .parse()
            .map_err(|_| anyhow!("invalid confidence level {raw:?}"))?;
        let value = if value > 1.0 { value / 100.0 } else { value };
        ConfidenceLevel::matching(value).ok_or_else(|| {
            anyhow!("unsupported confidence level {raw:?}, expected one of 0.90, 0.95, 0.99")
        })
    }
}
