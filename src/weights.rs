use crate::error::WeightsError;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// How raw bigram counts are turned into scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeightTransform {
    /// Counts used as-is
    #[value(name = "raw")]
    Raw,
    /// `ln(1 + count)`, damps very common bigrams
    #[value(name = "log1p")]
    Log1p,
    /// `count / total`, a probability per bigram
    #[value(name = "normal")]
    Normal,
}

impl WeightTransform {
    pub fn name(self) -> &'static str {
        match self {
            WeightTransform::Raw => "raw",
            WeightTransform::Log1p => "log1p",
            WeightTransform::Normal => "normal",
        }
    }
}

impl fmt::Display for WeightTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable bigram weight table built from `bigram\tcount` records
#[derive(Debug, Clone)]
pub struct BigramWeights {
    weights: HashMap<String, f64>,
    transform: WeightTransform,
    total: i64,
}

impl BigramWeights {
    /// Load and transform a weight table from a TSV file.
    /// Only an unreadable source is an error; malformed lines are skipped.
    pub async fn load(path: impl AsRef<Path>, transform: WeightTransform) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| WeightsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let weights = Self::from_tsv(&bytes, transform);
        info!(
            "Loaded {} bigram weights from {} ({} transform, total count {})",
            weights.len(),
            path.display(),
            transform,
            weights.total
        );
        Ok(weights)
    }

    /// Parse TSV content. Lines that are not valid UTF-8, do not have exactly
    /// two tab-separated fields, whose count is not an integer, or whose
    /// count would overflow the running total are ignored.
    pub fn from_tsv(content: &[u8], transform: WeightTransform) -> Self {
        let mut counts: HashMap<String, i64> = HashMap::new();
        let mut total = 0i64;
        let mut skipped = 0usize;

        for line in content.split(|&b| b == b'\n') {
            let Some((bigram, count)) = std::str::from_utf8(line).ok().and_then(parse_record) else {
                if !line.is_empty() {
                    skipped += 1;
                }
                continue;
            };
            let Some(new_total) = total.checked_add(count) else {
                skipped += 1;
                continue;
            };
            total = new_total;
            counts.insert(bigram.to_string(), count);
        }

        if skipped > 0 {
            debug!("Skipped {} malformed weight lines", skipped);
        }

        Self::from_counts(counts, transform, total)
    }

    /// Build a table from counts that have already been summed into `total`
    fn from_counts(counts: HashMap<String, i64>, transform: WeightTransform, total: i64) -> Self {
        let weights = counts
            .into_iter()
            .map(|(bigram, count)| {
                let count = count as f64;
                let weight = match transform {
                    WeightTransform::Raw => count,
                    WeightTransform::Log1p => count.ln_1p(),
                    // zero total: every weight is 0
                    WeightTransform::Normal if total == 0 => 0.0,
                    WeightTransform::Normal => count / total as f64,
                };
                (bigram, weight)
            })
            .collect();

        Self {
            weights,
            transform,
            total,
        }
    }

    /// Weight for a bigram, if the table has one
    pub fn lookup(&self, bigram: &str) -> Option<f64> {
        self.weights.get(bigram).copied()
    }

    pub fn transform(&self) -> WeightTransform {
        self.transform
    }

    /// Sum of raw counts, computed before any transform
    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

fn parse_record(line: &str) -> Option<(&str, i64)> {
    let mut fields = line.split('\t');
    let bigram = fields.next()?;
    let count = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    let count = count.trim().parse::<i64>().ok()?;
    Some((bigram, count))
}
