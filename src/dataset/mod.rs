// Labeled datasets: loading pairs with reference scores and scoring them in bulk.
//
// A dataset is a CSV (or TSV) file with a header row whose first three columns
// are: first item, second item, reference score. Items are words or sentences
// depending on the PairKind the caller picks.

pub mod batch;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

pub use batch::{score_dataset, BatchScores, FailurePolicy, SkippedPair};

/// One row of a labeled dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledPair {
    pub first: String,
    pub second: String,
    /// Ground-truth similarity on the dataset's own scale.
    pub reference: f64,
    /// Line in the source file, for error reports.
    pub line: u64,
}

/// Load labeled pairs from `path`. Files ending in `.tsv` are tab-separated.
pub fn load_pairs(path: &Path) -> Result<Vec<LabeledPair>> {
    let delimiter = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;

    parse_pairs(file, delimiter).with_context(|| format!("Invalid dataset {}", path.display()))
}

/// Parse labeled pairs from any reader. The first row is a header.
pub fn parse_pairs<R: Read>(reader: R, delimiter: u8) -> Result<Vec<LabeledPair>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let mut pairs = Vec::new();

    for result in reader.records() {
        let record = result.context("Failed to read dataset row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() < 3 {
            anyhow::bail!(
                "line {line}: expected at least 3 columns (first, second, score), found {}",
                record.len()
            );
        }

        let raw_score = record[2].trim();
        let reference: f64 = raw_score
            .parse()
            .with_context(|| format!("line {line}: score '{raw_score}' is not a number"))?;
        if !reference.is_finite() {
            anyhow::bail!("line {line}: score '{raw_score}' is not finite");
        }

        pairs.push(LabeledPair {
            first: record[0].trim().to_string(),
            second: record[1].trim().to_string(),
            reference,
            line,
        });
    }

    Ok(pairs)
}
