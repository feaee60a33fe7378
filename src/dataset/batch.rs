// Bulk scoring of a labeled dataset.
//
// Pairs are scored with at most `concurrency` in flight. `buffered` (not
// `buffer_unordered`) keeps results in input order so each computed score
// stays next to its reference score. What happens on a failed pair is the
// caller's choice: abort the batch, or skip the pair and keep going.

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::LabeledPair;
use crate::error::SimilarityError;
use crate::neighbors::traits::NeighborSource;
use crate::similarity::pipeline::{PairKind, SimilarityPipeline};
use crate::stats::{pearson, CorrelationResult};

/// What to do when a pair cannot be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure and return its error.
    Abort,
    /// Log the failure, drop the pair from both sequences, continue.
    Skip,
}

/// A pair left out of the correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPair {
    pub line: u64,
    pub first: String,
    pub second: String,
    pub error: SimilarityError,
}

/// Paired computed/reference scores for one dataset run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchScores {
    pub computed: Vec<f64>,
    pub reference: Vec<f64>,
    pub skipped: Vec<SkippedPair>,
}

impl BatchScores {
    /// Number of pairs that were scored.
    pub fn scored(&self) -> usize {
        self.computed.len()
    }

    /// Pearson correlation of computed against reference scores.
    pub fn correlate(&self) -> Result<CorrelationResult, SimilarityError> {
        pearson(&self.computed, &self.reference)
    }
}

/// Score every pair in `pairs`.
///
/// With `FailurePolicy::Abort` the first failing pair's error is returned and
/// in-flight lookups are dropped. With `FailurePolicy::Skip` failures are
/// collected in `BatchScores::skipped`.
pub async fn score_dataset<S: NeighborSource>(
    pipeline: &SimilarityPipeline<S>,
    pairs: &[LabeledPair],
    kind: PairKind,
    policy: FailurePolicy,
    concurrency: usize,
) -> Result<BatchScores, SimilarityError> {
    let concurrency = concurrency.max(1);

    info!(
        pairs = pairs.len(),
        kind = kind.as_str(),
        concurrency = concurrency,
        "Scoring dataset"
    );

    let pb = ProgressBar::new(pairs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Scoring [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = stream::iter(pairs.iter().map(|pair| async move {
        let score = pipeline.score_pair(kind, &pair.first, &pair.second).await;
        (pair, score)
    }))
    .buffered(concurrency);

    let mut batch = BatchScores::default();

    while let Some((pair, score)) = results.next().await {
        pb.inc(1);
        match score {
            Ok(score) => {
                batch.computed.push(score);
                batch.reference.push(pair.reference);
            }
            Err(e) => match policy {
                FailurePolicy::Abort => {
                    pb.finish_and_clear();
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    warn!(
                        line = pair.line,
                        first = pair.first.as_str(),
                        second = pair.second.as_str(),
                        error = %e,
                        "Failed to score pair, skipping"
                    );
                    batch.skipped.push(SkippedPair {
                        line: pair.line,
                        first: pair.first.clone(),
                        second: pair.second.clone(),
                        error: e,
                    });
                }
            },
        }
    }
    pb.finish_and_clear();

    info!(
        scored = batch.scored(),
        skipped = batch.skipped.len(),
        "Dataset scoring complete"
    );

    Ok(batch)
}
