// The scoring pipeline: one NeighborSource, two explicit neighbor limits.
//
//   word pair:     neighbors(a) vs neighbors(b)          -> Jaccard
//   sentence pair: bag(a) vs bag(b) (tokens + neighbors) -> Jaccard
//
// Both limits are carried in PipelineLimits rather than buried in call
// sites, so a run is fully described by its inputs.

use serde::{Deserialize, Serialize};

use super::bag::{build_bag, Bag};
use super::jaccard::jaccard_similarity;
use crate::error::SimilarityError;
use crate::neighbors::traits::{NeighborSet, NeighborSource};

/// Default neighbor limit for word-pair scoring.
pub const DEFAULT_WORD_LIMIT: u32 = 100;

/// Default neighbor limit per token when building sentence bags.
pub const DEFAULT_SENTENCE_LIMIT: u32 = 200;

/// Neighbor limits for the two scoring paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineLimits {
    pub word_limit: u32,
    pub sentence_limit: u32,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            word_limit: DEFAULT_WORD_LIMIT,
            sentence_limit: DEFAULT_SENTENCE_LIMIT,
        }
    }
}

/// Whether the items of a labeled pair are single words or sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    Words,
    Sentences,
}

impl PairKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairKind::Words => "words",
            PairKind::Sentences => "sentences",
        }
    }
}

/// Word and sentence similarity over a single neighbor source.
pub struct SimilarityPipeline<S> {
    source: S,
    limits: PipelineLimits,
}

impl<S: NeighborSource> SimilarityPipeline<S> {
    pub fn new(source: S, limits: PipelineLimits) -> Self {
        Self { source, limits }
    }

    pub fn limits(&self) -> PipelineLimits {
        self.limits
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Neighbor set of a single word at the word-pair limit.
    pub async fn neighbors(&self, word: &str) -> Result<NeighborSet, SimilarityError> {
        self.source.fetch_neighbors(word, self.limits.word_limit).await
    }

    /// Jaccard similarity of the two words' neighbor sets.
    ///
    /// The words themselves are not added to their sets.
    pub async fn word_similarity(&self, word_a: &str, word_b: &str) -> Result<f64, SimilarityError> {
        let (neighbors_a, neighbors_b) =
            futures::try_join!(self.neighbors(word_a), self.neighbors(word_b))?;
        Ok(jaccard_similarity(&neighbors_a, &neighbors_b))
    }

    /// Bags of words for both sentences at the sentence limit.
    pub async fn sentence_bags(
        &self,
        sentence_a: &str,
        sentence_b: &str,
    ) -> Result<(Bag, Bag), SimilarityError> {
        let limit = self.limits.sentence_limit;
        futures::try_join!(
            build_bag(&self.source, sentence_a, limit),
            build_bag(&self.source, sentence_b, limit),
        )
    }

    /// Jaccard similarity of the two sentences' bags of words.
    pub async fn sentence_similarity(
        &self,
        sentence_a: &str,
        sentence_b: &str,
    ) -> Result<f64, SimilarityError> {
        let (bag_a, bag_b) = self.sentence_bags(sentence_a, sentence_b).await?;
        Ok(jaccard_similarity(&bag_a, &bag_b))
    }

    /// Score a pair according to its kind.
    pub async fn score_pair(&self, kind: PairKind, a: &str, b: &str) -> Result<f64, SimilarityError> {
        match kind {
            PairKind::Words => self.word_similarity(a, b).await,
            PairKind::Sentences => self.sentence_similarity(a, b).await,
        }
    }
}
