// Bag-of-words expansion for sentences.
//
// A sentence is split on single spaces (case kept, punctuation kept) and each
// token's neighbor set is unioned into the token set. The tokenizer is naive
// on purpose: scores stay comparable with earlier runs only if the split rule
// never changes.
//
// Bags are not reproducible over time. The neighbor service can change its
// answers, so building the same sentence's bag twice may give different sets.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::debug;

use crate::error::SimilarityError;
use crate::neighbors::traits::NeighborSource;

/// Expanded lexical neighborhood of a sentence. Always contains the
/// sentence's own tokens.
pub type Bag = HashSet<String>;

/// Split a sentence on single spaces.
///
/// Empty fragments from leading, trailing or repeated spaces are dropped.
pub fn tokenize(sentence: &str) -> Vec<&str> {
    sentence.split(' ').filter(|token| !token.is_empty()).collect()
}

/// Build the bag of words for `sentence`, fetching up to `limit` neighbors
/// per token.
///
/// All-or-nothing: if any token's lookup fails the whole call fails with
/// that token's error and no partial bag is returned.
pub async fn build_bag<S>(source: &S, sentence: &str, limit: u32) -> Result<Bag, SimilarityError>
where
    S: NeighborSource + ?Sized,
{
    let mut bag: Bag = tokenize(sentence).into_iter().map(str::to_string).collect();

    // Each distinct token is looked up once; the lookups run concurrently.
    let tokens: Vec<String> = bag.iter().cloned().collect();
    let neighbor_sets = try_join_all(
        tokens
            .iter()
            .map(|token| source.fetch_neighbors(token, limit)),
    )
    .await?;

    for neighbors in neighbor_sets {
        bag.extend(neighbors);
    }

    debug!(tokens = tokens.len(), bag_size = bag.len(), limit = limit, "Built bag of words");

    Ok(bag)
}
