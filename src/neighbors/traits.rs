// Neighbor source trait: the swap-ready abstraction.
//
// Every lookup is a fresh query: a NeighborSet is built per call and handed to
// the caller, nothing is kept behind. The service's answers can drift over
// time, so two calls for the same term are not guaranteed to agree.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SimilarityError;

/// A set of terms. Ranking from the service is discarded.
pub type NeighborSet = HashSet<String>;

/// Trait for fetching the related words of a single term.
#[async_trait]
pub trait NeighborSource: Send + Sync {
    /// Fetch at most `limit` words related to `term`.
    ///
    /// Fails with `SimilarityError::Lookup` carrying `term` when the service
    /// is unreachable, times out, or answers with something unusable. An
    /// empty set is only returned when the service genuinely has no neighbors.
    async fn fetch_neighbors(&self, term: &str, limit: u32)
        -> Result<NeighborSet, SimilarityError>;
}

#[async_trait]
impl<S: NeighborSource + ?Sized> NeighborSource for Arc<S> {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        (**self).fetch_neighbors(term, limit).await
    }
}

#[async_trait]
impl<S: NeighborSource + ?Sized> NeighborSource for &S {
    async fn fetch_neighbors(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<NeighborSet, SimilarityError> {
        (**self).fetch_neighbors(term, limit).await
    }
}

/// Reject inputs no source can answer for.
pub fn check_query(term: &str, limit: u32) -> Result<(), SimilarityError> {
    use crate::error::LookupCause;

    if term.is_empty() {
        return Err(SimilarityError::lookup(term, LookupCause::EmptyTerm));
    }
    if limit == 0 {
        return Err(SimilarityError::lookup(term, LookupCause::InvalidLimit));
    }
    Ok(())
}
