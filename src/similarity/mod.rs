// Similarity scoring: set overlap, bag-of-words expansion, and the
// word/sentence pipeline that ties them to a NeighborSource.

pub mod bag;
pub mod jaccard;
pub mod pipeline;
