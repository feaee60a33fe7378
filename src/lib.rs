// lexsim: lexical-neighborhood similarity for words and sentences.
//
// This is the library root. Each module corresponds to one stage of the
// pipeline: neighbor lookup, set similarity, correlation against reference
// judgments, and the stored result table.

pub mod config;
pub mod dataset;
pub mod error;
pub mod neighbors;
pub mod output;
pub mod results;
pub mod similarity;
pub mod stats;

pub use error::{LookupCause, SimilarityError};
