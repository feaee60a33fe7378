// Error kinds surfaced by the similarity core.
//
// A failed lookup is never turned into a score. Callers get one of these
// variants and decide whether to abort the surrounding batch or skip the pair.

use std::fmt;

use thiserror::Error;

/// Errors produced by neighbor lookups, scoring and correlation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    /// The neighbor service could not answer for `term`.
    #[error("lookup failed for '{term}': {cause}")]
    Lookup { term: String, cause: LookupCause },

    /// Computed and reference sequences have different lengths.
    #[error("shape mismatch: {computed} computed scores vs {reference} reference scores")]
    ShapeMismatch { computed: usize, reference: usize },

    /// Fewer than two paired observations.
    #[error("insufficient data: correlation needs at least 2 pairs, got {n}")]
    InsufficientData { n: usize },

    /// One of the sequences is constant, so Pearson r is undefined.
    #[error("zero variance: correlation is undefined for a constant sequence")]
    ZeroVariance,

    /// A score at `index` is NaN or infinite.
    #[error("non-finite score at position {index}")]
    NonFinite { index: usize },
}

impl SimilarityError {
    pub fn lookup(term: &str, cause: LookupCause) -> Self {
        SimilarityError::Lookup {
            term: term.to_string(),
            cause,
        }
    }

    /// True when the error is a lookup failure worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, SimilarityError::Lookup { cause, .. } if cause.is_transient())
    }
}

/// Why a lookup failed.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupCause {
    /// Connection-level failure (DNS, refused, reset).
    Transport(String),
    /// The per-request timeout expired.
    Timeout,
    /// The service answered with a non-success HTTP status.
    Status(u16),
    /// The body was not a JSON array of `{ "word": ... }` objects.
    Malformed(String),
    /// The query term was empty.
    EmptyTerm,
    /// The requested limit was zero.
    InvalidLimit,
}

impl LookupCause {
    /// Transport errors, timeouts, 429 and 5xx responses may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            LookupCause::Transport(_) | LookupCause::Timeout => true,
            LookupCause::Status(code) => *code == 429 || (500..600).contains(code),
            LookupCause::Malformed(_) | LookupCause::EmptyTerm | LookupCause::InvalidLimit => {
                false
            }
        }
    }
}

impl fmt::Display for LookupCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupCause::Transport(msg) => write!(f, "request failed: {msg}"),
            LookupCause::Timeout => write!(f, "request timed out"),
            LookupCause::Status(code) => write!(f, "service returned HTTP {code}"),
            LookupCause::Malformed(msg) => write!(f, "malformed response: {msg}"),
            LookupCause::EmptyTerm => write!(f, "term is empty"),
            LookupCause::InvalidLimit => write!(f, "limit must be greater than zero"),
        }
    }
}
