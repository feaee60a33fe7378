// Correlation of computed similarity scores against reference judgments.

pub mod beta;
pub mod pearson;

pub use pearson::{pearson, CorrelationResult};
