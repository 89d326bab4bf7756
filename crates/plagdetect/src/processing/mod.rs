//! Upload processing and comparison sessions
//!
//! - `pipeline`: extract → translate → persist for each uploaded file
//! - `session`: runs the pipeline for a comparison request and scores pairs

mod pipeline;
mod session;

pub use pipeline::{IngestPipeline, IngestReport};
pub use session::{ComparisonOutcome, ComparisonSession};

#[cfg(test)]
pub(crate) use pipeline::test_support;
