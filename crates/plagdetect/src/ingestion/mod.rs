//! Text extraction from uploaded documents

mod extractor;

pub use extractor::{ExtractedText, TextExtractor};
