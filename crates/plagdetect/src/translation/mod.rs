//! Machine translation to the comparison language
//!
//! Documents in different languages are only lexically comparable once they
//! share a language, so every document is translated before it is stored.

mod chunking;
pub mod http;
pub mod passthrough;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::TranslationConfig;
use crate::error::Result;

pub use chunking::split_into_chunks;
pub use http::HttpTranslator;
pub use passthrough::PassthroughTranslator;

/// Trait for translation backends
///
/// Implementations:
/// - `HttpTranslator`: LibreTranslate-compatible HTTP API
/// - `PassthroughTranslator`: returns text unchanged (translation disabled)
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language`
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Build the translator selected by configuration
pub fn from_config(config: &TranslationConfig) -> Result<Arc<dyn Translator>> {
    if config.enabled {
        Ok(Arc::new(HttpTranslator::new(config)?))
    } else {
        Ok(Arc::new(PassthroughTranslator))
    }
}
