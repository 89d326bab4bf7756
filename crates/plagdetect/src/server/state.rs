//! Application state for the similarity server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::processing::{ComparisonSession, IngestPipeline};
use crate::similarity::SimilarityEngine;
use crate::storage::DocumentDb;
use crate::translation::{self, Translator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Document store (SQLite)
    store: DocumentDb,
    /// Translation provider (HTTP service or passthrough)
    translator: Arc<dyn Translator>,
    /// Upload pipeline and comparison
    session: ComparisonSession,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Create new application state from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let store = DocumentDb::new(&config.storage.database_path)?;
        tracing::info!(
            "Document store opened at {}",
            config.storage.database_path.display()
        );

        let translator = translation::from_config(&config.translation)?;
        tracing::info!(
            "Translator initialized ({}, target language '{}')",
            translator.name(),
            config.translation.target_language
        );

        Ok(Self::with_parts(config, store, translator))
    }

    /// Assemble state from an already opened store and translator
    pub fn with_parts(config: AppConfig, store: DocumentDb, translator: Arc<dyn Translator>) -> Self {
        let pipeline = IngestPipeline::new(&config, store.clone(), Arc::clone(&translator));
        let engine = SimilarityEngine::new(config.comparison.tokenizer);
        let session = ComparisonSession::new(pipeline, engine);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                translator,
                session,
                ready: RwLock::new(true),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get document store
    pub fn store(&self) -> &DocumentDb {
        &self.inner.store
    }

    /// Get translator
    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.inner.translator
    }

    /// Get comparison session
    pub fn session(&self) -> &ComparisonSession {
        &self.inner.session
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
