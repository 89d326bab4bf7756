//! Configuration for the similarity service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_ENV_VAR: &str = "PLAGDETECT_CONFIG";

/// Upper bound for `translation.max_retries`
pub const MAX_TRANSLATION_RETRIES: u32 = 10;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Document store configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Translation service configuration
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Comparison configuration
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `PLAGDETECT_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.translation.target_language.trim().is_empty() {
            return Err(Error::Config(
                "translation.target_language must not be empty".to_string(),
            ));
        }
        if self.translation.max_chunk_chars == 0 {
            return Err(Error::Config(
                "translation.max_chunk_chars must be positive".to_string(),
            ));
        }
        if self.translation.max_retries > MAX_TRANSLATION_RETRIES {
            return Err(Error::Config(format!(
                "translation.max_retries must be at most {}",
                MAX_TRANSLATION_RETRIES
            )));
        }
        if self.comparison.max_concurrent_translations == 0 {
            return Err(Error::Config(
                "comparison.max_concurrent_translations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let database_path = dirs::data_local_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("plagdetect")
            .join("plagiarism.db");

        Self { database_path }
    }
}

/// Translation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translate documents before storing them
    pub enabled: bool,
    /// Base URL of a LibreTranslate-compatible API
    pub base_url: String,
    /// API key, if the service requires one
    pub api_key: Option<String>,
    /// Common language every document is translated to
    pub target_language: String,
    /// Source language ("auto" lets the service detect it)
    pub source_language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Longest piece of text sent in a single request
    pub max_chunk_chars: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:5000".to_string(),
            api_key: None,
            target_language: "en".to_string(),
            source_language: "auto".to_string(),
            timeout_secs: 60,
            max_retries: 2,
            max_chunk_chars: 4500,
        }
    }
}

/// What a comparison request does when a document cannot be translated
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranslationFailurePolicy {
    /// Report the file and leave it out of the comparison
    #[default]
    Skip,
    /// Fail the whole request
    Abort,
}

/// Comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Behaviour when translating a document fails
    pub translation_failure: TranslationFailurePolicy,
    /// Upper bound on translations in flight at once (1 = sequential)
    pub max_concurrent_translations: usize,
    /// Tokenizer settings for the bag-of-words vectors
    pub tokenizer: TokenizerConfig,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            translation_failure: TranslationFailurePolicy::Skip,
            max_concurrent_translations: 1,
            tokenizer: TokenizerConfig::default(),
        }
    }
}

/// Tokenizer configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Fold tokens to lowercase before counting
    pub lowercase: bool,
    /// Shortest run of word characters counted as a token
    pub min_token_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            min_token_len: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.translation.target_language, "en");
        assert_eq!(config.comparison.max_concurrent_translations, 1);
        assert_eq!(
            config.comparison.translation_failure,
            TranslationFailurePolicy::Skip
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[translation]
enabled = false
target_language = "fr"

[comparison]
translation_failure = "abort"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.translation.enabled);
        assert_eq!(config.translation.target_language, "fr");
        assert_eq!(config.translation.max_retries, 2);
        assert_eq!(
            config.comparison.translation_failure,
            TranslationFailurePolicy::Abort
        );
        assert!(config.comparison.tokenizer.lowercase);
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = AppConfig::default();
        config.comparison.max_concurrent_translations = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_rejects_empty_language() {
        let mut config = AppConfig::default();
        config.translation.target_language = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_retries() {
        let mut config = AppConfig::default();
        config.translation.max_retries = MAX_TRANSLATION_RETRIES;
        assert!(config.validate().is_ok());

        config.translation.max_retries = 70;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
