//! LibreTranslate-compatible HTTP translator with retry logic

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::TranslationConfig;
use crate::error::{Error, Result};

use super::{split_into_chunks, Translator};

/// Longest wait between two attempts
const MAX_BACKOFF_SECS: u64 = 60;

/// HTTP translation client with automatic retry
pub struct HttpTranslator {
    /// HTTP client
    client: Client,
    /// Configuration
    config: TranslationConfig,
    /// Maximum retries
    max_retries: u32,
}

#[derive(Serialize)]
struct TranslateRequest {
    q: String,
    source: String,
    target: String,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

impl HttpTranslator {
    /// Create a new translator with retry support
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            config: config.clone(),
        })
    }

    /// Retry a request with exponential backoff
    ///
    /// Failures the service will answer the same way every time are returned
    /// at once.
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, AttemptError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(AttemptError { error, retryable: false }) => return Err(error),
                Err(AttemptError { error, .. }) => {
                    last_error = Some(error);
                    if attempt < self.max_retries {
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            "Translation request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::translation("Unknown error")))
    }

    /// Translate one request-sized piece of text
    async fn translate_chunk(&self, chunk: &str, target_language: &str) -> Result<String> {
        let url = format!("{}/translate", self.config.base_url.trim_end_matches('/'));
        let text = chunk.to_string();
        let source = self.config.source_language.clone();
        let target = target_language.to_string();
        let api_key = self.config.api_key.clone();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let request = TranslateRequest {
                q: text.clone(),
                source: source.clone(),
                target: target.clone(),
                format: "text",
                api_key: api_key.clone(),
            };
            let client = client.clone();

            async move {
                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| AttemptError::retryable(format!("Request failed: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    let detail = serde_json::from_str::<ErrorResponse>(&body)
                        .map(|e| e.error)
                        .unwrap_or(body);
                    let error = Error::translation(format!("HTTP {} - {}", status, detail));
                    return Err(AttemptError {
                        error,
                        retryable: !status.is_client_error() || status == StatusCode::TOO_MANY_REQUESTS,
                    });
                }

                let translated: TranslateResponse = response
                    .json()
                    .await
                    .map_err(|e| AttemptError::retryable(format!("Failed to parse response: {}", e)))?;

                Ok(translated.translated_text)
            }
        })
        .await
    }
}

/// A failed request and whether sending it again could succeed
struct AttemptError {
    error: Error,
    retryable: bool,
}

impl AttemptError {
    fn retryable(message: String) -> Self {
        Self {
            error: Error::translation(message),
            retryable: true,
        }
    }
}

/// Delay before retry number `attempt + 1`: 1s, 2s, 4s, ... capped at one minute
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt).min(MAX_BACKOFF_SECS))
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let chunks = split_into_chunks(text, self.config.max_chunk_chars);
        tracing::debug!(
            "Translating {} chars to '{}' in {} request(s)",
            text.chars().count(),
            target_language,
            chunks.len()
        );

        let mut translated = String::with_capacity(text.len());
        for chunk in chunks {
            let body = chunk.trim_end();
            if body.trim().is_empty() {
                translated.push_str(chunk);
                continue;
            }
            let result = self.translate_chunk(body, target_language).await?;
            translated.push_str(result.trim_end());
            // services trim trailing whitespace; keep the original separator
            translated.push_str(&chunk[body.len()..]);
        }

        Ok(translated)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/languages", self.config.base_url.trim_end_matches('/'));

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "libretranslate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::post, Json, Router};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Local stand-in for the translation service that upper-cases its input
    #[derive(Clone)]
    struct StubService {
        status: StatusCode,
        requests: Arc<Mutex<Vec<String>>>,
    }

    async fn stub_translate(
        State(stub): State<StubService>,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let q = body["q"].as_str().unwrap_or_default().to_string();
        stub.requests.lock().push(q.clone());

        if stub.status.is_success() {
            // services add their own trailing whitespace
            let translated = format!("{}\n", q.to_uppercase());
            (stub.status, Json(serde_json::json!({ "translatedText": translated })))
        } else {
            (stub.status, Json(serde_json::json!({ "error": "Invalid request" })))
        }
    }

    async fn spawn_stub(status: StatusCode) -> (String, StubService) {
        let stub = StubService {
            status,
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/translate", post(stub_translate))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), stub)
    }

    fn stub_config(base_url: String, max_retries: u32) -> TranslationConfig {
        TranslationConfig {
            base_url,
            timeout_secs: 5,
            max_retries,
            max_chunk_chars: 20,
            ..TranslationConfig::default()
        }
    }

    fn unreachable_config() -> TranslationConfig {
        TranslationConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            max_retries: 0,
            ..TranslationConfig::default()
        }
    }

    #[test]
    fn test_request_serialization() {
        let request = TranslateRequest {
            q: "Bonjour".to_string(),
            source: "auto".to_string(),
            target: "en".to_string(),
            format: "text",
            api_key: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "Bonjour");
        assert_eq!(json["target"], "en");
        assert!(json.get("api_key").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let response: TranslateResponse =
            serde_json::from_str(r#"{"translatedText": "Hello everyone"}"#).unwrap();
        assert_eq!(response.translated_text, "Hello everyone");
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_network() {
        let translator = HttpTranslator::new(&unreachable_config()).unwrap();
        assert_eq!(translator.translate("  \n", "en").await.unwrap(), "  \n");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_translation_error() {
        let translator = HttpTranslator::new(&unreachable_config()).unwrap();
        let err = translator.translate("Bonjour", "en").await.unwrap_err();
        assert!(matches!(err, Error::Translation(_)));
        assert!(!translator.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_chunks_rejoined_in_order_with_separators() {
        let (base_url, stub) = spawn_stub(StatusCode::OK).await;
        let translator = HttpTranslator::new(&stub_config(base_url, 0)).unwrap();

        let text = "Bonjour le monde.\n\nComment allez-vous ?\nTres bien, merci.  \n";
        let translated = translator.translate(text, "en").await.unwrap();
        assert_eq!(translated, text.to_uppercase());

        let requests = stub.requests.lock().clone();
        assert!(requests.len() >= 3);
        let sent: String = requests.concat().split_whitespace().collect();
        let original: String = text.split_whitespace().collect();
        assert_eq!(sent, original);
        assert!(requests.iter().all(|q| q.chars().count() <= 20));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (base_url, stub) = spawn_stub(StatusCode::BAD_REQUEST).await;
        let translator = HttpTranslator::new(&stub_config(base_url, 3)).unwrap();

        let err = translator.translate("Bonjour", "en").await.unwrap_err();
        match err {
            Error::Translation(message) => {
                assert!(message.contains("400"));
                assert!(message.contains("Invalid request"));
            }
            other => panic!("expected translation error, got {:?}", other),
        }
        assert_eq!(stub.requests.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (base_url, stub) = spawn_stub(StatusCode::SERVICE_UNAVAILABLE).await;
        let translator = HttpTranslator::new(&stub_config(base_url, 1)).unwrap();

        assert!(translator.translate("Bonjour", "en").await.is_err());
        assert_eq!(stub.requests.lock().len(), 2);
    }

    #[test]
    fn test_backoff_delay_is_bounded() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        assert_eq!(backoff_delay(64), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_secs(MAX_BACKOFF_SECS));
    }
}
