//! No-op translator used when translation is disabled

use async_trait::async_trait;

use crate::error::Result;

use super::Translator;

/// Returns every text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _target_language: &str) -> Result<String> {
        Ok(text.to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_returns_input() {
        let translator = PassthroughTranslator;
        let out = tokio_test::block_on(translator.translate("Bonjour tout le monde", "en")).unwrap();
        assert_eq!(out, "Bonjour tout le monde");
        assert!(tokio_test::block_on(translator.health_check()).unwrap());
    }
}
