//! A mock completion provider for unit testing purposes.
use crate::completion::{ChatMessage, CompletionModel, CompletionResponse, RelayError};
use crate::model::ModelConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A mock `CompletionModel` for use in unit tests.
///
/// Its behavior can be configured via settings in the `ModelConfig`.
/// The `response_mode` setting controls what kind of response it generates:
/// - `""` (default): a fixed text response, overridable via `response_text`.
/// - `"error"`: the provider rejects the request.
/// - `"unavailable"`: the provider cannot be reached.
#[derive(Debug)]
pub struct TestProviderModel {
    config: ModelConfig,
}

impl TestProviderModel {
    /// Creates a new `TestProviderModel`.
    pub fn new(config: ModelConfig) -> Result<Self> {
        Ok(Self { config })
    }
}

#[async_trait]
impl CompletionModel for TestProviderModel {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _settings: &HashMap<String, String>,
    ) -> Result<CompletionResponse, RelayError> {
        let response_mode: String = self.config.get_setting("response_mode").unwrap_or_default();

        match response_mode.as_str() {
            "error" => Err(RelayError::ProviderError(
                "TestProviderModel error".to_string(),
            )),
            "unavailable" => Err(RelayError::ProviderUnavailable(
                "TestProviderModel unavailable".to_string(),
            )),
            _ => {
                let text: String = self
                    .config
                    .get_setting("response_text")
                    .unwrap_or_else(|| "Hello world".to_string());
                Ok(CompletionResponse {
                    text,
                    finish_reason: Some("stop".to_string()),
                })
            }
        }
    }
}
