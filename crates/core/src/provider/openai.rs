use crate::completion::{ChatMessage, CompletionModel, CompletionResponse, RelayError, SenderType};
use crate::model::ModelConfig;
use anyhow::{Result, anyhow};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::{
    Client as OpenAIClient,
    types::chat::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OpenAISettings {
    base_url: String,
    api_key: String,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// Client for an OpenAI-compatible chat completions endpoint.
///
/// The default configuration points this at Groq, but any server speaking
/// the same wire format works.
#[derive(Debug)]
pub struct OpenAIChatModel {
    config: ModelConfig,
    client: OpenAIClient<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAIChatModel {
    pub fn new(model_config: ModelConfig) -> Result<Self> {
        let settings: OpenAISettings = serde_yaml::from_value(
            serde_yaml::to_value(&model_config.settings)
                .map_err(|_e| anyhow!("Invalid settings structure"))?,
        )?;

        // If api_key starts with "env:", read from environment variable
        let api_key = if let Some(env_key) = settings.api_key.strip_prefix("env:") {
            let env_key = env_key.trim();
            std::env::var(env_key)
                .map_err(|_| anyhow!("Environment variable {} not found", env_key))?
        } else {
            settings.api_key.clone()
        };

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(settings.base_url.clone());

        let client = OpenAIClient::with_config(config);
        let timeout = Duration::from_millis(settings.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));

        Ok(Self {
            config: model_config,
            client,
            timeout,
        })
    }

    fn to_openai_message(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.sender {
            SenderType::System => ChatCompletionRequestMessage::System(
                async_openai::types::chat::ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.text.as_str())
                    .build()
                    .unwrap(),
            ),
            SenderType::Assistant => ChatCompletionRequestMessage::Assistant(
                async_openai::types::chat::ChatCompletionRequestAssistantMessageArgs::default()
                    .content(msg.text.as_str())
                    .build()
                    .unwrap(),
            ),
            SenderType::User => ChatCompletionRequestMessage::User(
                async_openai::types::chat::ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.text.as_str())
                    .build()
                    .unwrap(),
            ),
        }
    }
}

fn map_openai_error(err: OpenAIError) -> RelayError {
    match err {
        // Transport-level failure, the provider was never reached or the
        // connection broke. Retryable by the caller.
        OpenAIError::Reqwest(e) => RelayError::ProviderUnavailable(e.to_string()),
        // The provider answered with a non-success status and an error body.
        OpenAIError::ApiError(e) => RelayError::ProviderError(e.message),
        other => RelayError::ProviderError(other.to_string()),
    }
}

#[async_trait]
impl CompletionModel for OpenAIChatModel {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &HashMap<String, String>,
    ) -> Result<CompletionResponse, RelayError> {
        // Map messages to OpenAI message types
        let openai_messages: Vec<ChatCompletionRequestMessage> = messages
            .iter()
            .map(OpenAIChatModel::to_openai_message)
            .collect();

        // Set max_tokens and temperature if provided
        let max_tokens = settings
            .get("max_tokens")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1024u32);
        let temperature = settings
            .get("temperature")
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(0.0);

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.config.name.clone())
            .messages(openai_messages)
            .max_tokens(max_tokens)
            .temperature(temperature)
            .build()
            .map_err(|err| RelayError::InvalidRequest(format!("Invalid request: {err}")))?;

        debug!(model = %self.config.name, "Sending chat completion request");

        // One bounded outbound call. On timeout the in-flight future is
        // dropped, so a late provider response is never acted upon.
        let response = match tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
        {
            Err(_elapsed) => {
                return Err(RelayError::ProviderUnavailable(format!(
                    "Request timed out after {}ms",
                    self.timeout.as_millis()
                )));
            }
            Ok(Err(err)) => return Err(map_openai_error(err)),
            Ok(Ok(response)) => response,
        };

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::ProviderError("Response contains no choices".to_string()))?;

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason.map(|x| format!("{x:?}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelProvider;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn mock_completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1684,
            "model": "test-model",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 20,
                "completion_tokens": 30,
                "total_tokens": 50
            }
        })
    }

    // Create a test model configuration with mock server URL
    fn create_mock_model_config(server_url: &str, timeout_ms: u64) -> ModelConfig {
        let settings: HashMap<String, serde_yaml::Value> = HashMap::from([
            ("base_url".to_string(), server_url.into()),
            ("api_key".to_string(), "MOCK_OPENAI_API_KEY".into()),
            ("timeout_ms".to_string(), timeout_ms.into()),
        ]);

        ModelConfig {
            name: "test-model".to_string(),
            provider: ModelProvider::Openai,
            settings,
        }
    }

    fn user_message(text: &str) -> Vec<ChatMessage> {
        vec![ChatMessage {
            text: text.to_string(),
            sender: SenderType::User,
        }]
    }

    #[tokio::test]
    async fn test_openai_new_model() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri(), 1000);
        let model = OpenAIChatModel::new(config).unwrap();

        assert_eq!(model.config.name, "test-model");
        assert_eq!(model.timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_openai_new_model_missing_env_key() {
        let settings: HashMap<String, serde_yaml::Value> = HashMap::from([
            ("base_url".to_string(), "http://localhost:1234".into()),
            ("api_key".to_string(), "env:NARADMUNI_MISSING_TEST_KEY".into()),
        ]);
        let config = ModelConfig {
            name: "test-model".to_string(),
            provider: ModelProvider::Openai,
            settings,
        };

        let err = OpenAIChatModel::new(config).unwrap_err();
        assert!(
            err.to_string()
                .contains("Environment variable NARADMUNI_MISSING_TEST_KEY not found")
        );
    }

    #[tokio::test]
    async fn test_openai_complete_api() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri(), 5000);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_completion_body(
                "Breathe, and let go of what you cannot control.",
            )))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new(config).unwrap();
        let response = model
            .complete(&user_message("How do I find inner peace?"), &HashMap::new())
            .await
            .unwrap();

        assert_eq!(response.text, "Breathe, and let go of what you cannot control.");
        assert_eq!(response.finish_reason, Some("Stop".to_string()));
    }

    #[tokio::test]
    async fn test_openai_complete_error_status() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri(), 5000);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "Rate limit exceeded",
                    "type": "tokens",
                    "param": null,
                    "code": null
                }
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new(config).unwrap();
        let err = model
            .complete(&user_message("Hello"), &HashMap::new())
            .await
            .unwrap_err();

        match err {
            RelayError::ProviderError(msg) => assert!(msg.contains("Rate limit exceeded")),
            other => panic!("Expected ProviderError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_openai_complete_timeout() {
        let server = MockServer::start().await;
        // Provider answers after 500ms but the call is bounded at 50ms.
        let config = create_mock_model_config(&server.uri(), 50);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(mock_completion_body("too late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new(config).unwrap();
        let err = model
            .complete(&user_message("Hello"), &HashMap::new())
            .await
            .unwrap_err();

        match err {
            RelayError::ProviderUnavailable(msg) => assert!(msg.contains("timed out")),
            other => panic!("Expected ProviderUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_openai_complete_no_choices() {
        let server = MockServer::start().await;
        let config = create_mock_model_config(&server.uri(), 5000);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1684,
                "model": "test-model",
                "choices": []
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new(config).unwrap();
        let err = model
            .complete(&user_message("Hello"), &HashMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::ProviderError(_)));
    }
}
