use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum SenderType {
    System,
    Assistant,
    User,
}

impl From<SenderType> for String {
    fn from(val: SenderType) -> Self {
        val.as_str().into()
    }
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match &self {
            SenderType::System => "system",
            SenderType::User => "user",
            SenderType::Assistant => "assistant",
        }
    }
}

/// One turn in a conversation, tagged with its speaker role.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: SenderType,
}

/// Provider output for a single completion exchange.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub finish_reason: Option<String>,
}

/// Failures surfaced by the relay and its providers.
///
/// `ProviderUnavailable` is transient and retryable by the caller;
/// `ProviderError` means the provider rejected the request and retrying
/// without modification will not help.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid chat request: {0}")]
    InvalidRequest(String),
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Completion provider error: {0}")]
    ProviderError(String),
}

#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Issue one completion call for the given conversation. No retries,
    /// no streaming: one request, one response.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        settings: &HashMap<String, String>,
    ) -> Result<CompletionResponse, RelayError>;
}
