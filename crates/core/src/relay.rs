//! The chat relay: one conversation in, one provider call, one reply out.
use crate::completion::{ChatMessage, CompletionModel, RelayError, SenderType};
use crate::config::RelayConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::debug;

/// Conversation submitted by a caller, user turn last.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Assistant reply produced by the relay.
#[derive(Debug)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

/// Forwards a conversation to a completion provider and returns its reply.
///
/// The relay holds no conversation state. Every call to [`ChatRelay::respond`]
/// is independent: callers resend prior turns when they want context, and
/// nothing is cached, queued, or retried.
pub struct ChatRelay {
    model: Box<dyn CompletionModel + Send + Sync>,
    system_prompt: String,
    settings: HashMap<String, String>,
    max_message_chars: usize,
}

impl ChatRelay {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let model = crate::get_completion_llm(config.model.clone())
            .context("Failed to initialize relay model")?;

        let settings = HashMap::from([
            (
                "temperature".to_string(),
                config.profile.temperature.to_string(),
            ),
            (
                "max_tokens".to_string(),
                config.profile.max_tokens.to_string(),
            ),
        ]);

        Ok(Self {
            model,
            system_prompt: config.system_prompt.clone(),
            settings,
            max_message_chars: config.max_message_chars,
        })
    }

    /// Relay one conversation to the provider and return the assistant turn.
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatResponse, RelayError> {
        self.validate(request)?;

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !self.system_prompt.is_empty() {
            messages.push(ChatMessage {
                text: self.system_prompt.clone(),
                sender: SenderType::System,
            });
        }
        messages.extend(request.messages.iter().cloned());

        debug!(turns = request.messages.len(), "Relaying conversation");
        let completion = self.model.complete(&messages, &self.settings).await?;

        Ok(ChatResponse {
            message: ChatMessage {
                text: completion.text,
                sender: SenderType::Assistant,
            },
            finish_reason: completion.finish_reason,
        })
    }

    fn validate(&self, request: &ChatRequest) -> Result<(), RelayError> {
        let last = request
            .messages
            .last()
            .ok_or_else(|| RelayError::InvalidRequest("Message sequence is empty".to_string()))?;

        // The persona prompt is server configuration, not caller input.
        if request
            .messages
            .iter()
            .any(|m| m.sender == SenderType::System)
        {
            return Err(RelayError::InvalidRequest(
                "System turns are not accepted".to_string(),
            ));
        }
        if last.sender != SenderType::User {
            return Err(RelayError::InvalidRequest(
                "Last message must be a user turn".to_string(),
            ));
        }
        if last.text.trim().is_empty() {
            return Err(RelayError::InvalidRequest(
                "Message is required".to_string(),
            ));
        }
        if last.text.chars().count() > self.max_message_chars {
            return Err(RelayError::InvalidRequest(format!(
                "Message too long (max {} characters)",
                self.max_message_chars
            )));
        }
        Ok(())
    }
}
