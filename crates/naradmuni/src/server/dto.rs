//! Wire types for the relay's HTTP endpoints.
use naradmuni_core::completion::{ChatMessage, SenderType};
use naradmuni_core::relay::{ChatRequest, ChatResponse};
use serde::{Deserialize, Serialize};

/// Speaker role accepted on the wire. The persona prompt is server-owned,
/// so callers may only submit user and assistant turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the submitted conversation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatApiRequest {
    pub messages: Vec<ChatTurn>,
}

impl ChatApiRequest {
    pub fn into_chat_request(self) -> ChatRequest {
        ChatRequest {
            messages: self
                .messages
                .into_iter()
                .map(|turn| ChatMessage {
                    text: turn.text,
                    sender: match turn.role {
                        Role::User => SenderType::User,
                        Role::Assistant => SenderType::Assistant,
                    },
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatApiResponse {
    pub reply: String,
    pub status: String,
}

impl From<ChatResponse> for ChatApiResponse {
    fn from(response: ChatResponse) -> Self {
        Self {
            reply: response.message.text,
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub provider_configured: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: &str, message: String) -> Self {
        Self {
            error: ErrorDetail {
                kind: kind.to_string(),
                message,
            },
        }
    }
}
