//! Core protocol types for chat interactions

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl MessageRole {
    /// Lowercase wire name, as chat-native backends expect it
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Speaker tag used when turns are flattened into a single prompt
    pub fn prompt_tag(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// A single conversation turn. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Create a message with an explicit role
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Inbound chat request, shared by the blocking and the streaming call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChatRequest {
    /// Ordered conversation turns
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Project the final answer belongs to, if it should be persisted
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

impl ChatRequest {
    /// Create a request from a list of messages
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            project_id: None,
        }
    }
}

/// Non-streaming response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Full generated text
    pub text: String,
}

impl ChatResponse {
    /// Wrap generated text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserializes_inbound_shape() {
        let value = json!({
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ],
            "projectId": 7
        });

        let request: ChatRequest = serde_json::from_value(value).unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].role, MessageRole::Assistant);
        assert_eq!(request.project_id, Some(7));
    }

    #[test]
    fn test_request_defaults_missing_messages() {
        let request: ChatRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.messages.is_empty());
        assert_eq!(request.project_id, None);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: Result<Message, _> =
            serde_json::from_value(json!({"role": "system", "content": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_project_id_is_omitted_when_absent() {
        let body = serde_json::to_value(ChatRequest::new(vec![Message::user("a")])).unwrap();
        assert!(body.get("projectId").is_none());
    }
}
