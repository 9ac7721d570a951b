//! Wire types for the backend REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user.
    User,
    /// Message produced by the assistant.
    Assistant,
}

/// A single message in a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

/// A conversation session as reported by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier. Wire field is `session_id`.
    #[serde(rename = "session_id")]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last activity time.
    pub updated_at: DateTime<Utc>,
    /// Number of messages stored for this session.
    pub message_count: u32,
}

/// Request body for `POST /sessions`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionCreateRequest {
    /// Optional initial title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Request body for `POST /messages`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Session the message belongs to.
    pub session_id: String,
    /// Message text.
    pub message: String,
}

/// Response body for `POST /messages`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Session the exchange belongs to.
    pub session_id: String,
    /// Server-stored copy of the user message.
    pub user_message: ChatMessage,
    /// Generated assistant reply.
    pub assistant_message: ChatMessage,
    /// Total number of messages in the session after the exchange.
    pub total_messages: u32,
}

/// Response body for `GET /messages`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    /// Session the transcript belongs to.
    pub session_id: String,
    /// Messages in conversation order.
    pub messages: Vec<ChatMessage>,
}

/// Response body for the health endpoint `GET /`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, e.g. "ok".
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_uses_wire_field_name() {
        let json = r#"{
            "session_id": "abc-123",
            "title": "New Chat",
            "created_at": "2025-01-02T03:04:05Z",
            "updated_at": "2025-01-02T03:04:05Z",
            "message_count": 2
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id, "abc-123");
        assert_eq!(session.message_count, 2);

        let back = serde_json::to_value(&session).unwrap();
        assert_eq!(back["session_id"], "abc-123");
        assert!(back.get("id").is_none());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        let role: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn test_create_request_omits_missing_title() {
        let body = serde_json::to_string(&SessionCreateRequest::default()).unwrap();
        assert_eq!(body, "{}");

        let body = serde_json::to_string(&SessionCreateRequest {
            title: Some("New Chat".to_string()),
        })
        .unwrap();
        assert_eq!(body, r#"{"title":"New Chat"}"#);
    }
}
