// src/session/mod.rs — Chat session data model

pub mod repository;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One independent conversation thread: id, history, recommended products,
/// and the outcome of the last backend call. Serialized field names are the
/// on-disk document format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub conversation: Vec<ChatContextEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default)]
    pub status: SessionStatus,
}

impl ChatSession {
    /// Create an empty session with a fresh opaque id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            session_id: format!("session-{}", Uuid::new_v4()),
            created_at: Utc::now(),
            title: title.into(),
            conversation: Vec::new(),
            products: None,
            status: SessionStatus::Idle,
        }
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatContextEntry {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl ChatContextEntry {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Message body: either plain text, or a sequence of typed parts so that a
/// turn mixing text and images still serializes as one entry. On the wire
/// this is a bare JSON string or an array of `{type, ...}` objects, the
/// shape the backend expects. Once persisted, the shape never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Visible text of the entry (image parts contribute nothing).
    pub fn display_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::InputText { text } => Some(text.as_str()),
                    ContentPart::InputImage { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Image URLs attached to the entry, in order.
    pub fn image_urls(&self) -> Vec<&str> {
        match self {
            MessageContent::Text(_) => Vec::new(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::InputImage { image_url } => Some(image_url.as_str()),
                    ContentPart::InputText { .. } => None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    InputText { text: String },
    InputImage { image_url: String },
}

/// Coarse outcome of the last backend operation for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    #[serde(rename = "")]
    Idle,
    #[serde(rename = "generating")]
    Generating,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "error")]
    Error,
}

/// A recommended shoppable item bundle attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<String>>,
    pub shopping_search: ShoppingSearch,
}

impl Product {
    /// A product is only selectable when it has at least one purchasable
    /// option behind it.
    pub fn has_results(&self) -> bool {
        !self.shopping_search.shopping_results.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingSearch {
    pub results_count: u32,
    pub search_query: String,
    pub shopping_results: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Display string straight from the shopping source ("$1,299.00"),
    /// deliberately not parsed into a number.
    pub price: String,
    pub thumbnail: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_content_serializes_as_bare_string() {
        let entry = ChatContextEntry::user(MessageContent::Text("red sofa".into()));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "red sofa");
    }

    #[test]
    fn test_parts_content_serializes_as_typed_array() {
        let entry = ChatContextEntry::user(MessageContent::Parts(vec![
            ContentPart::InputText {
                text: "make it cozy".into(),
            },
            ContentPart::InputImage {
                image_url: "data:image/png;base64,AAAA".into(),
            },
        ]));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["content"][0]["type"], "input_text");
        assert_eq!(json["content"][0]["text"], "make it cozy");
        assert_eq!(json["content"][1]["type"], "input_image");
        assert_eq!(json["content"][1]["image_url"], "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_content_union_round_trips() {
        let text: MessageContent = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(text, MessageContent::Text("hello".into()));

        let parts: MessageContent =
            serde_json::from_str(r#"[{"type":"input_text","text":"hi"}]"#).unwrap();
        assert_eq!(
            parts,
            MessageContent::Parts(vec![ContentPart::InputText { text: "hi".into() }])
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Idle).unwrap(),
            "\"\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Generating).unwrap(),
            "\"generating\""
        );
        let parsed: SessionStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, SessionStatus::Error);
    }

    #[test]
    fn test_session_document_field_names() {
        let session = ChatSession::new("New Chat");
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("sessionId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("conversation").is_some());
        // products omitted entirely until first set
        assert!(json.get("products").is_none());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = ChatSession::new("a");
        let b = ChatSession::new("b");
        assert_ne!(a.session_id, b.session_id);
        assert!(a.session_id.starts_with("session-"));
    }

    #[test]
    fn test_display_text_joins_text_parts_only() {
        let content = MessageContent::Parts(vec![
            ContentPart::InputText { text: "a".into() },
            ContentPart::InputImage {
                image_url: "x".into(),
            },
            ContentPart::InputText { text: "b".into() },
        ]);
        assert_eq!(content.display_text(), "a b");
        assert_eq!(content.image_urls(), vec!["x"]);
    }
}
