// src/agent/extract.rs — Defensive response extraction
//
// The backend's response schema was never pinned down and has drifted
// between deployments. Extraction is therefore a bounded fallback chain
// over the shapes observed in the wild, not a strict decode: conversation
// array -> assistant entry -> first entry -> canned apology.

use serde_json::Value;
use tracing::debug;

use crate::session::{ChatContextEntry, ContentPart, MessageContent, MessageRole, Product};

/// Reply used when no assistant text can be located in the payload.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response. Please try again.";

/// Pull the assistant's reply text out of a design-agent payload.
pub fn assistant_text(payload: &Value) -> String {
    let Some(conversation) = payload.get("conversation").and_then(Value::as_array) else {
        return FALLBACK_REPLY.to_string();
    };

    let assistant = conversation.iter().find(|entry| {
        entry.get("role").and_then(Value::as_str) == Some("assistant")
            || entry.get("type").and_then(Value::as_str) == Some("assistant")
    });

    if let Some(text) = assistant.and_then(|entry| content_text(entry.get("content")?)) {
        return text;
    }

    // No tagged assistant entry: fall back to the first element.
    if let Some(text) = conversation
        .first()
        .and_then(|entry| content_text(entry.get("content")?))
    {
        return text;
    }

    FALLBACK_REPLY.to_string()
}

/// Flatten a content value: a bare string, or the joined text parts of an
/// array-of-parts message.
fn content_text(content: &Value) -> Option<String> {
    if let Some(text) = content.as_str() {
        return Some(text.to_string());
    }
    let parts = content.as_array()?;
    let joined = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Extract product recommendations. Products only count when at least one
/// of them has non-empty shopping results; otherwise the turn is treated
/// as having no products at all, not partial products.
pub fn products(payload: &Value) -> Vec<Product> {
    let Some(raw) = payload.get("products").and_then(Value::as_array) else {
        return Vec::new();
    };

    let parsed: Vec<Product> = raw
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(product) => Some(product),
            Err(e) => {
                debug!("Skipping unparseable product entry: {e}");
                None
            }
        })
        .collect();

    if parsed.iter().any(Product::has_results) {
        parsed
    } else {
        Vec::new()
    }
}

/// Copy of the conversation with image parts stripped from user turns;
/// the generate-image endpoint receives its reference images separately.
pub fn strip_image_parts(context: &[ChatContextEntry]) -> Vec<ChatContextEntry> {
    context
        .iter()
        .map(|entry| match (&entry.role, &entry.content) {
            (MessageRole::User, MessageContent::Parts(parts)) => ChatContextEntry {
                role: entry.role,
                content: MessageContent::Parts(
                    parts
                        .iter()
                        .filter(|p| !matches!(p, ContentPart::InputImage { .. }))
                        .cloned()
                        .collect(),
                ),
            },
            _ => entry.clone(),
        })
        .collect()
}

/// First image the user uploaded anywhere in the conversation, if any.
pub fn first_user_image(context: &[ChatContextEntry]) -> Option<String> {
    context
        .iter()
        .filter(|entry| entry.role == MessageRole::User)
        .flat_map(|entry| entry.content.image_urls())
        .next()
        .map(str::to_string)
}
