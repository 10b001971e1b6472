//! WhatsApp Cloud API interactive message payloads

use sdk::OutboundMessage;
use serde_json::{json, Value};

use crate::conversation::prompts::MAX_BUTTONS;

pub const CONTENT_TYPE: &str = "application/json";

/// WhatsApp limit on reply button titles
pub const MAX_BUTTON_TITLE: usize = 20;
/// WhatsApp limit on list row titles
pub const MAX_ROW_TITLE: usize = 24;
/// WhatsApp limit on rows across all sections of one list
pub const MAX_LIST_ROWS: usize = 10;

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn render(message: &OutboundMessage, recipient: &str) -> Value {
    let recipient = recipient.strip_prefix("whatsapp:").unwrap_or(recipient);

    let payload = match message {
        OutboundMessage::Text { body } => json!({
            "type": "text",
            "text": { "body": body },
        }),
        OutboundMessage::Buttons { body, choices } => {
            let buttons: Vec<Value> = choices
                .iter()
                .take(MAX_BUTTONS)
                .map(|c| {
                    json!({
                        "type": "reply",
                        "reply": { "id": c.id, "title": truncate(&c.label, MAX_BUTTON_TITLE) },
                    })
                })
                .collect();
            json!({
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": { "text": body },
                    "action": { "buttons": buttons },
                },
            })
        }
        OutboundMessage::List {
            body,
            button,
            sections,
        } => {
            let mut remaining = MAX_LIST_ROWS;
            let mut rendered = Vec::new();
            for section in sections {
                if remaining == 0 {
                    break;
                }
                let rows: Vec<Value> = section
                    .rows
                    .iter()
                    .take(remaining)
                    .map(|r| json!({ "id": r.id, "title": truncate(&r.label, MAX_ROW_TITLE) }))
                    .collect();
                if rows.is_empty() {
                    continue;
                }
                remaining -= rows.len();
                rendered.push(json!({ "title": section.title, "rows": rows }));
            }
            let sections = rendered;
            json!({
                "type": "interactive",
                "interactive": {
                    "type": "list",
                    "body": { "text": body },
                    "action": { "button": button, "sections": sections },
                },
            })
        }
    };

    let mut envelope = json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": recipient,
    });
    if let (Some(envelope), Value::Object(payload)) = (envelope.as_object_mut(), payload) {
        envelope.extend(payload);
    }
    envelope
}
