//! TwiML `<Response><Message>` replies
//!
//! TwiML has no native buttons, so choices are appended to the body as
//! reply hints the user can type back.

use quick_xml::escape::escape;
use sdk::OutboundMessage;

pub const CONTENT_TYPE: &str = "application/xml";

/// Message text with reply hints for any choices
pub fn plain_text(message: &OutboundMessage) -> String {
    let mut text = message.body().to_string();
    let choices = message.choices();
    if !choices.is_empty() {
        text.push_str("\n\nReply with:");
        for choice in choices {
            if choice.id == choice.label {
                text.push_str(&format!("\n• {}", choice.id));
            } else {
                text.push_str(&format!("\n• {} ({})", choice.id, choice.label));
            }
        }
    }
    text
}

pub fn render(message: &OutboundMessage) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(plain_text(message).as_str())
    )
}
