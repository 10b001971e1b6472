//! Reply rendering for the messaging gateway
//!
//! The state machine produces transport-neutral `OutboundMessage`s; this
//! module turns them into the body the webhook returns.

use sdk::OutboundMessage;

use crate::config::TransportFormat;

pub mod interactive;
pub mod twiml;

/// A rendered webhook response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReply {
    pub content_type: &'static str,
    pub body: String,
}

/// Render `message` for the configured gateway
///
/// `recipient` is the sender id the reply goes back to.
pub fn render(format: TransportFormat, message: &OutboundMessage, recipient: &str) -> RenderedReply {
    match format {
        TransportFormat::Twiml => RenderedReply {
            content_type: twiml::CONTENT_TYPE,
            body: twiml::render(message),
        },
        TransportFormat::Interactive => RenderedReply {
            content_type: interactive::CONTENT_TYPE,
            body: interactive::render(message, recipient).to_string(),
        },
    }
}
