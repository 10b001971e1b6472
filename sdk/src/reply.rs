//! Outbound message descriptors
//!
//! A platform-agnostic representation of a bot reply. The transport layer
//! renders these into TwiML or WhatsApp interactive payloads.

use serde::{Deserialize, Serialize};

/// A selectable option: `id` is what the user sends back, `label` is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// Whether normalized (trimmed, lowercased) input names this choice,
    /// either by id or by its displayed label
    pub fn matches(&self, input: &str) -> bool {
        self.id == input || self.label.trim().to_lowercase() == input
    }
}

/// A named group of rows in a list prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<Choice>,
}

/// A bot reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Plain text
    Text { body: String },
    /// Text with a short ordered set of reply buttons
    Buttons { body: String, choices: Vec<Choice> },
    /// Text with a sectioned list of rows
    List {
        body: String,
        button: String,
        sections: Vec<ListSection>,
    },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn buttons(body: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self::Buttons {
            body: body.into(),
            choices,
        }
    }

    pub fn list(body: impl Into<String>, button: impl Into<String>, sections: Vec<ListSection>) -> Self {
        Self::List {
            body: body.into(),
            button: button.into(),
            sections,
        }
    }

    /// The message text, whatever the kind
    pub fn body(&self) -> &str {
        match self {
            Self::Text { body } | Self::Buttons { body, .. } | Self::List { body, .. } => body,
        }
    }

    /// All selectable options in display order
    pub fn choices(&self) -> Vec<&Choice> {
        match self {
            Self::Text { .. } => Vec::new(),
            Self::Buttons { choices, .. } => choices.iter().collect(),
            Self::List { sections, .. } => sections.iter().flat_map(|s| s.rows.iter()).collect(),
        }
    }

    /// Whether the user is offered an option with this id
    pub fn offers(&self, id: &str) -> bool {
        self.choices().iter().any(|c| c.id == id)
    }
}
