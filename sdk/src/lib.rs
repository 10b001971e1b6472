//! Menubot SDK
//!
//! Shared data model and error types for the Menubot engine.
//! This crate holds no I/O so it can be reused by other front ends.

/// Error types and handling
pub mod errors;

/// Menu, cart and order types
pub mod types;

/// Outbound message descriptors
pub mod reply;

// Re-export commonly used types
pub use errors::{BotError, BotErrorExt};
pub use reply::{Choice, ListSection, OutboundMessage};
pub use types::{
    cart_total, CartLine, MenuItem, OrderDraft, OrderRecord, OrderStatus, OrderType,
};
