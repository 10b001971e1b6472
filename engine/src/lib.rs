//! Menubot Engine Library
//!
//! This library provides the core functionality of the Menubot ordering bot.
//! It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Secret handling module
pub mod secrets;

/// Menu catalog module
pub mod catalog;

/// Per-user session store
pub mod session;

/// Conversation state machine and reply prompts
pub mod conversation;

/// Order persistence backends
pub mod orders;

/// Key-protected order dashboard
pub mod dashboard;

/// Gateway reply rendering (TwiML / interactive JSON)
pub mod transport;

/// HTTP webhook and dashboard server
pub mod server;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
