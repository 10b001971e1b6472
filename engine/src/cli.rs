//! CLI interface for Menubot
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Menubot WhatsApp ordering bot
///
/// Serves the gateway webhook and the orders dashboard, and offers local
/// tools to inspect orders and rehearse conversations.
#[derive(Parser, Debug)]
#[command(name = "menubot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the webhook and dashboard server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show saved orders, newest last
    Orders {
        /// Number of orders to show (default: 10)
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print the configured menu
    Menu,

    /// Chat with the bot on stdin, one message per line
    Simulate {
        /// Sender id used for the session
        #[arg(short, long, default_value = "whatsapp:+10000000000")]
        user: String,
    },

    /// Validate configuration and storage
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["menubot", "menu"]);
        assert!(matches!(cli.command, Command::Menu));
        assert!(!cli.json);
        assert!(cli.log.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["menubot", "--json", "--log", "debug", "doctor"]);
        assert!(cli.json);
        assert_eq!(cli.log, Some("debug".to_string()));
        assert!(matches!(cli.command, Command::Doctor));
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::parse_from(["menubot", "serve", "--port", "8080"]);
        if let Command::Serve { port } = cli.command {
            assert_eq!(port, Some(8080));
        } else {
            panic!("Expected Serve command");
        }
    }

    #[test]
    fn test_orders_limit() {
        let cli = Cli::parse_from(["menubot", "orders", "--limit", "20"]);
        if let Command::Orders { limit } = cli.command {
            assert_eq!(limit, 20);
        } else {
            panic!("Expected Orders command");
        }
    }

    #[test]
    fn test_simulate_default_user() {
        let cli = Cli::parse_from(["menubot", "--config", "/tmp/c.toml", "simulate"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        if let Command::Simulate { user } = cli.command {
            assert!(user.starts_with("whatsapp:"));
        } else {
            panic!("Expected Simulate command");
        }
    }
}
