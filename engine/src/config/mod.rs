//! Configuration management
//!
//! This module handles loading, validation, and management of the Menubot configuration.
//! Configuration is stored in TOML format at ~/.menubot/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level, data directory
//! - **server**: Webhook listen address
//! - **transport**: Reply markup (TwiML or WhatsApp interactive JSON)
//! - **dashboard**: Shared secret for the order dashboard
//! - **storage**: Order recorder backend and locations
//! - **session**: Idle expiry of conversations
//! - **checkout**: Detail collection and payment methods
//! - **menu**: Currency symbol and the category/item catalog
//!
//! # Environment Overrides
//!
//! `MENUBOT_DASHBOARD_KEY` replaces `dashboard.key` when set and non-empty.
//!
//! # Examples
//!
//! ```no_run
//! use menubot_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//! println!("Listening on {}:{}", config.server.host, config.server.port);
//! # Ok(())
//! # }
//! ```

use sdk::errors::BotError;
use sdk::MenuItem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::secrets::SecretString;

/// Environment variable overriding the dashboard key
pub const DASHBOARD_KEY_ENV: &str = "MENUBOT_DASHBOARD_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    pub core: CoreConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Reply rendering
    #[serde(default)]
    pub transport: TransportConfig,

    /// Dashboard access
    pub dashboard: DashboardConfig,

    /// Order persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conversation sessions
    #[serde(default)]
    pub session: SessionConfig,

    /// Checkout flow
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Menu catalog
    #[serde(default)]
    pub menu: MenuConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Data directory path (supports ~ expansion)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Reply markup expected by the messaging gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportFormat {
    /// Twilio TwiML XML
    Twiml,
    /// WhatsApp Cloud API interactive message JSON
    Interactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_transport_format")]
    pub format: TransportFormat,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Shared secret passed as `?key=` to the dashboard
    pub key: SecretString,
}

/// Order recorder backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per order
    Files,
    /// SQLite database
    Sqlite,
}

/// Order storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    /// Directory for order files (defaults to `<data_dir>/orders`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders_dir: Option<PathBuf>,

    /// SQLite file (defaults to `<data_dir>/orders.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

/// Session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Reset conversations idle for longer than this. Unset keeps them forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
}

/// A payment option offered at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    pub id: String,
    pub label: String,
}

/// Checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Ask for order type, name and table/address before payment
    #[serde(default)]
    pub collect_details: bool,

    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<PaymentMethodConfig>,
}

/// A menu category with its items in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub key: String,
    pub title: String,
    pub items: Vec<MenuItem>,
}

/// Menu configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.menubot")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_transport_format() -> TransportFormat {
    TransportFormat::Twiml
}

fn default_dashboard_key() -> SecretString {
    SecretString::new("restaurant123")
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::Files
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_payment_methods() -> Vec<PaymentMethodConfig> {
    vec![
        PaymentMethodConfig {
            id: "upi".to_string(),
            label: "💳 UPI".to_string(),
        },
        PaymentMethodConfig {
            id: "cash".to_string(),
            label: "💵 Cash at Counter".to_string(),
        },
    ]
}

fn category(key: &str, title: &str, items: &[(&str, &str, u32)]) -> CategoryConfig {
    CategoryConfig {
        key: key.to_string(),
        title: title.to_string(),
        items: items
            .iter()
            .map(|(id, name, price)| MenuItem::new(*id, *name, *price))
            .collect(),
    }
}

/// The restaurant menu shipped with Menubot
pub fn default_categories() -> Vec<CategoryConfig> {
    vec![
        category(
            "starters",
            "🥗 Starters",
            &[
                ("chicken_wings", "Chicken Wings", 180),
                ("veg_roll", "Veg Spring Roll", 120),
                ("paneer_tikka", "Paneer Tikka", 160),
            ],
        ),
        category(
            "main_course",
            "🍛 Main Course",
            &[
                ("chicken_biryani", "Chicken Biryani", 250),
                ("paneer_butter", "Paneer Butter Masala", 220),
                ("fried_rice", "Veg Fried Rice", 180),
            ],
        ),
        category(
            "desserts",
            "🍰 Desserts",
            &[("gulab_jamun", "Gulab Jamun", 80), ("ice_cream", "Ice Cream", 90)],
        ),
        category(
            "drinks",
            "🥤 Soft Drinks",
            &[("coke", "Coca Cola", 50), ("sprite", "Sprite", 50)],
        ),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            format: default_transport_format(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            orders_dir: None,
            database_path: None,
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            collect_details: false,
            payment_methods: default_payment_methods(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            categories: default_categories(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core: CoreConfig {
                log_level: default_log_level(),
                data_dir: default_data_dir(),
            },
            server: ServerConfig::default(),
            transport: TransportConfig::default(),
            dashboard: DashboardConfig {
                key: default_dashboard_key(),
            },
            storage: StorageConfig::default(),
            session: SessionConfig::default(),
            checkout: CheckoutConfig::default(),
            menu: MenuConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.menubot/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, TOML parsing
    /// fails, or validation fails.
    pub fn load_or_create() -> Result<Self, BotError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, BotError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse, apply environment overrides and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, BotError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| BotError::Config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides();
        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, BotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BotError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let config = Self::default();

        // Write the unexpanded defaults so the file stays portable
        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| BotError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| BotError::Config(format!("Failed to write config file: {}", e)))?;

        let mut config = config;
        config.apply_env_overrides();
        config.validate_and_process()?;
        Ok(config)
    }

    /// Get the default configuration file path (~/.menubot/config.toml)
    fn default_config_path() -> Result<PathBuf, BotError> {
        let home = dirs::home_dir()
            .ok_or_else(|| BotError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(".menubot").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(DASHBOARD_KEY_ENV) {
            if !key.trim().is_empty() {
                self.dashboard.key = SecretString::new(key.trim());
            }
        }
    }

    /// Directory holding one JSON file per order
    pub fn orders_dir(&self) -> PathBuf {
        self.storage
            .orders_dir
            .clone()
            .unwrap_or_else(|| self.core.data_dir.join("orders"))
    }

    /// SQLite database file for the sqlite backend
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| self.core.data_dir.join("orders.db"))
    }

    /// Whether the shipped placeholder key is still in use
    pub fn uses_default_dashboard_key(&self) -> bool {
        self.dashboard.key.matches(default_dashboard_key().unsecure())
    }

    /// Validate and process configuration
    ///
    /// This method:
    /// - Validates log level, dashboard key, payment methods and menu
    /// - Expands ~ in paths
    /// - Creates the data directory if it doesn't exist
    pub fn validate_and_process(&mut self) -> Result<(), BotError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(BotError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.dashboard.key.is_blank() {
            return Err(BotError::Config("dashboard.key must not be empty".to_string()));
        }

        if self.session.idle_timeout_secs == Some(0) {
            return Err(BotError::Config(
                "session.idle_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.checkout.payment_methods.is_empty() {
            return Err(BotError::Config(
                "checkout.payment_methods must list at least one method".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for method in &mut self.checkout.payment_methods {
            method.id = method.id.trim().to_lowercase();
            if method.id.is_empty() || !seen.insert(method.id.clone()) {
                return Err(BotError::Config(format!(
                    "Invalid or duplicate payment method id '{}'",
                    method.id
                )));
            }
        }

        // Surface menu problems at startup rather than mid-conversation
        crate::catalog::Catalog::from_config(&self.menu)?;

        self.core.data_dir = expand_path(&self.core.data_dir)?;
        if let Some(dir) = &self.storage.orders_dir {
            self.storage.orders_dir = Some(expand_path(dir)?);
        }
        if let Some(path) = &self.storage.database_path {
            self.storage.database_path = Some(expand_path(path)?);
        }

        if !self.core.data_dir.exists() {
            fs::create_dir_all(&self.core.data_dir).map_err(|e| {
                BotError::Config(format!("Failed to create data directory: {}", e))
            })?;
        }

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, BotError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| BotError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| BotError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| BotError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
