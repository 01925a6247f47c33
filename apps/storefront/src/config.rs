//! # Storefront Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     JEWELBOX_DB_PATH=/srv/jewelbox/shop.db                             │
//! │     JEWELBOX_LOCAL_SHIPPING=1800                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/jewelbox/storefront.toml (Linux)                         │
//! │     ~/Library/Application Support/com.jewelbox.storefront/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ₪ symbol, ₪20 local / ₪70 other / ₪25 unknown area                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [store]
//! name = "Jewelbox"
//! currency_symbol = "₪"
//!
//! [shipping]            # agorot
//! default_area = 2500
//! cart_preview_estimate = 2000
//! local = 2000
//! other = 7000
//!
//! [database]
//! path = "/var/lib/jewelbox/jewelbox.db"
//! max_connections = 5
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use jewelbox_core::{
    Money, ShippingRates, CART_PREVIEW_SHIPPING_ESTIMATE, CURRENCY_SYMBOL, DEFAULT_AREA_SHIPPING,
    LOCAL_AREA_SHIPPING, OTHER_AREA_SHIPPING,
};

const CONFIG_FILE_NAME: &str = "storefront.toml";
const DB_FILE_NAME: &str = "jewelbox.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Store Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Symbol placed before every displayed amount.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Jewelbox".to_string()
}

fn default_currency_symbol() -> String {
    CURRENCY_SYMBOL.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Shipping Settings
// =============================================================================

/// Shipping surcharges, in agorot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSettings {
    /// Delivery chosen but no area picked yet.
    #[serde(default = "default_area_shipping")]
    pub default_area: i64,

    /// "Shipping from" hint on the cart page. Never charged.
    #[serde(default = "default_cart_preview_estimate")]
    pub cart_preview_estimate: i64,

    #[serde(default = "default_local_shipping")]
    pub local: i64,

    #[serde(default = "default_other_shipping")]
    pub other: i64,
}

fn default_area_shipping() -> i64 {
    DEFAULT_AREA_SHIPPING.minor()
}

fn default_cart_preview_estimate() -> i64 {
    CART_PREVIEW_SHIPPING_ESTIMATE.minor()
}

fn default_local_shipping() -> i64 {
    LOCAL_AREA_SHIPPING.minor()
}

fn default_other_shipping() -> i64 {
    OTHER_AREA_SHIPPING.minor()
}

impl Default for ShippingSettings {
    fn default() -> Self {
        ShippingSettings {
            default_area: default_area_shipping(),
            cart_preview_estimate: default_cart_preview_estimate(),
            local: default_local_shipping(),
            other: default_other_shipping(),
        }
    }
}

impl From<ShippingSettings> for ShippingRates {
    fn from(s: ShippingSettings) -> Self {
        ShippingRates {
            local: Money::from_minor(s.local),
            other: Money::from_minor(s.other),
            default_area: Money::from_minor(s.default_area),
            cart_preview_estimate: Money::from_minor(s.cart_preview_estimate),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    /// The configured path, or `jewelbox.db` in the platform data directory,
    /// or the working directory when no home is available.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }

        match project_dirs() {
            Some(dirs) => dirs.data_dir().join(DB_FILE_NAME),
            None => {
                warn!("No platform data directory; using the working directory");
                PathBuf::from(DB_FILE_NAME)
            }
        }
    }
}

// =============================================================================
// Storefront Configuration
// =============================================================================

/// Complete storefront configuration.
///
/// ## Default Values
/// - Store: "Jewelbox", symbol "₪"
/// - Shipping: ₪25 unknown area, ₪20 cart estimate, ₪20 local, ₪70 other
/// - Database: platform data dir, 5 connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub shipping: ShippingSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl StorefrontConfig {
    /// Loads from a TOML file, applies environment overrides and validates.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        debug!(path = %path.display(), "Loading storefront config");

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: StorefrontConfig = toml::from_str(&contents)?;
        config.apply_env_overrides();
        config.validate()?;

        info!(path = %path.display(), store = %config.store.name, "Loaded storefront config");
        Ok(config)
    }

    /// Loads the default config file if present, otherwise uses defaults.
    /// Environment overrides apply either way.
    pub fn load_or_default() -> ConfigResult<Self> {
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::load(&path);
            }
            debug!(path = %path.display(), "No config file; using defaults");
        }

        let mut config = StorefrontConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "Saved storefront config");
        Ok(())
    }

    /// Applies `JEWELBOX_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("JEWELBOX_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(symbol) = std::env::var("JEWELBOX_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }

        override_from_env("JEWELBOX_DEFAULT_AREA_SHIPPING", &mut self.shipping.default_area);
        override_from_env(
            "JEWELBOX_CART_PREVIEW_SHIPPING",
            &mut self.shipping.cart_preview_estimate,
        );
        override_from_env("JEWELBOX_LOCAL_SHIPPING", &mut self.shipping.local);
        override_from_env("JEWELBOX_OTHER_SHIPPING", &mut self.shipping.other);
        override_from_env("JEWELBOX_MAX_CONNECTIONS", &mut self.database.max_connections);
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.currency_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("currency_symbol cannot be empty".into()));
        }

        let rates = [
            ("default_area", self.shipping.default_area),
            ("cart_preview_estimate", self.shipping.cart_preview_estimate),
            ("local", self.shipping.local),
            ("other", self.shipping.other),
        ];
        for (name, value) in rates {
            if value < 0 {
                return Err(ConfigError::Invalid(format!(
                    "shipping.{name} cannot be negative (got {value})"
                )));
            }
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be at least 1".into()));
        }

        Ok(())
    }

    pub fn shipping_rates(&self) -> ShippingRates {
        ShippingRates::from(self.shipping)
    }

    /// Formats an amount with the configured symbol: "₪149.90".
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.store.currency_symbol)
    }
}

fn override_from_env<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(var) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(var, value = %raw, "Ignoring unparseable environment override"),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "jewelbox", "storefront")
}

/// `storefront.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

// =============================================================================
// Unit Tests
// =============================================================================
