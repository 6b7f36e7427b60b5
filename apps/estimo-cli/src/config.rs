//! # CLI Configuration
//!
//! Settings for currency display, quote defaults and the database.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --db ./quotes.db                                                   │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     ESTIMO_DB_PATH=/srv/estimo/quotes.db                               │
//! │     ESTIMO_TAX_RATE=8.25                                               │
//! │     ESTIMO_CURRENCY_SYMBOL=€                                           │
//! │     ESTIMO_DECIMAL_PRECISION=2                                         │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/estimo/estimo.toml (Linux)                               │
//! │     ~/Library/Application Support/com.estimo.estimo/estimo.toml (macOS)│
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     $ with 2 places, 0% tax, estimo.db in the platform data dir        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # estimo.toml
//! [currency]
//! symbol = "$"
//! decimal_precision = 2
//! thousands_separator = ","
//!
//! [quote]
//! default_tax_rate = "8.25"   # percent
//!
//! [database]
//! path = "/home/me/estimo/quotes.db"
//! max_connections = 4
//! busy_timeout_secs = 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use estimo_core::format::MAX_DECIMAL_PRECISION;
use estimo_core::numeric::parse_lenient;
use estimo_core::validation::validate_tax_rate;
use estimo_core::{CurrencyFormat, TaxRate};
use estimo_db::DbConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine a data directory; set ESTIMO_DB_PATH or [database].path")]
    NoDataDir,
}

// =============================================================================
// Sections
// =============================================================================

/// `[currency]`: how amounts are displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_precision")]
    pub decimal_precision: u32,

    /// One character, or empty for no grouping.
    #[serde(default = "default_separator")]
    pub thousands_separator: String,
}

fn default_symbol() -> String {
    "$".to_string()
}

fn default_precision() -> u32 {
    2
}

fn default_separator() -> String {
    ",".to_string()
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            symbol: default_symbol(),
            decimal_precision: default_precision(),
            thousands_separator: default_separator(),
        }
    }
}

/// `[quote]`: defaults for new quotes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSettings {
    /// Percent applied to a quote's subtotal when the request has no rate.
    #[serde(
        default,
        deserialize_with = "estimo_core::numeric::lenient_decimal_or_zero"
    )]
    pub default_tax_rate: Decimal,
}

/// `[database]`: where quotes are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Defaults to `estimo.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    4
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

// =============================================================================
// App Configuration
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub quote: QuoteSettings,

    #[serde(default)]
    pub database: DatabaseSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (an explicit path must exist; the default path may not)
    /// 3. Environment variables
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.decimal_precision > MAX_DECIMAL_PRECISION {
            return Err(ConfigError::InvalidValue(format!(
                "currency.decimal_precision (at most {})",
                MAX_DECIMAL_PRECISION
            )));
        }

        if self.currency.thousands_separator.chars().count() > 1 {
            return Err(ConfigError::InvalidValue(
                "currency.thousands_separator (one character or empty)".into(),
            ));
        }

        validate_tax_rate(self.default_tax_rate())
            .map_err(|e| ConfigError::InvalidValue(format!("quote.default_tax_rate ({})", e)))?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections (must be greater than 0)".into(),
            ));
        }

        Ok(())
    }

    /// Applies `ESTIMO_*` overrides read through `lookup`.
    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ESTIMO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(rate) = lookup("ESTIMO_TAX_RATE") {
            let value = parse_lenient(&serde_json::Value::String(rate))
                .ok_or_else(|| ConfigError::InvalidValue("ESTIMO_TAX_RATE".into()))?;
            self.quote.default_tax_rate = value;
        }

        if let Some(symbol) = lookup("ESTIMO_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(precision) = lookup("ESTIMO_DECIMAL_PRECISION") {
            self.currency.decimal_precision = precision
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue("ESTIMO_DECIMAL_PRECISION".into()))?;
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "estimo", "estimo")
            .map(|dirs| dirs.config_dir().join("estimo.toml"))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// The display formatter for this configuration.
    pub fn currency_format(&self) -> CurrencyFormat {
        let format = CurrencyFormat::new(
            self.currency.symbol.clone(),
            self.currency.decimal_precision,
        );
        match self.currency.thousands_separator.chars().next() {
            Some(separator) => format.with_thousands_separator(separator),
            None => format,
        }
    }

    pub fn default_tax_rate(&self) -> TaxRate {
        TaxRate::from_percent(self.quote.default_tax_rate)
    }

    /// Database settings, resolving the default path if none is configured.
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        let path = match &self.database.path {
            Some(path) => path.clone(),
            None => directories::ProjectDirs::from("com", "estimo", "estimo")
                .map(|dirs| dirs.data_dir().join("estimo.db"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        Ok(DbConfig::new(path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimo_core::Money;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.currency.symbol, "$");
        assert_eq!(config.currency.decimal_precision, 2);
        assert_eq!(config.default_tax_rate(), TaxRate::zero());
        assert_eq!(
            config.currency_format().format(Money::from_minor(123456)),
            "$1,234.56"
        );
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml(
            r#"
            [currency]
            symbol = "€"
            decimal_precision = 3
            thousands_separator = ""

            [quote]
            default_tax_rate = "8.25"

            [database]
            path = "/tmp/quotes.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.quote.default_tax_rate, dec!(8.25));
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/quotes.db")));
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(
            config.currency_format().format(Money::from_major(1234)),
            "€1234.000"
        );
    }

    #[test]
    fn test_numeric_tax_rate_in_toml() {
        let config = AppConfig::from_toml("[quote]\ndefault_tax_rate = 7").unwrap();
        assert_eq!(config.default_tax_rate(), TaxRate::from_percent(dec!(7)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("ESTIMO_DB_PATH", "/data/estimo.db"),
                ("ESTIMO_TAX_RATE", "6.5"),
                ("ESTIMO_CURRENCY_SYMBOL", "£"),
                ("ESTIMO_DECIMAL_PRECISION", "0"),
            ]))
            .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/data/estimo.db")));
        assert_eq!(config.default_tax_rate(), TaxRate::from_bps(650));
        assert_eq!(config.currency.symbol, "£");
        assert_eq!(config.currency.decimal_precision, 0);
    }

    #[test]
    fn test_bad_tax_rate_env() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(env(&[("ESTIMO_TAX_RATE", "lots")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_bad_decimal_precision_env() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(env(&[("ESTIMO_DECIMAL_PRECISION", "two")]));
        match result {
            Err(ConfigError::InvalidValue(key)) => assert_eq!(key, "ESTIMO_DECIMAL_PRECISION"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
        assert_eq!(config.currency.decimal_precision, 2);

        config
            .apply_env_overrides(env(&[("ESTIMO_DECIMAL_PRECISION", " 3 ")]))
            .unwrap();
        assert_eq!(config.currency.decimal_precision, 3);
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.currency.decimal_precision = 9;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.currency.thousands_separator = "::".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.quote.default_tax_rate = dec!(120);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_config_uses_configured_path() {
        let mut config = AppConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/estimo-test.db"));
        let db = config.db_config().unwrap();
        assert_eq!(db.database_path, PathBuf::from("/tmp/estimo-test.db"));
    }
}
