//! # Service Configuration
//!
//! Configuration management for the quote workflow.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUOTE_DB_PATH=/data/quotes.db                                      │
//! │     QUOTE_RATE_SALE=1.4                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/quotemaker/quotemaker.toml (Linux)                       │
//! │     ~/Library/Application Support/kr.hanapf.quotemaker/... (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     sale 1.3 / rental 1.0 / re_event 0.3, 5 allocation attempts        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/quotemaker/quotes.db"
//! max_connections = 5
//!
//! [pricing.rates]
//! sale = 1.3
//! rental = 1.0
//! re_event = 0.3
//!
//! [riders]
//! select_print_price = 150000
//! ksnet_price = 300000
//!
//! [allocation]
//! max_attempts = 5
//!
//! [notification]
//! app_url = "http://localhost:3000"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use quote_core::types::PriceRate;
use quote_core::validation;
use quote_core::{Money, PricingEngine, QuoteType, RateTable, RiderPrices};
use quote_db::{DbConfig, DEFAULT_ALLOCATION_ATTEMPTS};

const CONFIG_FILE_NAME: &str = "quotemaker.toml";
const DATABASE_FILE_NAME: &str = "quotes.db";

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// `[pricing.rates]`, as multipliers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSettings {
    #[serde(default = "default_sale_rate")]
    pub sale: f64,

    #[serde(default = "default_rental_rate")]
    pub rental: f64,

    #[serde(default = "default_re_event_rate")]
    pub re_event: f64,
}

fn default_sale_rate() -> f64 {
    QuoteType::Sale.default_rate().multiplier()
}

fn default_rental_rate() -> f64 {
    QuoteType::Rental.default_rate().multiplier()
}

fn default_re_event_rate() -> f64 {
    QuoteType::ReEvent.default_rate().multiplier()
}

impl Default for RateSettings {
    fn default() -> Self {
        RateSettings {
            sale: default_sale_rate(),
            rental: default_rental_rate(),
            re_event: default_re_event_rate(),
        }
    }
}

/// `[pricing]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default)]
    pub rates: RateSettings,
}

/// `[riders]`, flat prices at 1.0× in won.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderSettings {
    #[serde(default = "default_select_print_price")]
    pub select_print_price: i64,

    #[serde(default = "default_ksnet_price")]
    pub ksnet_price: i64,
}

fn default_select_print_price() -> i64 {
    RiderPrices::default().select_print.won()
}

fn default_ksnet_price() -> i64 {
    RiderPrices::default().ksnet.won()
}

impl Default for RiderSettings {
    fn default() -> Self {
        RiderSettings {
            select_print_price: default_select_print_price(),
            ksnet_price: default_ksnet_price(),
        }
    }
}

/// `[allocation]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSettings {
    /// Insert attempts per quote before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    DEFAULT_ALLOCATION_ATTEMPTS
}

impl Default for AllocationSettings {
    fn default() -> Self {
        AllocationSettings {
            max_attempts: default_max_attempts(),
        }
    }
}

/// `[notification]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Base URL used to build review links.
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            app_url: default_app_url(),
        }
    }
}

// =============================================================================
// QuoteConfig
// =============================================================================

/// Complete workflow configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub riders: RiderSettings,

    #[serde(default)]
    pub allocation: AllocationSettings,

    #[serde(default)]
    pub notification: NotificationSettings,
}

impl QuoteConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`quotemaker.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses TOML without applying overrides or validation.
    pub fn from_toml_str(contents: &str) -> ServiceResult<Self> {
        toml::from_str(contents).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        self.rate_table()?;

        for (field, price) in [
            ("riders.select_print_price", self.riders.select_print_price),
            ("riders.ksnet_price", self.riders.ksnet_price),
        ] {
            validation::validate_price(field, price)
                .map_err(|e| ServiceError::Config(e.to_string()))?;
        }

        if self.allocation.max_attempts == 0 {
            return Err(ServiceError::Config(
                "allocation.max_attempts must be greater than 0".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ServiceError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `QUOTE_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("QUOTE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup("QUOTE_MAX_ALLOCATION_ATTEMPTS") {
            match value.parse::<u32>() {
                Ok(n) => self.allocation.max_attempts = n,
                Err(_) => warn!(value = %value, "Ignoring invalid QUOTE_MAX_ALLOCATION_ATTEMPTS"),
            }
        }

        let rates = &mut self.pricing.rates;
        for (key, slot) in [
            ("QUOTE_RATE_SALE", &mut rates.sale),
            ("QUOTE_RATE_RENTAL", &mut rates.rental),
            ("QUOTE_RATE_RE_EVENT", &mut rates.re_event),
        ] {
            if let Some(value) = lookup(key) {
                match value.parse::<f64>() {
                    Ok(rate) => {
                        debug!(key, rate, "Overriding rate from environment");
                        *slot = rate;
                    }
                    Err(_) => warn!(key, value = %value, "Ignoring invalid rate override"),
                }
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("kr", "hanapf", "quotemaker")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Configured or platform-default database file.
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref path) = self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("kr", "hanapf", "quotemaker")
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
            .max_connections(self.database.max_connections)
            .max_allocation_attempts(self.allocation.max_attempts)
    }

    pub fn rate_table(&self) -> ServiceResult<RateTable> {
        let rates = &self.pricing.rates;
        Ok(RateTable::empty()
            .with_rate(QuoteType::Sale, PriceRate::from_multiplier(rates.sale)?)
            .with_rate(QuoteType::Rental, PriceRate::from_multiplier(rates.rental)?)
            .with_rate(QuoteType::ReEvent, PriceRate::from_multiplier(rates.re_event)?))
    }

    pub fn rider_prices(&self) -> RiderPrices {
        RiderPrices {
            select_print: Money::from_won(self.riders.select_print_price),
            ksnet: Money::from_won(self.riders.ksnet_price),
        }
    }

    pub fn pricing_engine(&self) -> ServiceResult<PricingEngine> {
        Ok(PricingEngine::new(self.rate_table()?, self.rider_prices()))
    }
}
