use crate::models::{OrderSide, OrderTemplate, OrderType};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Environment variables that must be present before the bot starts
pub const BINANCE_API_KEY: &str = "BINANCE_API_KEY";
pub const BINANCE_API_SECRET: &str = "BINANCE_API_SECRET";
pub const COINGECKO_API_KEY: &str = "COINGECKO_API_KEY";

const SETTINGS_FILE: &str = "solbot";
const ENV_PREFIX: &str = "SOLBOT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set.")]
    MissingEnv(&'static str),

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Non-secret bot parameters.
///
/// Layered as: built-in defaults, then an optional `solbot.toml`,
/// then `SOLBOT_*` environment variables (e.g. `SOLBOT_AMOUNT=2.5`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub symbol: String,
    pub order_type: OrderType,
    pub order_side: OrderSide,
    pub amount: f64,
    pub coin_id: String,
    pub vs_currency: String,
    pub history_days: u32,
    pub interval_secs: u64,
    pub coingecko_base_url: String,
    pub binance_base_url: String,
    pub request_timeout_secs: u64,
    pub recv_window_ms: u64,
    pub price_precision: usize,
    pub quantity_precision: usize,
    pub log_dir: String,
    pub log_file: String,
    pub log_level: String,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: "SOL/USDT".to_string(),
            order_type: OrderType::Limit,
            order_side: OrderSide::Buy,
            amount: 5.0, // SOL per order
            coin_id: "solana".to_string(),
            vs_currency: "usd".to_string(),
            history_days: 7,
            interval_secs: 86_400, // 24 hours
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            binance_base_url: "https://api.binance.com".to_string(),
            request_timeout_secs: 30,
            recv_window_ms: 5_000,
            price_precision: 2,
            quantity_precision: 3,
            log_dir: ".".to_string(),
            log_file: "trading-bot.log".to_string(),
            log_level: "info".to_string(),
            dry_run: false,
        }
    }
}

impl Settings {
    /// Load settings from `solbot.toml` (if present) and `SOLBOT_*` env vars
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(SETTINGS_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.history_days == 0 {
            return Err(ConfigError::Invalid("history_days must be at least 1".into()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid("interval_secs must be at least 1".into()));
        }
        if split_symbol(&self.symbol).is_none() {
            return Err(ConfigError::Invalid(format!(
                "symbol must look like BASE/QUOTE, got {:?}",
                self.symbol
            )));
        }
        // Stop-loss below and take-profit above the entry only make sense for a long entry
        if self.order_side != OrderSide::Buy {
            return Err(ConfigError::Invalid(
                "order_side must be buy for a stop-loss/take-profit bracket".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn order_template(&self) -> OrderTemplate {
        OrderTemplate {
            symbol: self.symbol.clone(),
            order_type: self.order_type,
            side: self.order_side,
            amount: self.amount,
        }
    }
}

/// Split `BASE/QUOTE` into its two non-empty halves
pub fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
    let (base, quote) = symbol.split_once('/')?;
    if base.is_empty() || quote.is_empty() || quote.contains('/') {
        return None;
    }
    Some((base, quote))
}

/// Secrets read from the environment at startup
#[derive(Clone)]
pub struct Credentials {
    pub binance_api_key: String,
    pub binance_api_secret: String,
    pub coingecko_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unset and empty values both count as missing; the first missing
    /// variable (in declaration order) is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };

        Ok(Self {
            binance_api_key: require(BINANCE_API_KEY)?,
            binance_api_secret: require(BINANCE_API_SECRET)?,
            coingecko_api_key: require(COINGECKO_API_KEY)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("binance_api_key", &"***")
            .field("binance_api_secret", &"***")
            .field("coingecko_api_key", &"***")
            .finish()
    }
}

/// Immutable startup configuration, built once and shared by reference
#[derive(Clone)]
pub struct Config {
    pub settings: Settings,
    pub credentials: Credentials,
    historical_url: String,
    spot_url: String,
}

impl Config {
    pub fn new(settings: Settings, credentials: Credentials) -> Self {
        let base = settings.coingecko_base_url.trim_end_matches('/');
        let historical_url = format!(
            "{}/coins/{}/market_chart?vs_currency={}&interval=daily&days={}&x_cg_demo_api_key={}",
            base,
            settings.coin_id,
            settings.vs_currency,
            settings.history_days,
            credentials.coingecko_api_key
        );
        let spot_url = format!(
            "{}/simple/price?ids={}&vs_currencies={}&x_cg_demo_api_key={}",
            base, settings.coin_id, settings.vs_currency, credentials.coingecko_api_key
        );

        Self {
            settings,
            credentials,
            historical_url,
            spot_url,
        }
    }

    pub fn historical_url(&self) -> &str {
        &self.historical_url
    }

    pub fn spot_url(&self) -> &str {
        &self.spot_url
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("credentials", &self.credentials)
            .finish()
    }
}
