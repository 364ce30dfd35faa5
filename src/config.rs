use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use crate::pricing::{PricingPolicy, RegimeResolver, DEFAULT_TAX_RATE_PERCENT};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_SELLER_STATE: &str = "Karnataka";

/// Pricing and GST settings consumed by the breakdown engine.
///
/// `default_tax_rate_percent` is the one named place where the fallback rate
/// lives; the historical consumers disagreed (12 vs 18) and this setting keeps
/// the decision visible and overridable without touching the engine.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields, default)]
pub struct PricingConfig {
    /// Seller's home state for intra/inter-state classification
    pub seller_state: String,

    /// Additional spellings that count as the seller's state (normalized
    /// case-insensitively), e.g. the two-letter code
    pub intra_state_aliases: Vec<String>,

    /// Fallback GST rate (percent out of 100) for line items with no rate
    pub default_tax_rate_percent: Decimal,

    /// Legal name shown on invoices
    pub seller_name: String,

    /// GSTIN shown on invoices
    pub seller_gstin: Option<String>,

    /// Registered address shown on invoices
    pub seller_address: Option<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            seller_state: DEFAULT_SELLER_STATE.to_string(),
            intra_state_aliases: vec!["karnataka".to_string(), "ka".to_string()],
            default_tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            seller_name: "Storefront".to_string(),
            seller_gstin: None,
            seller_address: None,
        }
    }
}

impl PricingConfig {
    /// Builds the engine policy from this configuration.
    pub fn policy(&self) -> PricingPolicy {
        PricingPolicy {
            default_tax_rate_percent: self.default_tax_rate_percent,
            resolver: RegimeResolver::new(self.seller_state.clone(), &self.intra_state_aliases),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow any origin even outside development (explicit override)
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pricing and GST settings
    #[serde(default)]
    #[validate]
    pub pricing: PricingConfig,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("dev")
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Engine policy derived from the pricing section.
    pub fn pricing_policy(&self) -> PricingPolicy {
        self.pricing.policy()
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("storefront_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (APP_*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://storefront.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::pricing::TaxRegime;

    #[test]
    fn default_pricing_config_matches_engine_constant() {
        let cfg = PricingConfig::default();
        assert_eq!(cfg.default_tax_rate_percent, DEFAULT_TAX_RATE_PERCENT);
        assert_eq!(cfg.seller_state, "Karnataka");
    }

    #[test]
    fn pricing_policy_carries_overridden_rate() {
        let cfg = PricingConfig {
            default_tax_rate_percent: dec!(12),
            ..PricingConfig::default()
        };
        let policy = cfg.policy();
        assert_eq!(policy.default_tax_rate_percent, dec!(12));
    }

    #[test]
    fn pricing_policy_resolver_uses_configured_aliases() {
        let cfg = PricingConfig {
            seller_state: "Tamil Nadu".to_string(),
            intra_state_aliases: vec!["tn".to_string()],
            ..PricingConfig::default()
        };
        let policy = cfg.policy();
        assert_eq!(policy.resolver.resolve(Some("TN")), TaxRegime::IntraState);
        assert_eq!(
            policy.resolver.resolve(Some("Karnataka")),
            TaxRegime::InterState
        );
    }
}
