use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Fraction of the subtotal taken off for members (0.10 = 10%)
    #[serde(default = "default_discount_rate")]
    pub member_discount_rate: f64,
    #[serde(default = "default_low_stock_threshold")]
    pub default_low_stock_threshold: i32,
    /// Low-stock rows at or below this quantity are flagged critical
    #[serde(default = "default_critical_stock_level")]
    pub critical_stock_level: i32,
    #[serde(default = "default_max_report_days")]
    pub max_report_days: i64,
    #[serde(default = "default_sales_list_limit")]
    pub sales_list_limit: i64,
}

fn default_discount_rate() -> f64 { 0.10 }
fn default_low_stock_threshold() -> i32 { 5 }
fn default_critical_stock_level() -> i32 { 1 }
fn default_max_report_days() -> i64 { 365 }
fn default_sales_list_limit() -> i64 { 1000 }

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            member_discount_rate: default_discount_rate(),
            default_low_stock_threshold: default_low_stock_threshold(),
            critical_stock_level: default_critical_stock_level(),
            max_report_days: default_max_report_days(),
            sales_list_limit: default_sales_list_limit(),
        }
    }
}

impl BusinessRules {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !(0.0..=1.0).contains(&self.member_discount_rate) {
            return Err(config::ConfigError::Message(format!(
                "business_rules.member_discount_rate must be within [0, 1], got {}",
                self.member_discount_rate
            )));
        }
        if self.default_low_stock_threshold < 0 || self.critical_stock_level < 0 {
            return Err(config::ConfigError::Message(
                "stock thresholds must be non-negative".to_string(),
            ));
        }
        if self.max_report_days < 1 || self.sales_list_limit < 1 {
            return Err(config::ConfigError::Message(
                "max_report_days and sales_list_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `ATLETICA_DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("ATLETICA").separator("__"))
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.business_rules.validate()?;
        Ok(config)
    }
}
