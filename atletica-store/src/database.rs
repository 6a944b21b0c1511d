use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use serde_json::Value;

use crate::app_config::{BusinessRules, DatabaseConfig};
use crate::{StoreCustomerRepository, StoreProductRepository, StoreSaleRepository};

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    pub fn customers(&self) -> Arc<StoreCustomerRepository> {
        Arc::new(StoreCustomerRepository::new(self.pool.clone()))
    }

    pub fn products(&self) -> Arc<StoreProductRepository> {
        Arc::new(StoreProductRepository::new(self.pool.clone()))
    }

    pub fn sales(&self) -> Arc<StoreSaleRepository> {
        Arc::new(StoreSaleRepository::new(self.pool.clone()))
    }

    /// Overlays rules stored in the `business_rules` table on top of the
    /// file/env configuration. Rows look like `{"value": <number>}`.
    pub async fn fetch_business_rules(&self, defaults: BusinessRules) -> Result<BusinessRules, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct RuleRow {
            rule_key: String,
            rule_value: Value,
        }

        let rows: Vec<RuleRow> = sqlx::query_as("SELECT rule_key, rule_value FROM business_rules")
            .fetch_all(&self.pool)
            .await?;

        let mut rules = defaults.clone();
        for row in rows {
            apply_rule(&mut rules, &row.rule_key, &row.rule_value);
        }

        if let Err(e) = rules.validate() {
            warn!(error = %e, "Stored business rules rejected, keeping configured values");
            return Ok(defaults);
        }

        Ok(rules)
    }
}

fn as_i32(key: &str, value: &Value) -> Option<i32> {
    let n = value.as_i64()?;
    match i32::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(rule = key, value = n, "Stored business rule out of range, ignored");
            None
        }
    }
}

fn apply_rule(rules: &mut BusinessRules, key: &str, value: &Value) {
    let Some(v) = value.get("value") else {
        return;
    };

    match key {
        "member_discount_rate" => if let Some(f) = v.as_f64() { rules.member_discount_rate = f; },
        "default_low_stock_threshold" => if let Some(n) = as_i32(key, v) { rules.default_low_stock_threshold = n; },
        "critical_stock_level" => if let Some(n) = as_i32(key, v) { rules.critical_stock_level = n; },
        "max_report_days" => if let Some(n) = v.as_i64() { rules.max_report_days = n; },
        "sales_list_limit" => if let Some(n) = v.as_i64() { rules.sales_list_limit = n; },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_rule_overrides_known_keys() {
        let mut rules = BusinessRules::default();
        apply_rule(&mut rules, "member_discount_rate", &json!({"value": 0.2}));
        apply_rule(&mut rules, "default_low_stock_threshold", &json!({"value": 3}));
        apply_rule(&mut rules, "unknown_rule", &json!({"value": 42}));
        apply_rule(&mut rules, "sales_list_limit", &json!({"wrong": 1}));

        assert_eq!(rules.member_discount_rate, 0.2);
        assert_eq!(rules.default_low_stock_threshold, 3);
        assert_eq!(rules.sales_list_limit, 1000);
    }

    #[test]
    fn test_out_of_range_rule_is_skipped() {
        let mut rules = BusinessRules::default();
        apply_rule(&mut rules, "default_low_stock_threshold", &json!({"value": 4_294_967_301i64}));
        apply_rule(&mut rules, "critical_stock_level", &json!({"value": -4_294_967_295i64}));

        assert_eq!(rules.default_low_stock_threshold, 5);
        assert_eq!(rules.critical_stock_level, 1);
    }
}
