use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest accepted unit price, R$ 10.000.000,00
pub const MAX_UNIT_PRICE_CENTS: i64 = 1_000_000_000;

/// A product on the shop shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, unit_price_cents: i64, stock_quantity: i32, low_stock_threshold: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            unit_price_cents,
            stock_quantity,
            low_stock_threshold,
            created_at: now,
            updated_at: now,
        }
    }

    /// At or below the alert threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }

    /// Saturates at `i64::MAX`
    pub fn stock_value_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(self.stock_quantity as i64)
    }
}

/// Input for `add_product`; a missing threshold falls back to the configured default.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub low_stock_threshold: Option<i32>,
}
