use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Product;

/// Member vs non-member breakdown of the customer base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipReport {
    pub total_customers: i64,
    pub members: i64,
    pub non_members: i64,
    /// Rounded to 2 decimals; 0 when there are no customers
    pub member_percentage: f64,
}

impl MembershipReport {
    pub fn from_counts(total_customers: i64, members: i64) -> Self {
        let member_percentage = if total_customers == 0 {
            0.0
        } else {
            (members as f64 * 10_000.0 / total_customers as f64).round() / 100.0
        };

        Self {
            total_customers,
            members,
            non_members: total_customers - members,
            member_percentage,
        }
    }
}

/// Aggregates over the whole product table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockStats {
    pub product_count: i64,
    pub total_units: i64,
    pub average_units: f64,
    pub min_units: Option<i32>,
    pub max_units: Option<i32>,
    pub total_value_cents: i64,
}

impl StockStats {
    pub fn from_products(products: &[Product]) -> Self {
        if products.is_empty() {
            return Self::default();
        }

        let total_units: i64 = products.iter().map(|p| p.stock_quantity as i64).sum();
        Self {
            product_count: products.len() as i64,
            total_units,
            average_units: total_units as f64 / products.len() as f64,
            min_units: products.iter().map(|p| p.stock_quantity).min(),
            max_units: products.iter().map(|p| p.stock_quantity).max(),
            total_value_cents: products
                .iter()
                .map(Product::stock_value_cents)
                .fold(0, i64::saturating_add),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockRow {
    pub product_id: Uuid,
    pub name: String,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub unit_price_cents: i64,
    pub stock_value_cents: i64,
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub stats: StockStats,
    /// `None` when each product's own threshold was used
    pub threshold_override: Option<i32>,
    pub low_stock: Vec<LowStockRow>,
}
