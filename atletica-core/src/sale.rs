use atletica_shared::percent_of;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{ShopError, ShopResult};

/// How the customer paid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Cash => "CASH",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PIX" => Ok(PaymentMethod::Pix),
            "CASH" | "DINHEIRO" => Ok(PaymentMethod::Cash),
            other => Err(ShopError::invalid(format!("unknown payment method: {}", other))),
        }
    }
}

/// One product line of a checkout request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A persisted sale line; the price is frozen at checkout time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaleLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl SaleLine {
    /// Saturates at `i64::MAX`; [`Sale::new`] rejects lines that would.
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(self.quantity as i64)
    }

    fn checked_total_cents(&self) -> Option<i64> {
        self.unit_price_cents.checked_mul(self.quantity as i64)
    }
}

/// A recorded sale. Totals are derived from the lines in [`Sale::new`]
/// and never set independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Option<String>,
    pub lines: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// `InvalidValue` when the subtotal does not fit in `i64` cents
    pub fn new(
        customer_id: Option<String>,
        lines: Vec<SaleLine>,
        payment_method: PaymentMethod,
        discount_bps: u32,
    ) -> ShopResult<Self> {
        let subtotal_cents = lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.checked_total_cents()?))
            .ok_or_else(|| ShopError::invalid("sale total exceeds the supported amount"))?;
        let discount_cents = percent_of(subtotal_cents, discount_bps);

        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            lines,
            payment_method,
            subtotal_cents,
            discount_cents,
            total_amount_cents: subtotal_cents - discount_cents,
            created_at: Utc::now(),
        })
    }
}

/// Row of a sales listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleSummary {
    pub id: Uuid,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub total_amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Sale> for SaleSummary {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id,
            customer_id: sale.customer_id.clone(),
            customer_name: None,
            payment_method: sale.payment_method,
            total_amount_cents: sale.total_amount_cents,
            created_at: sale.created_at,
        }
    }
}

/// Which sales a listing returns. Results are always most recent first.
#[derive(Debug, Clone, PartialEq)]
pub enum SaleFilter {
    Recent { limit: i64 },
    /// `from` inclusive, `until` exclusive
    Period { from: DateTime<Utc>, until: DateTime<Utc> },
    CustomerName { fragment: String, limit: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: i64, quantity: i32) -> SaleLine {
        SaleLine {
            product_id: Uuid::new_v4(),
            product_name: "Item".to_string(),
            quantity,
            unit_price_cents: price,
        }
    }

    #[test]
    fn test_totals_derived_from_lines() {
        let sale = Sale::new(None, vec![line(2_500, 2), line(5_000, 1)], PaymentMethod::Pix, 0).unwrap();
        assert_eq!(sale.subtotal_cents, 10_000);
        assert_eq!(sale.discount_cents, 0);
        assert_eq!(sale.total_amount_cents, 10_000);
    }

    #[test]
    fn test_discount_applied_to_subtotal() {
        let sale = Sale::new(Some("20231234".to_string()), vec![line(10_000, 1)], PaymentMethod::Cash, 1_000).unwrap();
        assert_eq!(sale.discount_cents, 1_000);
        assert_eq!(sale.total_amount_cents, 9_000);
    }

    #[test]
    fn test_total_overflow_rejected() {
        let err = Sale::new(None, vec![line(i64::MAX / 2, 3)], PaymentMethod::Pix, 0).unwrap_err();
        assert!(matches!(err, ShopError::InvalidValue(_)));

        let lines = vec![line(i64::MAX / 2, 1), line(i64::MAX / 2, 1), line(2, 1)];
        assert!(Sale::new(None, lines, PaymentMethod::Pix, 0).is_err());
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("pix".parse::<PaymentMethod>().unwrap(), PaymentMethod::Pix);
        assert_eq!("DINHEIRO".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(" cash ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert!("card".parse::<PaymentMethod>().is_err());

        let json = serde_json::to_string(&PaymentMethod::Pix).unwrap();
        assert_eq!(json, "\"PIX\"");
    }
}
