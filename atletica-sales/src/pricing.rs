use atletica_core::{Customer, ShopError, ShopResult};
use serde::{Deserialize, Serialize};

/// Membership discount applied to a sale subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountPolicy {
    /// Basis points: 1000 = 10%
    member_rate_bps: u32,
}

impl DiscountPolicy {
    /// `rate` is a fraction in `[0, 1]`, e.g. `0.10`
    pub fn from_rate(rate: f64) -> ShopResult<Self> {
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(ShopError::invalid(format!("discount rate must be within [0, 1], got {}", rate)));
        }
        Ok(Self {
            member_rate_bps: (rate * 10_000.0).round() as u32,
        })
    }

    pub fn member_rate_bps(&self) -> u32 {
        self.member_rate_bps
    }

    /// Walk-in sales and non-members pay full price
    pub fn discount_bps_for(&self, customer: Option<&Customer>) -> u32 {
        match customer {
            Some(c) if c.is_member => self.member_rate_bps,
            _ => 0,
        }
    }
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        Self { member_rate_bps: 1_000 }
    }
}
