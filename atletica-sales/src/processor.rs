use atletica_catalog::alert_if_low;
use atletica_core::{
    CustomerRepository, LineRequest, PaymentMethod, Product, ProductRepository, Sale, SaleFilter,
    SaleLine, SaleRepository, SaleSummary, ShopError, ShopResult,
};
use atletica_shared::format_brl;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pricing::DiscountPolicy;

const CUSTOMER_SEARCH_LIMIT: i64 = 200;
const MIN_CUSTOMER_FRAGMENT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct SalesLimits {
    /// Longest period a listing may span
    pub max_report_days: i64,
    /// Cap on the unfiltered listing
    pub list_limit: i64,
}

impl Default for SalesLimits {
    fn default() -> Self {
        Self { max_report_days: 365, list_limit: 1000 }
    }
}

/// Listing filter as received from callers. Dates are whole days, both inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub customer: Option<String>,
}

impl SalesQuery {
    pub fn resolve(&self, limits: &SalesLimits) -> ShopResult<SaleFilter> {
        let customer = self.customer.as_deref().map(str::trim).filter(|c| !c.is_empty());

        match (self.from, self.to, customer) {
            (None, None, None) => Ok(SaleFilter::Recent { limit: limits.list_limit }),
            (None, None, Some(fragment)) => {
                if fragment.chars().count() < MIN_CUSTOMER_FRAGMENT {
                    return Err(ShopError::invalid("customer name filter needs at least 3 characters"));
                }
                Ok(SaleFilter::CustomerName {
                    fragment: fragment.to_string(),
                    limit: CUSTOMER_SEARCH_LIMIT,
                })
            }
            (Some(from), Some(to), None) => {
                if to < from {
                    return Err(ShopError::invalid("end date must not be before start date"));
                }
                if (to - from).num_days() > limits.max_report_days {
                    return Err(ShopError::invalid(format!(
                        "period too long, the limit is {} days",
                        limits.max_report_days
                    )));
                }
                let until = to
                    .succ_opt()
                    .ok_or_else(|| ShopError::invalid("end date out of range"))?;
                Ok(SaleFilter::Period {
                    from: from.and_time(NaiveTime::MIN).and_utc(),
                    until: until.and_time(NaiveTime::MIN).and_utc(),
                })
            }
            (_, _, Some(_)) => Err(ShopError::invalid("filter by period or by customer, not both")),
            _ => Err(ShopError::invalid("a period needs both start and end dates")),
        }
    }
}

/// Executes checkouts and answers sales queries
pub struct SalesProcessor {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    sales: Arc<dyn SaleRepository>,
    discount: DiscountPolicy,
    limits: SalesLimits,
}

impl SalesProcessor {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        sales: Arc<dyn SaleRepository>,
        discount: DiscountPolicy,
        limits: SalesLimits,
    ) -> Self {
        Self { customers, products, sales, discount, limits }
    }

    /// Record a sale: validate stock, apply the membership discount, then
    /// decrement stock and persist the sale in one transaction.
    pub async fn checkout(
        &self,
        customer_id: Option<&str>,
        lines: &[LineRequest],
        payment_method: PaymentMethod,
    ) -> ShopResult<Sale> {
        if lines.is_empty() {
            return Err(ShopError::invalid("a sale needs at least one item"));
        }
        if let Some(line) = lines.iter().find(|l| l.quantity <= 0) {
            return Err(ShopError::invalid(format!(
                "quantity must be positive, got {} for product {}",
                line.quantity, line.product_id
            )));
        }

        let customer = match customer_id.map(str::trim) {
            Some(id) => Some(
                self.customers
                    .get_customer(id)
                    .await?
                    .ok_or_else(|| ShopError::not_found("customer", id))?,
            ),
            None => None,
        };

        // Same product on several lines counts once against its stock
        let mut requested: Vec<(Uuid, i32)> = Vec::new();
        for line in lines {
            match requested.iter_mut().find(|(id, _)| *id == line.product_id) {
                Some((_, qty)) => {
                    *qty = qty.checked_add(line.quantity).ok_or_else(|| {
                        ShopError::invalid(format!("quantity for product {} is too large", line.product_id))
                    })?;
                }
                None => requested.push((line.product_id, line.quantity)),
            }
        }

        let mut products: HashMap<Uuid, Product> = HashMap::with_capacity(requested.len());
        for (product_id, quantity) in &requested {
            let product = self
                .products
                .get_product(*product_id)
                .await?
                .ok_or_else(|| ShopError::not_found("product", product_id))?;

            if product.stock_quantity < *quantity {
                warn!(product_id = %product_id, requested = quantity, available = product.stock_quantity, "Checkout rejected on stock");
                return Err(ShopError::InsufficientStock {
                    product_id: *product_id,
                    requested: *quantity,
                    available: product.stock_quantity,
                });
            }
            products.insert(*product_id, product);
        }

        let sale_lines: Vec<SaleLine> = lines
            .iter()
            .map(|line| {
                let product = &products[&line.product_id];
                SaleLine {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: line.quantity,
                    unit_price_cents: product.unit_price_cents,
                }
            })
            .collect();

        let discount_bps = self.discount.discount_bps_for(customer.as_ref());
        let sale = Sale::new(
            customer.map(|c| c.student_id),
            sale_lines,
            payment_method,
            discount_bps,
        )?;

        self.sales.record_sale(&sale).await?;

        info!(
            sale_id = %sale.id,
            customer = sale.customer_id.as_deref().unwrap_or("walk-in"),
            payment = %sale.payment_method,
            subtotal = %format_brl(sale.subtotal_cents),
            discount = %format_brl(sale.discount_cents),
            total = %format_brl(sale.total_amount_cents),
            "Sale recorded"
        );

        for (product_id, quantity) in requested {
            if let Some(mut product) = products.remove(&product_id) {
                product.stock_quantity -= quantity;
                alert_if_low(&product);
            }
        }

        Ok(sale)
    }

    pub async fn get_sale(&self, sale_id: Uuid) -> ShopResult<Sale> {
        self.sales
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| ShopError::not_found("sale", sale_id))
    }

    /// Most recent first
    pub async fn list_sales(&self, query: &SalesQuery) -> ShopResult<Vec<SaleSummary>> {
        let filter = query.resolve(&self.limits)?;
        self.sales.list_sales(&filter).await
    }
}
