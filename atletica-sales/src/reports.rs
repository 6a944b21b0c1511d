use atletica_core::{
    CustomerRepository, LowStockRow, MembershipReport, ProductRepository, ShopError, ShopResult,
    StockReport,
};
use std::sync::Arc;
use tracing::debug;

/// Read-only summaries over customers and stock
pub struct ReportService {
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    critical_level: i32,
}

impl ReportService {
    /// Low-stock rows with `stock_quantity <= critical_level` are flagged critical
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        critical_level: i32,
    ) -> Self {
        Self { customers, products, critical_level }
    }

    pub async fn membership_report(&self) -> ShopResult<MembershipReport> {
        let report = self.customers.membership_counts().await?;
        debug!(total = report.total_customers, members = report.members, "Membership report built");
        Ok(report)
    }

    /// Stock statistics plus the low-stock list. With an override, every
    /// product at or below it is listed regardless of its own threshold.
    pub async fn stock_report(&self, threshold_override: Option<i32>) -> ShopResult<StockReport> {
        if let Some(threshold) = threshold_override {
            if threshold < 1 {
                return Err(ShopError::invalid(format!(
                    "threshold must be at least 1, got {}",
                    threshold
                )));
            }
        }

        let stats = self.products.stock_stats().await?;
        let low_stock = self
            .products
            .low_stock(threshold_override)
            .await?
            .into_iter()
            .map(|p| LowStockRow {
                product_id: p.id,
                stock_value_cents: p.stock_value_cents(),
                critical: p.stock_quantity <= self.critical_level,
                name: p.name,
                stock_quantity: p.stock_quantity,
                low_stock_threshold: p.low_stock_threshold,
                unit_price_cents: p.unit_price_cents,
            })
            .collect::<Vec<_>>();

        debug!(products = stats.product_count, low = low_stock.len(), "Stock report built");
        Ok(StockReport { stats, threshold_override, low_stock })
    }
}
