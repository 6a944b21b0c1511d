use atletica_catalog::InventoryManager;
use atletica_core::{CustomerRepository, ProductRepository, SaleRepository, ShopResult};
use atletica_registry::CustomerRegistry;
use atletica_sales::{DiscountPolicy, ReportService, SalesLimits, SalesProcessor};
use atletica_store::app_config::BusinessRules;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CustomerRegistry>,
    pub inventory: Arc<InventoryManager>,
    pub sales: Arc<SalesProcessor>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    /// Wires the services over any repository backend
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        sales: Arc<dyn SaleRepository>,
        business_rules: &BusinessRules,
    ) -> ShopResult<Self> {
        let discount = DiscountPolicy::from_rate(business_rules.member_discount_rate)?;
        let limits = SalesLimits {
            max_report_days: business_rules.max_report_days,
            list_limit: business_rules.sales_list_limit,
        };

        Ok(Self {
            registry: Arc::new(CustomerRegistry::new(customers.clone())),
            inventory: Arc::new(InventoryManager::new(
                products.clone(),
                business_rules.default_low_stock_threshold,
            )),
            sales: Arc::new(SalesProcessor::new(
                customers.clone(),
                products.clone(),
                sales,
                discount,
                limits,
            )),
            reports: Arc::new(ReportService::new(
                customers,
                products,
                business_rules.critical_stock_level,
            )),
        })
    }
}
