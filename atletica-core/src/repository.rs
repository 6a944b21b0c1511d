use async_trait::async_trait;
use uuid::Uuid;

use crate::report::{MembershipReport, StockStats};
use crate::{Customer, Product, Sale, SaleFilter, SaleSummary, ShopResult};

/// Repository trait for customer records
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Fails with `DuplicateKey` when the student id or email is taken.
    async fn insert_customer(&self, customer: &Customer) -> ShopResult<()>;

    async fn get_customer(&self, student_id: &str) -> ShopResult<Option<Customer>>;

    async fn find_customer_by_email(&self, email: &str) -> ShopResult<Option<Customer>>;

    /// Ordered by name
    async fn list_customers(&self) -> ShopResult<Vec<Customer>>;

    /// Case-insensitive substring match on the name, ordered by name
    async fn search_customers(&self, name_fragment: &str) -> ShopResult<Vec<Customer>>;

    /// Overwrites every non-key field. `NotFound` when the id is unknown.
    async fn update_customer(&self, customer: &Customer) -> ShopResult<()>;

    /// `InUse` when a sale references the customer.
    async fn delete_customer(&self, student_id: &str) -> ShopResult<()>;

    async fn membership_counts(&self) -> ShopResult<MembershipReport>;
}

/// Repository trait for the product catalog and its stock levels
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fails with `DuplicateKey` when the name is taken (case-insensitive).
    async fn insert_product(&self, product: &Product) -> ShopResult<()>;

    async fn get_product(&self, id: Uuid) -> ShopResult<Option<Product>>;

    /// Exact, case-insensitive name lookup
    async fn find_product_by_name(&self, name: &str) -> ShopResult<Option<Product>>;

    async fn list_products(&self) -> ShopResult<Vec<Product>>;

    async fn search_products(&self, name_fragment: &str) -> ShopResult<Vec<Product>>;

    /// Writes name, price and threshold. Stock is only touched by
    /// [`ProductRepository::adjust_stock`] and sale recording.
    async fn update_product(&self, product: &Product) -> ShopResult<()>;

    /// Atomically applies `delta`; `InsufficientStock` leaves the row untouched.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product>;

    /// `InUse` when a sale line references the product.
    async fn delete_product(&self, id: Uuid) -> ShopResult<()>;

    /// Products with `stock_quantity <= threshold`, where threshold is the
    /// override when given, else the product's own. Ordered by quantity, then name.
    async fn low_stock(&self, threshold_override: Option<i32>) -> ShopResult<Vec<Product>>;

    async fn stock_stats(&self) -> ShopResult<StockStats>;
}

/// Repository trait for recorded sales
#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Decrements stock for every line and persists the sale as one unit.
    /// On any failure nothing is written.
    async fn record_sale(&self, sale: &Sale) -> ShopResult<()>;

    async fn get_sale(&self, id: Uuid) -> ShopResult<Option<Sale>>;

    async fn list_sales(&self, filter: &SaleFilter) -> ShopResult<Vec<SaleSummary>>;
}
