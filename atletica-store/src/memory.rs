use async_trait::async_trait;
use atletica_core::report::{MembershipReport, StockStats};
use atletica_core::{
    Customer, CustomerRepository, Product, ProductRepository, Sale, SaleFilter, SaleRepository,
    SaleSummary, ShopError, ShopResult,
};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    customers: HashMap<String, Customer>,
    products: HashMap<Uuid, Product>,
    sales: Vec<Sale>,
}

/// Process-local store implementing every repository trait.
///
/// A single lock guards all tables, so `record_sale` validates and applies
/// all stock changes without interleaving, like the Postgres transaction.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn sorted_by_name(mut customers: Vec<Customer>) -> Vec<Customer> {
    customers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.student_id.cmp(&b.student_id)));
    customers
}

fn products_by_name(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| a.name.cmp(&b.name));
    products
}

impl Tables {
    fn email_taken(&self, email: Option<&str>, except: &str) -> bool {
        let Some(email) = email else {
            return false;
        };
        self.customers
            .values()
            .any(|c| c.student_id != except && c.email_str() == Some(email))
    }

    fn product_name_taken(&self, name: &str, except: Uuid) -> bool {
        let name = name.trim().to_lowercase();
        self.products
            .values()
            .any(|p| p.id != except && p.name.to_lowercase() == name)
    }

    fn summary(&self, sale: &Sale) -> SaleSummary {
        let mut summary = SaleSummary::from(sale);
        summary.customer_name = sale
            .customer_id
            .as_ref()
            .and_then(|id| self.customers.get(id))
            .map(|c| c.name.clone());
        summary
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn insert_customer(&self, customer: &Customer) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.customers.contains_key(&customer.student_id) {
            return Err(ShopError::duplicate("customer", &customer.student_id));
        }
        if tables.email_taken(customer.email_str(), &customer.student_id) {
            return Err(ShopError::duplicate("customer email", customer.email_str().unwrap_or_default()));
        }
        tables.customers.insert(customer.student_id.clone(), customer.clone());
        Ok(())
    }

    async fn get_customer(&self, student_id: &str) -> ShopResult<Option<Customer>> {
        Ok(self.tables.lock().await.customers.get(student_id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> ShopResult<Option<Customer>> {
        let tables = self.tables.lock().await;
        Ok(tables.customers.values().find(|c| c.email_str() == Some(email)).cloned())
    }

    async fn list_customers(&self) -> ShopResult<Vec<Customer>> {
        let tables = self.tables.lock().await;
        Ok(sorted_by_name(tables.customers.values().cloned().collect()))
    }

    async fn search_customers(&self, name_fragment: &str) -> ShopResult<Vec<Customer>> {
        let tables = self.tables.lock().await;
        Ok(sorted_by_name(
            tables
                .customers
                .values()
                .filter(|c| contains_ci(&c.name, name_fragment))
                .cloned()
                .collect(),
        ))
    }

    async fn update_customer(&self, customer: &Customer) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;
        if !tables.customers.contains_key(&customer.student_id) {
            return Err(ShopError::not_found("customer", &customer.student_id));
        }
        if tables.email_taken(customer.email_str(), &customer.student_id) {
            return Err(ShopError::duplicate("customer email", customer.email_str().unwrap_or_default()));
        }
        tables.customers.insert(customer.student_id.clone(), customer.clone());
        Ok(())
    }

    async fn delete_customer(&self, student_id: &str) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.sales.iter().any(|s| s.customer_id.as_deref() == Some(student_id)) {
            return Err(ShopError::in_use("customer", student_id));
        }
        tables
            .customers
            .remove(student_id)
            .map(|_| ())
            .ok_or_else(|| ShopError::not_found("customer", student_id))
    }

    async fn membership_counts(&self) -> ShopResult<MembershipReport> {
        let tables = self.tables.lock().await;
        let total = tables.customers.len() as i64;
        let members = tables.customers.values().filter(|c| c.is_member).count() as i64;
        Ok(MembershipReport::from_counts(total, members))
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.products.contains_key(&product.id) || tables.product_name_taken(&product.name, product.id) {
            return Err(ShopError::duplicate("product", &product.name));
        }
        tables.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> ShopResult<Option<Product>> {
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn find_product_by_name(&self, name: &str) -> ShopResult<Option<Product>> {
        let name = name.trim().to_lowercase();
        let tables = self.tables.lock().await;
        Ok(tables.products.values().find(|p| p.name.to_lowercase() == name).cloned())
    }

    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        let tables = self.tables.lock().await;
        Ok(products_by_name(tables.products.values().cloned().collect()))
    }

    async fn search_products(&self, name_fragment: &str) -> ShopResult<Vec<Product>> {
        let tables = self.tables.lock().await;
        Ok(products_by_name(
            tables
                .products
                .values()
                .filter(|p| contains_ci(&p.name, name_fragment))
                .cloned()
                .collect(),
        ))
    }

    async fn update_product(&self, product: &Product) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.product_name_taken(&product.name, product.id) {
            return Err(ShopError::duplicate("product", &product.name));
        }
        let stored = tables
            .products
            .get_mut(&product.id)
            .ok_or_else(|| ShopError::not_found("product", product.id))?;

        stored.name = product.name.clone();
        stored.unit_price_cents = product.unit_price_cents;
        stored.low_stock_threshold = product.low_stock_threshold;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product> {
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or_else(|| ShopError::not_found("product", id))?;

        let updated = product
            .stock_quantity
            .checked_add(delta)
            .ok_or_else(|| ShopError::invalid(format!("stock adjustment {} overflows", delta)))?;
        if updated < 0 {
            return Err(ShopError::InsufficientStock {
                product_id: id,
                requested: delta.saturating_neg(),
                available: product.stock_quantity,
            });
        }

        product.stock_quantity = updated;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn delete_product(&self, id: Uuid) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;
        let referenced = tables
            .sales
            .iter()
            .any(|s| s.lines.iter().any(|l| l.product_id == id));
        if referenced {
            return Err(ShopError::in_use("product", id));
        }
        tables
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ShopError::not_found("product", id))
    }

    async fn low_stock(&self, threshold_override: Option<i32>) -> ShopResult<Vec<Product>> {
        let tables = self.tables.lock().await;
        let mut low: Vec<Product> = tables
            .products
            .values()
            .filter(|p| p.stock_quantity <= threshold_override.unwrap_or(p.low_stock_threshold))
            .cloned()
            .collect();
        low.sort_by(|a, b| a.stock_quantity.cmp(&b.stock_quantity).then_with(|| a.name.cmp(&b.name)));
        Ok(low)
    }

    async fn stock_stats(&self) -> ShopResult<StockStats> {
        let tables = self.tables.lock().await;
        let products: Vec<Product> = tables.products.values().cloned().collect();
        Ok(StockStats::from_products(&products))
    }
}

#[async_trait]
impl SaleRepository for InMemoryStore {
    async fn record_sale(&self, sale: &Sale) -> ShopResult<()> {
        let mut tables = self.tables.lock().await;

        if let Some(customer_id) = &sale.customer_id {
            if !tables.customers.contains_key(customer_id) {
                return Err(ShopError::TransactionAborted(format!(
                    "customer {} no longer exists",
                    customer_id
                )));
            }
        }

        // Validate every line before touching any stock
        let mut requested: HashMap<Uuid, i32> = HashMap::new();
        for line in &sale.lines {
            let total = requested.entry(line.product_id).or_insert(0);
            *total = total.checked_add(line.quantity).ok_or_else(|| {
                ShopError::invalid(format!("quantity for product {} is too large", line.product_id))
            })?;
        }
        for (product_id, quantity) in &requested {
            let product = tables.products.get(product_id).ok_or_else(|| {
                ShopError::TransactionAborted(format!("product {} no longer exists", product_id))
            })?;
            if product.stock_quantity < *quantity {
                return Err(ShopError::InsufficientStock {
                    product_id: *product_id,
                    requested: *quantity,
                    available: product.stock_quantity,
                });
            }
        }

        let now = Utc::now();
        for (product_id, quantity) in requested {
            if let Some(product) = tables.products.get_mut(&product_id) {
                product.stock_quantity -= quantity;
                product.updated_at = now;
            }
        }
        tables.sales.push(sale.clone());
        Ok(())
    }

    async fn get_sale(&self, id: Uuid) -> ShopResult<Option<Sale>> {
        let tables = self.tables.lock().await;
        Ok(tables.sales.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sales(&self, filter: &SaleFilter) -> ShopResult<Vec<SaleSummary>> {
        let tables = self.tables.lock().await;

        // Insertion order breaks ties between equal timestamps: later first
        let mut sales: Vec<&Sale> = tables.sales.iter().rev().collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let selected: Vec<SaleSummary> = match filter {
            SaleFilter::Recent { limit } => sales
                .into_iter()
                .take(*limit as usize)
                .map(|s| tables.summary(s))
                .collect(),
            SaleFilter::Period { from, until } => sales
                .into_iter()
                .filter(|s| s.created_at >= *from && s.created_at < *until)
                .map(|s| tables.summary(s))
                .collect(),
            SaleFilter::CustomerName { fragment, limit } => sales
                .into_iter()
                .map(|s| tables.summary(s))
                .filter(|s| s.customer_name.as_deref().is_some_and(|n| contains_ci(n, fragment)))
                .take(*limit as usize)
                .collect(),
        };

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atletica_core::{NewCustomer, PaymentMethod, SaleLine};

    fn customer(student_id: &str, name: &str, is_member: bool) -> Customer {
        Customer::new(NewCustomer {
            student_id: student_id.to_string(),
            name: name.to_string(),
            is_member,
            ..NewCustomer::default()
        })
    }

    fn sale_of(product: &Product, quantity: i32) -> Sale {
        Sale::new(
            None,
            vec![SaleLine {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity,
                unit_price_cents: product.unit_price_cents,
            }],
            PaymentMethod::Pix,
            0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_student_id_rejected() {
        let store = InMemoryStore::new();
        store.insert_customer(&customer("20230001", "Ana Lima", true)).await.unwrap();

        let err = store.insert_customer(&customer("20230001", "Outra Pessoa", false)).await.unwrap_err();
        assert!(matches!(err, ShopError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_negative_result() {
        let store = InMemoryStore::new();
        let product = Product::new("Caneca".to_string(), 2_500, 3, 2);
        store.insert_product(&product).await.unwrap();

        let err = store.adjust_stock(product.id, -5).await.unwrap_err();
        assert!(matches!(err, ShopError::InsufficientStock { requested: 5, available: 3, .. }));
        assert_eq!(store.get_product(product.id).await.unwrap().unwrap().stock_quantity, 3);
    }

    #[tokio::test]
    async fn test_record_sale_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let mug = Product::new("Caneca".to_string(), 2_500, 10, 2);
        let shirt = Product::new("Camisa".to_string(), 6_000, 1, 2);
        store.insert_product(&mug).await.unwrap();
        store.insert_product(&shirt).await.unwrap();

        let mut sale = sale_of(&mug, 4);
        sale.lines.extend(sale_of(&shirt, 2).lines);

        let err = store.record_sale(&sale).await.unwrap_err();
        assert!(matches!(err, ShopError::InsufficientStock { .. }));
        assert_eq!(store.get_product(mug.id).await.unwrap().unwrap().stock_quantity, 10);
        assert_eq!(store.get_product(shirt.id).await.unwrap().unwrap().stock_quantity, 1);
        assert!(store.get_sale(sale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_sale_rejects_quantity_overflow() {
        let store = InMemoryStore::new();
        let mug = Product::new("Caneca".to_string(), 1, 5, 2);
        store.insert_product(&mug).await.unwrap();

        let mut sale = sale_of(&mug, i32::MAX);
        sale.lines.extend(sale_of(&mug, 2).lines);

        let err = store.record_sale(&sale).await.unwrap_err();
        assert!(matches!(err, ShopError::InvalidValue(_)));
        assert_eq!(store.get_product(mug.id).await.unwrap().unwrap().stock_quantity, 5);
        assert!(store.get_sale(sale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sold_product_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let mug = Product::new("Caneca".to_string(), 2_500, 10, 2);
        store.insert_product(&mug).await.unwrap();
        store.record_sale(&sale_of(&mug, 1)).await.unwrap();

        let err = store.delete_product(mug.id).await.unwrap_err();
        assert!(matches!(err, ShopError::InUse { .. }));
    }

    #[tokio::test]
    async fn test_low_stock_ordering_and_override() {
        let store = InMemoryStore::new();
        for (name, qty, threshold) in [("Boné", 4, 5), ("Apito", 4, 5), ("Camisa", 8, 5), ("Meia", 1, 0)] {
            store.insert_product(&Product::new(name.to_string(), 1_000, qty, threshold)).await.unwrap();
        }

        let names: Vec<String> = store.low_stock(None).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Apito", "Boné"]);

        let names: Vec<String> = store.low_stock(Some(8)).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Meia", "Apito", "Boné", "Camisa"]);
    }
}
