use atletica_core::{Product, ProductDraft, ProductRepository, ShopError, ShopResult};
use atletica_shared::format_brl;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::validation;

/// Logs a low-stock alert when the product sits at or below its threshold.
/// Returns whether an alert was raised.
pub fn alert_if_low(product: &Product) -> bool {
    if !product.is_low_stock() {
        return false;
    }
    warn!(
        product_id = %product.id,
        name = %product.name,
        stock = product.stock_quantity,
        threshold = product.low_stock_threshold,
        "Low stock alert"
    );
    true
}

/// Product records, prices and stock levels
pub struct InventoryManager {
    repo: Arc<dyn ProductRepository>,
    default_threshold: i32,
}

impl InventoryManager {
    pub fn new(repo: Arc<dyn ProductRepository>, default_threshold: i32) -> Self {
        Self { repo, default_threshold }
    }

    pub async fn add_product(&self, draft: ProductDraft) -> ShopResult<Product> {
        let name = validation::product_name(&draft.name)?;
        let price = validation::price(draft.unit_price_cents)?;
        let stock = validation::non_negative("stock_quantity", draft.stock_quantity)?;
        let threshold = validation::non_negative(
            "low_stock_threshold",
            draft.low_stock_threshold.unwrap_or(self.default_threshold),
        )?;

        if self.repo.find_product_by_name(&name).await?.is_some() {
            return Err(ShopError::duplicate("product", &name));
        }

        let product = Product::new(name, price, stock, threshold);
        self.repo.insert_product(&product).await?;

        info!(product_id = %product.id, name = %product.name, price = %format_brl(price), stock, "Product added");
        alert_if_low(&product);
        Ok(product)
    }

    pub async fn get(&self, product_id: Uuid) -> ShopResult<Product> {
        self.repo
            .get_product(product_id)
            .await?
            .ok_or_else(|| ShopError::not_found("product", product_id))
    }

    pub async fn list(&self) -> ShopResult<Vec<Product>> {
        self.repo.list_products().await
    }

    pub async fn search_by_name(&self, fragment: &str) -> ShopResult<Vec<Product>> {
        if fragment.trim().is_empty() {
            return self.list().await;
        }
        self.repo.search_products(fragment).await
    }

    pub async fn update_price(&self, product_id: Uuid, new_price_cents: i64) -> ShopResult<Product> {
        let price = validation::price(new_price_cents)?;
        let mut product = self.get(product_id).await?;
        let old_price = product.unit_price_cents;

        product.unit_price_cents = price;
        self.repo.update_product(&product).await?;

        info!(
            product_id = %product_id,
            from = %format_brl(old_price),
            to = %format_brl(price),
            "Price updated"
        );
        Ok(product)
    }

    pub async fn rename(&self, product_id: Uuid, name: &str) -> ShopResult<Product> {
        self.update(product_id, Some(name), None).await
    }

    pub async fn set_threshold(&self, product_id: Uuid, threshold: i32) -> ShopResult<Product> {
        self.update(product_id, None, Some(threshold)).await
    }

    /// Rename and/or change the threshold. Every field is validated before
    /// the single write, so a rejected request changes nothing.
    pub async fn update(
        &self,
        product_id: Uuid,
        name: Option<&str>,
        threshold: Option<i32>,
    ) -> ShopResult<Product> {
        if name.is_none() && threshold.is_none() {
            return Err(ShopError::invalid("nothing to update"));
        }
        let name = name.map(validation::product_name).transpose()?;
        let threshold = threshold
            .map(|t| validation::non_negative("low_stock_threshold", t))
            .transpose()?;

        let mut product = self.get(product_id).await?;

        if let Some(name) = name {
            if let Some(other) = self.repo.find_product_by_name(&name).await? {
                if other.id != product_id {
                    return Err(ShopError::duplicate("product", &name));
                }
            }
            product.name = name;
        }
        if let Some(threshold) = threshold {
            product.low_stock_threshold = threshold;
        }

        self.repo.update_product(&product).await?;
        info!(
            product_id = %product_id,
            name = %product.name,
            threshold = product.low_stock_threshold,
            "Product updated"
        );
        alert_if_low(&product);
        Ok(product)
    }

    /// Restock (positive delta) or write off (negative delta).
    /// `InsufficientStock` if the result would go below zero; the quantity is then unchanged.
    pub async fn adjust_stock(&self, product_id: Uuid, delta: i32) -> ShopResult<Product> {
        if delta == 0 {
            return Err(ShopError::invalid("stock adjustment cannot be zero"));
        }

        let product = self.repo.adjust_stock(product_id, delta).await.inspect_err(|e| {
            if matches!(e, ShopError::InsufficientStock { .. }) {
                warn!(product_id = %product_id, delta, "Stock adjustment rejected");
            }
        })?;

        info!(product_id = %product_id, delta, stock = product.stock_quantity, "Stock adjusted");
        alert_if_low(&product);
        Ok(product)
    }

    /// Products with `stock_quantity <= low_stock_threshold`
    pub async fn list_low_stock(&self) -> ShopResult<Vec<Product>> {
        self.repo.low_stock(None).await
    }

    pub async fn remove(&self, product_id: Uuid) -> ShopResult<()> {
        self.repo.delete_product(product_id).await?;
        info!(product_id = %product_id, "Product removed");
        Ok(())
    }
}
