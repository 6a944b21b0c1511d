use async_trait::async_trait;
use atletica_core::report::StockStats;
use atletica_core::{Product, ProductRepository, ShopError, ShopResult};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{constraint_error, storage_error};
use crate::like_pattern;

const PRODUCT_COLUMNS: &str =
    "product_id, name, unit_price_cents, stock_quantity, low_stock_threshold, created_at, updated_at";

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: Uuid,
    name: String,
    unit_price_cents: i64,
    stock_quantity: i32,
    low_stock_threshold: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.product_id,
            name: row.name,
            unit_price_cents: row.unit_price_cents,
            stock_quantity: row.stock_quantity,
            low_stock_threshold: row.low_stock_threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    product_count: i64,
    total_units: i64,
    average_units: f64,
    min_units: Option<i32>,
    max_units: Option<i32>,
    total_value_cents: i64,
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn insert_product(&self, product: &Product) -> ShopResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (product_id, name, unit_price_cents, stock_quantity, low_stock_threshold, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(product.stock_quantity)
        .bind(product.low_stock_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "product", &product.name))?;

        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> ShopResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE product_id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Product::from))
    }

    async fn find_product_by_name(&self, name: &str) -> ShopResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE LOWER(name) = LOWER($1)",
            PRODUCT_COLUMNS
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self) -> ShopResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn search_products(&self, name_fragment: &str) -> ShopResult<Vec<Product>> {
        debug!(fragment = name_fragment, "Searching products by name");
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE name ILIKE $1 ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(like_pattern(name_fragment))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(&self, product: &Product) -> ShopResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, unit_price_cents = $2, low_stock_threshold = $3, updated_at = NOW()
            WHERE product_id = $4
            "#,
        )
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(product.low_stock_threshold)
        .bind(product.id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "product", &product.name))?;

        if result.rows_affected() == 0 {
            return Err(ShopError::not_found("product", product.id));
        }
        Ok(())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> ShopResult<Product> {
        // Conditional update: the row lock serializes concurrent adjustments
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2, updated_at = NOW()
            WHERE product_id = $1 AND stock_quantity::BIGINT + $2 >= 0
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "product", id.to_string().as_str()))?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        match self.get_product(id).await? {
            None => Err(ShopError::not_found("product", id)),
            Some(current) => Err(ShopError::InsufficientStock {
                product_id: id,
                requested: delta.saturating_neg(),
                available: current.stock_quantity,
            }),
        }
    }

    async fn delete_product(&self, id: Uuid) -> ShopResult<()> {
        let has_sales: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sale_items WHERE product_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        if has_sales {
            return Err(ShopError::in_use("product", id));
        }

        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "product", id.to_string().as_str()))?;

        if result.rows_affected() == 0 {
            return Err(ShopError::not_found("product", id));
        }
        Ok(())
    }

    async fn low_stock(&self, threshold_override: Option<i32>) -> ShopResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM products
            WHERE stock_quantity <= COALESCE($1::INTEGER, low_stock_threshold)
            ORDER BY stock_quantity ASC, name ASC
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(threshold_override)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn stock_stats(&self) -> ShopResult<StockStats> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS product_count,
                COALESCE(SUM(stock_quantity), 0)::BIGINT AS total_units,
                COALESCE(AVG(stock_quantity), 0)::FLOAT8 AS average_units,
                MIN(stock_quantity) AS min_units,
                MAX(stock_quantity) AS max_units,
                COALESCE(SUM(stock_quantity::BIGINT * unit_price_cents), 0)::BIGINT AS total_value_cents
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(StockStats {
            product_count: row.product_count,
            total_units: row.total_units,
            average_units: row.average_units,
            min_units: row.min_units,
            max_units: row.max_units,
            total_value_cents: row.total_value_cents,
        })
    }
}
