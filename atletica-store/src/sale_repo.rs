use async_trait::async_trait;
use atletica_core::{
    PaymentMethod, Sale, SaleFilter, SaleLine, SaleRepository, SaleSummary, ShopError, ShopResult,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{abort_error, storage_error};
use crate::like_pattern;

pub struct StoreSaleRepository {
    pool: PgPool,
}

impl StoreSaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct SaleRow {
    sale_id: Uuid,
    customer_id: Option<String>,
    payment_method: String,
    subtotal_cents: i64,
    discount_cents: i64,
    total_amount_cents: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct SaleItemRow {
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    unit_price_cents: i64,
}

#[derive(sqlx::FromRow)]
struct SaleSummaryRow {
    sale_id: Uuid,
    customer_id: Option<String>,
    customer_name: Option<String>,
    payment_method: String,
    total_amount_cents: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<SaleSummaryRow> for SaleSummary {
    type Error = ShopError;

    fn try_from(row: SaleSummaryRow) -> Result<Self, Self::Error> {
        Ok(SaleSummary {
            id: row.sale_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            payment_method: row.payment_method.parse::<PaymentMethod>()?,
            total_amount_cents: row.total_amount_cents,
            created_at: row.created_at,
        })
    }
}

const SUMMARY_SELECT: &str = r#"
    SELECT s.sale_id, s.customer_id, c.name AS customer_name, s.payment_method,
           s.total_amount_cents, s.created_at
    FROM sales s
    LEFT JOIN customers c ON c.student_id = s.customer_id
"#;

#[async_trait]
impl SaleRepository for StoreSaleRepository {
    async fn record_sale(&self, sale: &Sale) -> ShopResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        for line in &sale.lines {
            let updated = sqlx::query(
                r#"
                UPDATE products
                SET stock_quantity = stock_quantity - $1, updated_at = NOW()
                WHERE product_id = $2 AND stock_quantity >= $1
                "#,
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await
            .map_err(abort_error)?;

            if updated.rows_affected() == 0 {
                let available: Option<i32> = sqlx::query_scalar(
                    "SELECT stock_quantity FROM products WHERE product_id = $1",
                )
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(abort_error)?;

                tx.rollback().await.map_err(abort_error)?;
                warn!(sale_id = %sale.id, product_id = %line.product_id, "Sale rolled back on stock shortfall");

                return Err(match available {
                    Some(available) => ShopError::InsufficientStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available,
                    },
                    None => ShopError::TransactionAborted(format!(
                        "product {} no longer exists",
                        line.product_id
                    )),
                });
            }
        }

        sqlx::query(
            r#"
            INSERT INTO sales (sale_id, customer_id, payment_method, subtotal_cents, discount_cents, total_amount_cents, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(sale.id)
        .bind(sale.customer_id.as_deref())
        .bind(sale.payment_method.as_str())
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_amount_cents)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await
        .map_err(abort_error)?;

        for (line_no, line) in sale.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, line_no, product_id, product_name, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sale.id)
            .bind(line_no as i32)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await
            .map_err(abort_error)?;
        }

        tx.commit().await.map_err(abort_error)?;
        info!(sale_id = %sale.id, lines = sale.lines.len(), "Sale committed");

        Ok(())
    }

    async fn get_sale(&self, id: Uuid) -> ShopResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT sale_id, customer_id, payment_method, subtotal_cents, discount_cents, total_amount_cents, created_at
            FROM sales WHERE sale_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT product_id, product_name, quantity, unit_price_cents
            FROM sale_items WHERE sale_id = $1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(Some(Sale {
            id: row.sale_id,
            customer_id: row.customer_id,
            lines: items
                .into_iter()
                .map(|item| SaleLine {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price_cents,
                })
                .collect(),
            payment_method: row.payment_method.parse()?,
            subtotal_cents: row.subtotal_cents,
            discount_cents: row.discount_cents,
            total_amount_cents: row.total_amount_cents,
            created_at: row.created_at,
        }))
    }

    async fn list_sales(&self, filter: &SaleFilter) -> ShopResult<Vec<SaleSummary>> {
        let mut qb = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        match filter {
            SaleFilter::Recent { limit } => {
                qb.push(" ORDER BY s.created_at DESC LIMIT ").push_bind(*limit);
            }
            SaleFilter::Period { from, until } => {
                qb.push(" WHERE s.created_at >= ")
                    .push_bind(*from)
                    .push(" AND s.created_at < ")
                    .push_bind(*until)
                    .push(" ORDER BY s.created_at DESC");
            }
            SaleFilter::CustomerName { fragment, limit } => {
                qb.push(" WHERE c.name ILIKE ")
                    .push_bind(like_pattern(fragment))
                    .push(" ORDER BY s.created_at DESC LIMIT ")
                    .push_bind(*limit);
            }
        }

        let rows: Vec<SaleSummaryRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(SaleSummary::try_from).collect()
    }
}
