use async_trait::async_trait;
use atletica_core::report::MembershipReport;
use atletica_core::{Customer, CustomerRepository, ShopError, ShopResult};
use atletica_shared::Masked;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{constraint_error, storage_error, violated_constraint};
use crate::like_pattern;

const CUSTOMER_COLUMNS: &str =
    "student_id, name, email, phone, is_member, favorite_team, home_city, watches_one_piece, registered_at";

pub struct StoreCustomerRepository {
    pool: PgPool,
}

impl StoreCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    student_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    is_member: bool,
    favorite_team: Option<String>,
    home_city: Option<String>,
    watches_one_piece: bool,
    registered_at: chrono::DateTime<chrono::Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            student_id: row.student_id,
            name: row.name,
            email: row.email.map(Masked),
            phone: row.phone.map(Masked),
            is_member: row.is_member,
            favorite_team: row.favorite_team,
            home_city: row.home_city,
            watches_one_piece: row.watches_one_piece,
            registered_at: row.registered_at,
        }
    }
}

#[async_trait]
impl CustomerRepository for StoreCustomerRepository {
    async fn insert_customer(&self, customer: &Customer) -> ShopResult<()> {
        sqlx::query(
            r#"
            INSERT INTO customers
                (student_id, name, email, phone, is_member, favorite_team, home_city, watches_one_piece, registered_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&customer.student_id)
        .bind(&customer.name)
        .bind(customer.email_str())
        .bind(customer.phone_str())
        .bind(customer.is_member)
        .bind(customer.favorite_team.as_deref())
        .bind(customer.home_city.as_deref())
        .bind(customer.watches_one_piece)
        .bind(customer.registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The email has its own unique index; report which key collided
            if violated_constraint(&e).as_deref() == Some("customers_email_key") {
                ShopError::duplicate("customer email", customer.email_str().unwrap_or_default())
            } else {
                constraint_error(e, "customer", &customer.student_id)
            }
        })?;

        Ok(())
    }

    async fn get_customer(&self, student_id: &str) -> ShopResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE student_id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Customer::from))
    }

    async fn find_customer_by_email(&self, email: &str) -> ShopResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE email = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Customer::from))
    }

    async fn list_customers(&self) -> ShopResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers ORDER BY name, student_id",
            CUSTOMER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn search_customers(&self, name_fragment: &str) -> ShopResult<Vec<Customer>> {
        debug!(fragment = name_fragment, "Searching customers by name");
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {} FROM customers WHERE name ILIKE $1 ORDER BY name, student_id",
            CUSTOMER_COLUMNS
        ))
        .bind(like_pattern(name_fragment))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn update_customer(&self, customer: &Customer) -> ShopResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $1, email = $2, phone = $3, is_member = $4,
                favorite_team = $5, home_city = $6, watches_one_piece = $7
            WHERE student_id = $8
            "#,
        )
        .bind(&customer.name)
        .bind(customer.email_str())
        .bind(customer.phone_str())
        .bind(customer.is_member)
        .bind(customer.favorite_team.as_deref())
        .bind(customer.home_city.as_deref())
        .bind(customer.watches_one_piece)
        .bind(&customer.student_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e).as_deref() == Some("customers_email_key") {
                ShopError::duplicate("customer email", customer.email_str().unwrap_or_default())
            } else {
                constraint_error(e, "customer", &customer.student_id)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(ShopError::not_found("customer", &customer.student_id));
        }
        Ok(())
    }

    async fn delete_customer(&self, student_id: &str) -> ShopResult<()> {
        let has_sales: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sales WHERE customer_id = $1)",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        if has_sales {
            return Err(ShopError::in_use("customer", student_id));
        }

        let result = sqlx::query("DELETE FROM customers WHERE student_id = $1")
            .bind(student_id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "customer", student_id))?;

        if result.rows_affected() == 0 {
            return Err(ShopError::not_found("customer", student_id));
        }
        Ok(())
    }

    async fn membership_counts(&self) -> ShopResult<MembershipReport> {
        let (total, members): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_member) FROM customers",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(MembershipReport::from_counts(total, members))
    }
}
