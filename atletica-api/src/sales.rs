use atletica_core::{LineRequest, PaymentMethod, Sale, SaleLine, SaleSummary};
use atletica_sales::SalesQuery;
use atletica_shared::format_brl;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Student id; omitted for walk-in sales
    pub customer_id: Option<String>,
    pub items: Vec<LineRequest>,
    /// "PIX", "CASH" or "DINHEIRO"
    pub payment_method: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaleLineResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<SaleLine> for SaleLineResponse {
    fn from(line: SaleLine) -> Self {
        Self {
            line_total_cents: line.total_cents(),
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaleResponse {
    pub id: Uuid,
    pub customer_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<SaleLineResponse>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_amount_cents: i64,
    /// Display form of the total
    pub total: String,
    pub created_at: DateTime<Utc>,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            customer_id: sale.customer_id,
            payment_method: sale.payment_method,
            items: sale.lines.into_iter().map(SaleLineResponse::from).collect(),
            subtotal_cents: sale.subtotal_cents,
            discount_cents: sale.discount_cents,
            total: format_brl(sale.total_amount_cents),
            total_amount_cents: sale.total_amount_cents,
            created_at: sale.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sales", get(list_sales).post(checkout))
        .route("/v1/sales/{id}", get(get_sale))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/sales
async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), AppError> {
    let payment_method: PaymentMethod = req.payment_method.parse()?;
    let sale = state
        .sales
        .checkout(req.customer_id.as_deref(), &req.items, payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(sale.into())))
}

/// GET /v1/sales?from=YYYY-MM-DD&to=YYYY-MM-DD or ?customer=<name>
async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<SaleSummary>>, AppError> {
    Ok(Json(state.sales.list_sales(&query).await?))
}

/// GET /v1/sales/{id}
async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleResponse>, AppError> {
    Ok(Json(state.sales.get_sale(id).await?.into()))
}
