use atletica_core::{Product, ProductDraft};
use atletica_shared::format_brl;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{customers::NameQuery, error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    /// Display form, e.g. "R$ 49,90"
    pub unit_price: String,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub low_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            unit_price: format_brl(p.unit_price_cents),
            low_stock: p.is_low_stock(),
            name: p.name,
            unit_price_cents: p.unit_price_cents,
            stock_quantity: p.stock_quantity,
            low_stock_threshold: p.low_stock_threshold,
        }
    }
}

fn respond_all(products: Vec<Product>) -> Json<Vec<ProductResponse>> {
    Json(products.into_iter().map(ProductResponse::from).collect())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products).post(add_product))
        .route("/v1/products/low-stock", get(list_low_stock))
        .route(
            "/v1/products/{id}",
            get(get_product).patch(update_product).delete(remove_product),
        )
        .route("/v1/products/{id}/price", put(update_price))
        .route("/v1/products/{id}/stock", post(adjust_stock))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/products
async fn add_product(
    State(state): State<AppState>,
    Json(req): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = state.inventory.add_product(req).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /v1/products?name=
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = match query.name.as_deref() {
        Some(fragment) => state.inventory.search_by_name(fragment).await?,
        None => state.inventory.list().await?,
    };
    Ok(respond_all(products))
}

/// GET /v1/products/low-stock
async fn list_low_stock(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>, AppError> {
    Ok(respond_all(state.inventory.list_low_stock().await?))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    Ok(Json(state.inventory.get(id).await?.into()))
}

/// PATCH /v1/products/{id}
/// Rename and/or change the low-stock threshold
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .inventory
        .update(id, req.name.as_deref(), req.low_stock_threshold)
        .await?;
    Ok(Json(product.into()))
}

/// PUT /v1/products/{id}/price
async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePriceRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    Ok(Json(state.inventory.update_price(id, req.unit_price_cents).await?.into()))
}

/// POST /v1/products/{id}/stock
/// Positive delta restocks, negative writes off
async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    Ok(Json(state.inventory.adjust_stock(id, req.delta).await?.into()))
}

/// DELETE /v1/products/{id}
async fn remove_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.inventory.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
