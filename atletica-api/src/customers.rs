use atletica_core::{ContactUpdate, Customer, NewCustomer};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub is_member: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_member: bool,
    pub favorite_team: Option<String>,
    pub home_city: Option<String>,
    pub watches_one_piece: bool,
    pub registered_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            student_id: c.student_id,
            name: c.name,
            email: c.email.map(|e| e.into_inner()),
            phone: c.phone.map(|p| p.into_inner()),
            is_member: c.is_member,
            favorite_team: c.favorite_team,
            home_city: c.home_city,
            watches_one_piece: c.watches_one_piece,
            registered_at: c.registered_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/customers", get(list_customers).post(register_customer))
        .route(
            "/v1/customers/{student_id}",
            get(get_customer).patch(update_contact).delete(remove_customer),
        )
        .route("/v1/customers/{student_id}/membership", put(update_membership))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/customers
async fn register_customer(
    State(state): State<AppState>,
    Json(req): Json<NewCustomer>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    let customer = state.registry.register(req).await?;
    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// GET /v1/customers?name=
async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let customers = match query.name.as_deref() {
        Some(fragment) => state.registry.search_by_name(fragment).await?,
        None => state.registry.list().await?,
    };
    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

/// GET /v1/customers/{student_id}
async fn get_customer(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    Ok(Json(state.registry.lookup(&student_id).await?.into()))
}

/// PATCH /v1/customers/{student_id}
async fn update_contact(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(req): Json<ContactUpdate>,
) -> Result<Json<CustomerResponse>, AppError> {
    Ok(Json(state.registry.update_contact(&student_id, req).await?.into()))
}

/// PUT /v1/customers/{student_id}/membership
async fn update_membership(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(req): Json<MembershipRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = state.registry.update_membership(&student_id, req.is_member).await?;
    Ok(Json(customer.into()))
}

/// DELETE /v1/customers/{student_id}
async fn remove_customer(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.registry.remove(&student_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
