use atletica_core::{MembershipReport, StockReport};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StockReportQuery {
    pub threshold: Option<i32>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reports/membership", get(membership_report))
        .route("/v1/reports/stock", get(stock_report))
}

/// GET /v1/reports/membership
async fn membership_report(State(state): State<AppState>) -> Result<Json<MembershipReport>, AppError> {
    Ok(Json(state.reports.membership_report().await?))
}

/// GET /v1/reports/stock?threshold=
async fn stock_report(
    State(state): State<AppState>,
    Query(query): Query<StockReportQuery>,
) -> Result<Json<StockReport>, AppError> {
    Ok(Json(state.reports.stock_report(query.threshold).await?))
}
