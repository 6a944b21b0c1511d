use atletica_core::ShopError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Shop(#[from] ShopError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Shop(err) => match err {
                ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
                ShopError::DuplicateKey { .. } | ShopError::InUse { .. } => StatusCode::CONFLICT,
                ShopError::InvalidValue(_) => StatusCode::BAD_REQUEST,
                ShopError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                ShopError::TransactionAborted(_) => StatusCode::CONFLICT,
                ShopError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.to_string();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", error_message);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ShopError::not_found("customer", "20230001"), StatusCode::NOT_FOUND),
            (ShopError::duplicate("product", "Caneca"), StatusCode::CONFLICT),
            (ShopError::in_use("product", "Caneca"), StatusCode::CONFLICT),
            (ShopError::invalid("bad"), StatusCode::BAD_REQUEST),
            (
                ShopError::InsufficientStock { product_id: Uuid::nil(), requested: 2, available: 1 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ShopError::TransactionAborted("x".into()), StatusCode::CONFLICT),
            (ShopError::StorageUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).into_response().status(), expected);
        }
    }
}
