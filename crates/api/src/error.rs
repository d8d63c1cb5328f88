//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CartError, OrderError, StoreError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or invalid credentials.
    Unauthorized(String),
    /// Authenticated but not allowed.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Order engine error.
    Order(OrderError),
    /// Cart error.
    Cart(CartError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Cart(err) => cart_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn order_error_to_response(err: OrderError) -> (StatusCode, String) {
    match &err {
        OrderError::EmptyItems
        | OrderError::InvalidQuantity { .. }
        | OrderError::InactiveProduct { .. }
        | OrderError::MissingInvoiceFields => (StatusCode::BAD_REQUEST, err.to_string()),
        OrderError::UnknownProduct { .. } | OrderError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        OrderError::PaymentTransition { .. } | OrderError::Conflict { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        OrderError::Store(store_err) => store_error_to_response(store_err),
    }
}

fn cart_error_to_response(err: CartError) -> (StatusCode, String) {
    match &err {
        CartError::QuantityPolicy { .. }
        | CartError::InvalidQuantity { .. }
        | CartError::InactiveProduct { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        CartError::UnknownProduct { .. }
        | CartError::CartNotFound
        | CartError::ItemNotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        CartError::Store(store_err) => store_error_to_response(store_err),
    }
}

fn store_error_to_response(err: &StoreError) -> (StatusCode, String) {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        StoreError::VersionConflict { .. } | StoreError::Duplicate { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        StoreError::Serialization(_) | StoreError::Backend(_) => {
            tracing::error!(error = %err, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::Cart(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} not found: {id}"))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
