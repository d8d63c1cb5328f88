//! Order endpoints: creation, queries, payment-status updates.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::store::{CartStore, CatalogStore, OrderStore};
use domain::{Order, OrderDraft, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: PaymentStatus,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Response for order creation. `access_url` is returned here once and
/// never persisted.
#[derive(Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub access_url: Option<String>,
}

/// POST /api/orders — create an order from a draft.
#[tracing::instrument(skip(state, draft))]
pub async fn create<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let placed = state.engine.create_order(user.id, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order: placed.order,
            access_url: placed.access_url,
        }),
    ))
}

/// GET /api/orders — the caller's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_mine<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    Ok(Json(state.engine.list_orders(user.id).await?))
}

/// GET /api/orders/:id — a single order, owner-scoped.
#[tracing::instrument(skip(state))]
pub async fn get<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let order = state
        .engine
        .get_order(user.id, OrderId::from_uuid(id))
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/payment — drive the payment-status state machine.
#[tracing::instrument(skip(state, req))]
pub async fn update_payment<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePaymentRequest>,
) -> Result<Json<Order>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let order = state
        .engine
        .update_payment_status(
            user.id,
            OrderId::from_uuid(id),
            req.status,
            req.transaction_id,
        )
        .await?;
    Ok(Json(order))
}

/// GET /api/orders/admin/all — every order, optionally filtered by status.
#[tracing::instrument(skip(state))]
pub async fn list_all<S>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    Ok(Json(state.engine.list_all_orders(query.status).await?))
}
