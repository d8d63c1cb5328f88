//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CartItemId, ProductId};
use domain::Cart;
use domain::store::{CartStore, CatalogStore, OrderStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// GET /api/cart — the caller's cart, created empty on first access.
#[tracing::instrument(skip(state))]
pub async fn get<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
) -> Result<Json<Cart>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    Ok(Json(state.carts.get_or_create(user.id).await?))
}

/// POST /api/cart/items — add a product (or replace its quantity).
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Cart>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let cart = state
        .carts
        .add_item(user.id, req.product_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

/// PUT /api/cart/items/:id — set the quantity of an existing item.
#[tracing::instrument(skip(state, req))]
pub async fn update_item<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Cart>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let cart = state
        .carts
        .update_item(user.id, CartItemId::from_uuid(id), req.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/items/:id — remove an item.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Cart>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let cart = state
        .carts
        .remove_item(user.id, CartItemId::from_uuid(id))
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart — empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<S>(
    State(state): State<Arc<AppState<S>>>,
    user: AuthUser,
) -> Result<Json<Cart>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    Ok(Json(state.carts.clear(user.id).await?))
}
