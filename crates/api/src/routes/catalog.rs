//! Product and category endpoints.
//!
//! Reads are public; writes are admin-only. The catalog is plumbing
//! around the order engine, so only creation is exposed here.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CategoryId, ProductId};
use domain::store::{CartStore, CatalogStore, OrderStore};
use domain::{Category, Money, Product};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    /// Price in minor currency units; must be non-negative.
    pub price: i64,
    pub category: CategoryId,
}

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// GET /api/products — active products.
#[tracing::instrument(skip(state))]
pub async fn list_products<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Product>>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    Ok(Json(state.store.list_products(true).await?))
}

/// GET /api/products/:id — a single product.
#[tracing::instrument(skip(state))]
pub async fn get_product<S>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let product = state
        .store
        .product(ProductId::from_uuid(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {id}")))?;
    Ok(Json(product))
}

/// POST /api/products — create a product (admin).
#[tracing::instrument(skip(state, req))]
pub async fn create_product<S>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    if req.price < 0 {
        return Err(ApiError::BadRequest(
            "price must be non-negative".to_string(),
        ));
    }

    let category = state
        .store
        .category(req.category)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("category not found: {}", req.category)))?;

    let product = Product::new(
        req.name,
        req.description,
        Money::from_minor(req.price),
        category.id,
    );
    state.store.insert_product(product.clone()).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/categories — all categories.
#[tracing::instrument(skip(state))]
pub async fn list_categories<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Category>>, ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    Ok(Json(state.store.list_categories().await?))
}

/// POST /api/categories — create a category (admin).
#[tracing::instrument(skip(state, req))]
pub async fn create_category<S>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let category = Category::new(req.name, req.description);
    state.store.insert_category(category.clone()).await?;

    Ok((StatusCode::CREATED, Json(category)))
}
