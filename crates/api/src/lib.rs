//! HTTP API server for the module store.
//!
//! Exposes order, cart, and catalog endpoints over the order engine, with
//! bearer-token authentication, structured logging (tracing), and
//! Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Extension;
use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::store::{CartStore, CatalogStore, OrderStore};
use domain::{AccessTokenIssuer, CartService, EngineConfig, OrderEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::Authenticator;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S>(
    state: Arc<AppState<S>>,
    authenticator: Arc<Authenticator>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/orders", post(routes::orders::create::<S>))
        .route("/api/orders", get(routes::orders::list_mine::<S>))
        .route("/api/orders/admin/all", get(routes::orders::list_all::<S>))
        .route("/api/orders/{id}", get(routes::orders::get::<S>))
        .route(
            "/api/orders/{id}/payment",
            put(routes::orders::update_payment::<S>),
        )
        .route("/api/cart", get(routes::cart::get::<S>))
        .route("/api/cart", delete(routes::cart::clear::<S>))
        .route("/api/cart/items", post(routes::cart::add_item::<S>))
        .route("/api/cart/items/{id}", put(routes::cart::update_item::<S>))
        .route(
            "/api/cart/items/{id}",
            delete(routes::cart::remove_item::<S>),
        )
        .route("/api/products", get(routes::catalog::list_products::<S>))
        .route("/api/products", post(routes::catalog::create_product::<S>))
        .route("/api/products/{id}", get(routes::catalog::get_product::<S>))
        .route("/api/categories", get(routes::catalog::list_categories::<S>))
        .route(
            "/api/categories",
            post(routes::catalog::create_category::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(Extension(authenticator))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the shared application state over a store.
pub fn create_state<S>(
    store: S,
    tokens: AccessTokenIssuer,
    engine_config: EngineConfig,
) -> Arc<AppState<S>>
where
    S: OrderStore + CartStore + CatalogStore + Clone + 'static,
{
    let engine = OrderEngine::new(store.clone(), tokens, engine_config);
    let carts = CartService::new(store.clone());

    Arc::new(AppState {
        engine,
        carts,
        store,
    })
}
