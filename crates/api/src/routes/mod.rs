//! HTTP route handlers.

pub mod cart;
pub mod catalog;
pub mod health;
pub mod metrics;
pub mod orders;

use domain::{CartService, OrderEngine};

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub engine: OrderEngine<S>,
    pub carts: CartService<S>,
    pub store: S,
}
