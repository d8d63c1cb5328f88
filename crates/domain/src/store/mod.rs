//! Persistence ports for the module store.
//!
//! The engine and services talk to these traits only; the in-memory
//! implementation lives here, the PostgreSQL one in its own crate.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, UserId};
use thiserror::Error;

use crate::cart::Cart;
use crate::catalog::{Category, Product};
use crate::order::{Order, OrderStatus};

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A record with that identity already exists.
    #[error("{entity} already exists: {id}")]
    Duplicate { entity: &'static str, id: String },

    /// An optimistic-version check failed; the caller may retry.
    #[error("version conflict on {entity} {id}: expected {expected}, found {actual}")]
    VersionConflict {
        entity: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// A document could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Convenience constructor for backend failures.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Persistence for orders, including the invoice-number sequence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Returns the next value of the invoice counter.
    ///
    /// The counter is strictly serialized: two concurrent callers can
    /// never observe the same value. Starts at 1 on an empty store.
    async fn next_invoice_number(&self) -> Result<u64>;

    /// Persists a new order (version 1). Fails on duplicate id.
    async fn insert_order(&self, order: Order) -> Result<Order>;

    /// Persists an updated order.
    ///
    /// `order.version` must equal the stored version; on success the
    /// stored and returned documents carry `version + 1`. A mismatch
    /// fails with [`StoreError::VersionConflict`] and writes nothing.
    async fn update_order(&self, order: Order) -> Result<Order>;

    /// Loads an order scoped to its owner. Foreign orders are invisible.
    async fn find_order(&self, id: OrderId, owner: UserId) -> Result<Option<Order>>;

    /// All orders of one user, newest first.
    async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>>;

    /// All orders, optionally filtered by order status, newest first.
    async fn list_all_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>>;

    /// Total number of stored orders.
    async fn order_count(&self) -> Result<usize>;
}

/// Persistence for carts. One cart per user, last write wins.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads a user's cart, if one exists.
    async fn load_cart(&self, owner: UserId) -> Result<Option<Cart>>;

    /// Inserts or replaces a user's cart.
    async fn save_cart(&self, cart: Cart) -> Result<()>;
}

/// Persistence for the product/category catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_product(&self, product: Product) -> Result<()>;

    async fn product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists products; with `active_only`, inactive ones are skipped.
    async fn list_products(&self, active_only: bool) -> Result<Vec<Product>>;

    async fn insert_category(&self, category: Category) -> Result<()>;

    async fn category(&self, id: CategoryId) -> Result<Option<Category>>;

    async fn list_categories(&self) -> Result<Vec<Category>>;
}
