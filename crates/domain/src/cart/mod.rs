//! Per-user cart aggregate.

mod service;

pub use service::{CartPolicy, CartService};

use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::Money;
use crate::store::StoreError;

/// A product reference with a quantity inside a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A user's cart: at most one per user, unique per product.
///
/// `total` is a derived, cached field; the cart service recomputes it
/// against current catalog prices after every mutation. It can therefore
/// drift from an eventual order total if catalog prices change before
/// checkout — the order freezes its own prices at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total: Money,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            user_id,
            items: Vec::new(),
            total: Money::zero(),
            updated_at: Utc::now(),
        }
    }

    /// Adds a product or, if already present, replaces its quantity.
    ///
    /// Returns the id of the affected item.
    pub fn upsert_item(&mut self, product_id: ProductId, quantity: u32) -> CartItemId {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = quantity;
            existing.id
        } else {
            let item = CartItem {
                id: CartItemId::new(),
                product_id,
                quantity,
            };
            let id = item.id;
            self.items.push(item);
            id
        }
    }

    /// Looks up an item by its id.
    pub fn item_mut(&mut self, item_id: CartItemId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Removes an item by its id; returns true if something was removed.
    pub fn remove_item(&mut self, item_id: CartItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        self.items.len() != before
    }

    /// Empties the cart and resets the cached total.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total = Money::zero();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The single-license policy only admits quantity 1 on add.
    #[error("only one license per module can be added at a time (got quantity {quantity})")]
    QuantityPolicy { quantity: u32 },

    /// Quantities below 1 are never valid.
    #[error("invalid quantity: {quantity} (must be at least 1)")]
    InvalidQuantity { quantity: u32 },

    /// The referenced product does not exist in the catalog.
    #[error("unknown product: {product_id}")]
    UnknownProduct { product_id: ProductId },

    /// The referenced product is no longer for sale.
    #[error("product is not active: {product_id}")]
    InactiveProduct { product_id: ProductId },

    /// The caller has no cart yet.
    #[error("cart not found")]
    CartNotFound,

    /// No item with that id in the cart.
    #[error("cart item not found: {item_id}")]
    ItemNotFound { item_id: CartItemId },

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
