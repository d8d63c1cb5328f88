use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use common::{CategoryId, OrderId, ProductId, UserId};
use tokio::sync::RwLock;

use crate::cart::Cart;
use crate::catalog::{Category, Product};
use crate::order::{Order, OrderStatus};

use super::{CartStore, CatalogStore, OrderStore, Result, StoreError};

/// In-memory store implementation.
///
/// Backs the default server configuration and the test suites; provides
/// the same guarantees as the PostgreSQL implementation (serialized
/// invoice counter, optimistic order versioning, last-write-wins carts).
#[derive(Clone, Default)]
pub struct InMemoryStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    categories: Arc<RwLock<HashMap<CategoryId, Category>>>,
    invoice_seq: Arc<AtomicU64>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn next_invoice_number(&self) -> Result<u64> {
        Ok(self.invoice_seq.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert_order(&self, order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Duplicate {
                entity: "order",
                id: order.id.to_string(),
            });
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders.get(&order.id).ok_or_else(|| StoreError::NotFound {
            entity: "order",
            id: order.id.to_string(),
        })?;

        if stored.version != order.version {
            return Err(StoreError::VersionConflict {
                entity: "order",
                id: order.id.to_string(),
                expected: order.version,
                actual: stored.version,
            });
        }

        let mut next = order;
        next.version += 1;
        orders.insert(next.id, next.clone());
        Ok(next)
    }

    async fn find_order(&self, id: OrderId, owner: UserId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .get(&id)
            .filter(|order| order.user_id == owner)
            .cloned())
    }

    async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|order| order.user_id == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn list_all_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|order| status.is_none_or(|s| order.status == s))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn order_count(&self) -> Result<usize> {
        Ok(self.orders.read().await.len())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn load_cart(&self, owner: UserId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&owner).cloned())
    }

    async fn save_cart(&self, cart: Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user_id, cart);
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_product(&self, product: Product) -> Result<()> {
        self.products.write().await.insert(product.id, product);
        Ok(())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self, active_only: bool) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut result: Vec<Product> = products
            .values()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn insert_category(&self, category: Category) -> Result<()> {
        self.categories.write().await.insert(category.id, category);
        Ok(())
    }

    async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut result: Vec<Category> = categories.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}
