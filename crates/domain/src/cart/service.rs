//! Cart service: mutation operations with total recomputation.

use common::{CartItemId, ProductId, UserId};

use crate::order::Money;
use crate::store::{CartStore, CatalogStore};

use super::{Cart, CartError};

/// Business-policy knobs for the cart.
#[derive(Debug, Clone)]
pub struct CartPolicy {
    /// When set, `add_item` only accepts quantity 1 (one license per
    /// module per add operation). Updates by item id are not affected.
    pub single_unit_per_add: bool,
}

impl Default for CartPolicy {
    fn default() -> Self {
        Self {
            single_unit_per_add: true,
        }
    }
}

/// Cart operations over a store.
///
/// The cached total is recomputed from current catalog prices after every
/// mutation, so it can drift from a later order total if catalog prices
/// change before checkout.
#[derive(Clone)]
pub struct CartService<S> {
    store: S,
    policy: CartPolicy,
}

impl<S> CartService<S>
where
    S: CartStore + CatalogStore,
{
    /// Creates a cart service with the default policy.
    pub fn new(store: S) -> Self {
        Self::with_policy(store, CartPolicy::default())
    }

    /// Creates a cart service with an explicit policy.
    pub fn with_policy(store: S, policy: CartPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the user's cart, creating an empty one on first access.
    #[tracing::instrument(skip(self))]
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, CartError> {
        if let Some(cart) = self.store.load_cart(user_id).await? {
            return Ok(cart);
        }

        let cart = Cart::new(user_id);
        self.store.save_cart(cart.clone()).await?;
        Ok(cart)
    }

    /// Adds a product to the cart, or replaces its quantity if present.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        if self.policy.single_unit_per_add && quantity != 1 {
            return Err(CartError::QuantityPolicy { quantity });
        }

        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or(CartError::UnknownProduct { product_id })?;
        if !product.is_active {
            return Err(CartError::InactiveProduct { product_id });
        }

        let mut cart = match self.store.load_cart(user_id).await? {
            Some(cart) => cart,
            None => Cart::new(user_id),
        };
        cart.upsert_item(product_id, quantity);

        self.recompute_and_save(cart).await
    }

    /// Sets the quantity of an existing cart item.
    #[tracing::instrument(skip(self))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let mut cart = self
            .store
            .load_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let item = cart
            .item_mut(item_id)
            .ok_or(CartError::ItemNotFound { item_id })?;
        item.quantity = quantity;

        self.recompute_and_save(cart).await
    }

    /// Removes an item from the cart. Removing an absent item is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Cart, CartError> {
        let mut cart = self
            .store
            .load_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        cart.remove_item(item_id);
        self.recompute_and_save(cart).await
    }

    /// Empties the cart.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Cart, CartError> {
        let mut cart = self
            .store
            .load_cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        cart.clear();
        cart.updated_at = chrono::Utc::now();
        self.store.save_cart(cart.clone()).await?;
        Ok(cart)
    }

    /// Recomputes the cached total from current catalog prices, then
    /// persists the cart.
    async fn recompute_and_save(&self, mut cart: Cart) -> Result<Cart, CartError> {
        let mut total = Money::zero();
        for item in &cart.items {
            let product =
                self.store
                    .product(item.product_id)
                    .await?
                    .ok_or(CartError::UnknownProduct {
                        product_id: item.product_id,
                    })?;
            total += product.price.multiply(item.quantity);
        }

        cart.total = total;
        cart.updated_at = chrono::Utc::now();
        self.store.save_cart(cart.clone()).await?;
        Ok(cart)
    }
}
