//! Order engine: order creation, payment-status updates, queries.

use chrono::Utc;
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::store::{CartStore, CatalogStore, OrderStore, StoreError};
use crate::token::AccessTokenIssuer;

use super::{
    Billing, BillingType, Discount, InvoiceNumber, LineItem, Order, OrderError, OrderStatus,
    Payment, PaymentIntent, PaymentStatus,
};

/// Schema name embedded in dashboard access tokens.
const POS_SCHEMA: &str = "pos";

/// A proposed line item: product reference plus quantity.
///
/// Prices are never taken from the caller; the engine snapshots them from
/// the catalog when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A proposed order as submitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<DraftItem>,
    pub billing: Billing,
    pub payment: PaymentIntent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Result of placing an order.
///
/// The access URL is ephemeral: returned exactly once here and never
/// persisted on the order.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub access_url: Option<String>,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The distinguished product whose purchase additionally mints a
    /// dashboard access token.
    pub pos_module_id: Option<ProductId>,

    /// Base URL the access token is appended to.
    pub dashboard_base_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pos_module_id: None,
            dashboard_base_url: "https://pos.example.com".to_string(),
        }
    }
}

/// The order lifecycle engine.
///
/// Owns order creation (validation, totals, invoice numbering, license
/// issuance, access-token minting) and payment-status transitions.
#[derive(Clone)]
pub struct OrderEngine<S> {
    store: S,
    tokens: AccessTokenIssuer,
    config: EngineConfig,
}

impl<S> OrderEngine<S>
where
    S: OrderStore + CartStore + CatalogStore,
{
    /// Creates a new engine over the given store.
    pub fn new(store: S, tokens: AccessTokenIssuer, config: EngineConfig) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }

    /// Creates an order for a user.
    ///
    /// All validation happens before any write; a rejected draft leaves
    /// the store untouched. When the caller-supplied payment status is
    /// `completed`, licenses are issued into the same document that the
    /// single insert persists, and a purchase of the configured POS
    /// module yields a one-time dashboard access URL.
    ///
    /// On success the user's cart is cleared: the checkout consumed it.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        draft: OrderDraft,
    ) -> Result<PlacedOrder, OrderError> {
        let items = self.resolve_items(&draft.items).await?;
        validate_billing(&draft.billing)?;

        let invoice_number = InvoiceNumber::new(self.store.next_invoice_number().await?);
        let now = Utc::now();

        let payment = Payment {
            method: draft.payment.method,
            status: draft.payment.status.unwrap_or_default(),
            transaction_id: None,
            payment_date: None,
            card_last4: draft.payment.card_last4,
        };

        let mut order = Order::place(
            user_id,
            items,
            draft.billing,
            payment,
            draft.discount,
            invoice_number,
            draft.notes,
            now,
        );

        let mut access_url = None;
        if order.payment.status == PaymentStatus::Completed {
            order.issue_licenses(now);
            access_url = self.pos_access_url(&order)?;
        }

        let order = self.store.insert_order(order).await?;
        metrics::counter!("orders_created_total").increment(1);

        self.consume_cart(user_id).await;

        tracing::info!(
            order_id = %order.id,
            invoice = %order.invoice_number,
            licenses = order.licenses.len(),
            "order created"
        );

        Ok(PlacedOrder { order, access_url })
    }

    /// Updates the payment status of an order owned by `user_id`.
    ///
    /// Illegal transitions are rejected; re-applying the current status is
    /// accepted so redelivered notifications stay harmless. The first move
    /// to `completed` issues licenses in the same optimistic-version write
    /// as the status change. Unlike the creation path, no access token is
    /// minted here — the dashboard URL is a first-purchase artifact.
    #[tracing::instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        user_id: UserId,
        order_id: OrderId,
        new_status: PaymentStatus,
        transaction_id: Option<String>,
    ) -> Result<Order, OrderError> {
        let mut order = self
            .store
            .find_order(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound { order_id })?;

        let from = order.payment.status;
        if !from.can_transition_to(new_status) {
            return Err(OrderError::PaymentTransition {
                from,
                to: new_status,
            });
        }

        order.apply_payment_update(new_status, transaction_id, Utc::now());

        let order = match self.store.update_order(order).await {
            Ok(order) => order,
            Err(StoreError::VersionConflict { .. }) => {
                return Err(OrderError::Conflict { order_id });
            }
            Err(err) => return Err(err.into()),
        };

        metrics::counter!("order_payment_updates_total").increment(1);
        tracing::info!(status = %new_status, "payment status updated");

        Ok(order)
    }

    /// Loads a single order scoped to its owner.
    pub async fn get_order(&self, user_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        self.store
            .find_order(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound { order_id })
    }

    /// All orders of one user, newest first.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_orders_for_user(user_id).await?)
    }

    /// Administrative view over all orders, optionally filtered by status.
    pub async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_all_orders(status).await?)
    }

    /// Resolves draft items against the catalog, snapshotting names and
    /// prices into line items.
    async fn resolve_items(&self, drafts: &[DraftItem]) -> Result<Vec<LineItem>, OrderError> {
        if drafts.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        let mut items = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if draft.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: draft.product_id,
                    quantity: draft.quantity,
                });
            }

            let product = self
                .store
                .product(draft.product_id)
                .await?
                .ok_or(OrderError::UnknownProduct {
                    product_id: draft.product_id,
                })?;

            if !product.is_active {
                return Err(OrderError::InactiveProduct {
                    product_id: draft.product_id,
                });
            }

            items.push(LineItem::new(
                product.id,
                product.name,
                draft.quantity,
                product.price,
            ));
        }
        Ok(items)
    }

    /// Mints the dashboard access URL when the order contains the
    /// configured POS module.
    fn pos_access_url(&self, order: &Order) -> Result<Option<String>, OrderError> {
        let Some(pos_id) = self.config.pos_module_id else {
            return Ok(None);
        };
        if !order.contains_product(pos_id) {
            return Ok(None);
        }

        let token = self
            .tokens
            .mint(&order.user_id.to_string(), POS_SCHEMA)
            .map_err(StoreError::backend)?;

        Ok(Some(format!(
            "{}/dashboard?token={}",
            self.config.dashboard_base_url, token
        )))
    }

    /// Clears the user's cart after a successful checkout.
    ///
    /// Best effort: the order write already succeeded, so a failure here
    /// is logged and swallowed rather than failing the request.
    async fn consume_cart(&self, user_id: UserId) {
        match self.store.load_cart(user_id).await {
            Ok(Some(mut cart)) if !cart.is_empty() => {
                cart.clear();
                if let Err(err) = self.store.save_cart(cart).await {
                    tracing::warn!(%user_id, error = %err, "failed to clear cart after checkout");
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "failed to load cart after checkout");
            }
        }
    }
}

fn validate_billing(billing: &Billing) -> Result<(), OrderError> {
    if billing.kind == BillingType::Invoice && !billing.has_business_fields() {
        return Err(OrderError::MissingInvoiceFields);
    }
    Ok(())
}
