//! Order document, monetary computation, and the order engine.

mod aggregate;
mod billing;
mod engine;
mod payment;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use billing::{Billing, BillingType};
pub use engine::{DraftItem, EngineConfig, OrderDraft, OrderEngine, PlacedOrder};
pub use payment::{Payment, PaymentIntent, PaymentMethod, PaymentStatus};
pub use state::OrderStatus;
pub use value_objects::{
    Discount, InvoiceNumber, LineItem, Money, OrderTotals, TAX_RATE_PERCENT,
};

use common::{OrderId, ProductId};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during order operations.
///
/// Everything in the validation group is detected before any write.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The proposed order has no line items.
    #[error("order must contain at least one item")]
    EmptyItems,

    /// A line item has a zero quantity.
    #[error("invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    /// A line item references a product the catalog does not know.
    #[error("unknown product: {product_id}")]
    UnknownProduct { product_id: ProductId },

    /// A line item references a product that is no longer for sale.
    #[error("product is not active: {product_id}")]
    InactiveProduct { product_id: ProductId },

    /// Billing type invoice without the required business fields.
    #[error("billing type invoice requires business name and business tax id")]
    MissingInvoiceFields,

    /// The requested payment-status change is not a legal transition.
    #[error("illegal payment transition: {from} -> {to}")]
    PaymentTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Order absent, or not owned by the caller.
    #[error("order not found: {order_id}")]
    NotFound { order_id: OrderId },

    /// A concurrent update won the race; the caller may retry.
    #[error("order {order_id} was modified concurrently, retry")]
    Conflict { order_id: OrderId },

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
