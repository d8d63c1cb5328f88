//! Core domain for the module store.
//!
//! This crate provides:
//! - the order document with monetary totals, billing/payment records,
//!   and the payment-status state machine
//! - the order engine (creation, invoice numbering, payment updates,
//!   license issuance)
//! - license records and key generation
//! - the signed access-token issuer for module dashboards
//! - the per-user cart aggregate and its service
//! - catalog records and the persistence ports with an in-memory
//!   implementation

pub mod cart;
pub mod catalog;
pub mod license;
pub mod order;
pub mod store;
pub mod token;

pub use cart::{Cart, CartError, CartItem, CartPolicy, CartService};
pub use catalog::{Category, Product};
pub use license::{License, LicenseStatus, generate_license_key};
pub use order::{
    Billing, BillingType, Discount, DraftItem, EngineConfig, InvoiceNumber, LineItem, Money,
    Order, OrderDraft, OrderEngine, OrderError, OrderStatus, OrderTotals, Payment, PaymentIntent,
    PaymentMethod, PaymentStatus, PlacedOrder,
};
pub use store::{CartStore, CatalogStore, InMemoryStore, OrderStore, StoreError};
pub use token::{AccessClaims, AccessTokenIssuer, TokenError};
