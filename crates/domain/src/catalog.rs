//! Catalog records: products and categories.
//!
//! Read-mostly; referenced by cart items and order line items. An order
//! snapshots price and name at creation, so catalog edits never rewrite
//! history.

use common::{CategoryId, ProductId};
use serde::{Deserialize, Serialize};

use crate::order::Money;

/// A software module offered for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,

    /// Non-negative price in minor currency units.
    pub price: Money,

    pub category: CategoryId,
    pub is_active: bool,
}

impl Product {
    /// Creates an active product with a fresh id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        category: CategoryId,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            description: description.into(),
            price,
            category,
            is_active: true,
        }
    }
}

/// A grouping of related products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    /// Creates a category with a fresh id.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description,
        }
    }
}
