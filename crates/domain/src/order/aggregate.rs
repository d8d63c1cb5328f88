//! The order document.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::license::License;

use super::{
    Billing, Discount, InvoiceNumber, LineItem, Money, OrderStatus, OrderTotals, Payment,
    PaymentStatus,
};

/// An order: immutable line items, billing and payment records, totals,
/// invoice number, and the licenses issued for it.
///
/// Line items freeze product name and unit price at creation time; later
/// catalog changes never touch an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub billing: Billing,
    pub payment: Payment,

    /// Fulfillment status, independent of the payment status.
    pub status: OrderStatus,

    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,

    pub invoice_number: InvoiceNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub licenses: Vec<License>,

    pub created_at: DateTime<Utc>,

    /// Version counter for optimistic concurrency; bumped by the store on
    /// every successful update.
    #[serde(default = "initial_version")]
    pub version: u64,
}

fn initial_version() -> u64 {
    1
}

impl Order {
    /// Assembles a new order from already-validated parts.
    ///
    /// Totals are computed here so that an order can never be persisted
    /// with totals diverging from its line items.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        user_id: UserId,
        items: Vec<LineItem>,
        billing: Billing,
        payment: Payment,
        discount: Option<Discount>,
        invoice_number: InvoiceNumber,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let totals = OrderTotals::compute(&items, discount.as_ref());

        Self {
            id: OrderId::new(),
            user_id,
            items,
            billing,
            payment,
            status: OrderStatus::Pending,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            discount,
            invoice_number,
            notes,
            licenses: Vec::new(),
            created_at,
            version: 1,
        }
    }

    /// Total number of purchased units across all line items.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Returns true if any line item refers to the given product.
    pub fn contains_product(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }

    /// Issues one license per purchased unit.
    ///
    /// Guard: if the order already carries licenses this is a no-op, so a
    /// repeated "completed" notification can never double-issue. Returns
    /// the number of licenses minted.
    pub fn issue_licenses(&mut self, now: DateTime<Utc>) -> usize {
        if !self.licenses.is_empty() {
            return 0;
        }

        let count = self.unit_count() as usize;
        self.licenses.reserve(count);
        for item in &self.items {
            for _ in 0..item.quantity {
                self.licenses.push(License::issue(now));
            }
        }
        count
    }

    /// Applies an accepted payment-status update.
    ///
    /// Status, transaction id, and payment date are set unconditionally;
    /// the first move to `completed` additionally issues licenses, inside
    /// the same document so both land in one store write. Transition
    /// legality is checked by the engine before this is called.
    pub fn apply_payment_update(
        &mut self,
        new_status: PaymentStatus,
        transaction_id: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.payment.status = new_status;
        self.payment.transaction_id = transaction_id;
        self.payment.payment_date = Some(now);

        if new_status == PaymentStatus::Completed {
            self.issue_licenses(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{BillingType, Money, PaymentMethod};

    fn billing() -> Billing {
        Billing {
            kind: BillingType::Receipt,
            tax_id: "11.111.111-1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            address: "Calle Falsa 123".to_string(),
            city: "Santiago".to_string(),
            region: "RM".to_string(),
            business_name: None,
            business_tax_id: None,
            business_activity: None,
        }
    }

    fn payment(status: PaymentStatus) -> Payment {
        Payment {
            method: PaymentMethod::CreditCard,
            status,
            transaction_id: None,
            payment_date: None,
            card_last4: None,
        }
    }

    fn order_with_items(items: Vec<LineItem>) -> Order {
        Order::place(
            UserId::new(),
            items,
            billing(),
            payment(PaymentStatus::Pending),
            None,
            InvoiceNumber::new(1),
            None,
            Utc::now(),
        )
    }

    fn two_line_order() -> Order {
        order_with_items(vec![
            LineItem::new(ProductId::new(), "POS module", 2, Money::from_minor(500000)),
            LineItem::new(ProductId::new(), "Inventory module", 1, Money::from_minor(300000)),
        ])
    }

    #[test]
    fn place_computes_totals() {
        let order = two_line_order();
        assert_eq!(order.subtotal.minor(), 1300000);
        assert_eq!(order.tax.minor(), 247000);
        assert_eq!(order.total.minor(), 1547000);
    }

    #[test]
    fn place_starts_pending_without_licenses() {
        let order = two_line_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.licenses.is_empty());
        assert_eq!(order.version, 1);
    }

    #[test]
    fn unit_count_sums_quantities() {
        assert_eq!(two_line_order().unit_count(), 3);
    }

    #[test]
    fn issue_licenses_one_per_unit() {
        let mut order = two_line_order();
        let minted = order.issue_licenses(Utc::now());
        assert_eq!(minted, 3);
        assert_eq!(order.licenses.len(), 3);
    }

    #[test]
    fn issue_licenses_is_idempotent() {
        let mut order = two_line_order();
        order.issue_licenses(Utc::now());
        let second = order.issue_licenses(Utc::now());
        assert_eq!(second, 0);
        assert_eq!(order.licenses.len(), 3);
    }

    #[test]
    fn issued_keys_are_distinct() {
        let mut order = two_line_order();
        order.issue_licenses(Utc::now());
        let mut keys: Vec<_> = order.licenses.iter().map(|l| l.key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn payment_update_sets_fields_and_licenses() {
        let mut order = two_line_order();
        let now = Utc::now();
        order.apply_payment_update(PaymentStatus::Completed, Some("TX-1".to_string()), now);

        assert_eq!(order.payment.status, PaymentStatus::Completed);
        assert_eq!(order.payment.transaction_id.as_deref(), Some("TX-1"));
        assert_eq!(order.payment.payment_date, Some(now));
        assert_eq!(order.licenses.len(), 3);
    }

    #[test]
    fn repeated_completed_update_does_not_duplicate_licenses() {
        let mut order = two_line_order();
        order.apply_payment_update(PaymentStatus::Completed, Some("TX-1".to_string()), Utc::now());
        order.apply_payment_update(PaymentStatus::Completed, Some("TX-2".to_string()), Utc::now());

        assert_eq!(order.licenses.len(), 3);
        // The refreshed transaction id still lands.
        assert_eq!(order.payment.transaction_id.as_deref(), Some("TX-2"));
    }

    #[test]
    fn non_completed_update_issues_nothing() {
        let mut order = two_line_order();
        order.apply_payment_update(PaymentStatus::Processing, None, Utc::now());
        assert!(order.licenses.is_empty());
    }

    #[test]
    fn order_serializes_to_expected_shape() {
        let mut order = two_line_order();
        order.issue_licenses(Utc::now());

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["invoice_number"], "000001");
        assert_eq!(json["payment"]["status"], "pending");
        assert_eq!(json["billing"]["type"], "receipt");
        assert_eq!(json["licenses"].as_array().unwrap().len(), 3);

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }
}
