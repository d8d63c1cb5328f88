//! Value objects for the order domain.

use common::ProductId;
use serde::{Deserialize, Serialize};

/// VAT rate applied to every order, in percent.
pub const TAX_RATE_PERCENT: i64 = 19;

/// Monetary amount in minor currency units.
///
/// All arithmetic is integer arithmetic; the catalog prices modules in
/// whole minor units, so totals and the 19% tax come out exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates an amount from minor units.
    pub fn from_minor(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money(self.0 * i64::from(quantity))
    }

    /// Returns the given percentage of this amount, truncated toward zero.
    pub fn percent(&self, pct: i64) -> Money {
        Money(self.0 * pct / 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A line item within an order.
///
/// Product name and unit price are snapshots taken at order creation and
/// never re-derived from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The catalog product this line refers to.
    pub product_id: ProductId,

    /// Product name captured at creation time.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Unit price captured at creation time.
    pub unit_price: Money,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity × unit price).
    pub fn total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An optional discount applied to an order's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Promotion code the discount came from, if any.
    pub code: Option<String>,

    /// Amount subtracted from the order total.
    pub amount: Money,
}

/// Monetary totals of an order, derived from its line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Computes subtotal, tax, and total for a set of line items.
    ///
    /// `subtotal = Σ(unit price × quantity)`, `tax = subtotal × 19%`,
    /// `total = subtotal + tax − discount`. The computation is pure:
    /// calling it twice on unchanged items yields identical totals.
    pub fn compute(items: &[LineItem], discount: Option<&Discount>) -> Self {
        let subtotal: Money = items.iter().map(LineItem::total).sum();
        let tax = subtotal.percent(TAX_RATE_PERCENT);
        let discount_amount = discount.map(|d| d.amount).unwrap_or_else(Money::zero);
        let total = subtotal + tax - discount_amount;

        Self {
            subtotal,
            tax,
            total,
        }
    }
}

/// Sequential, human-facing invoice number.
///
/// Rendered zero-padded to six digits ("000001"); strictly increasing
/// across all orders, assigned exactly once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvoiceNumber(u64);

impl InvoiceNumber {
    /// Creates an invoice number from a counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl Serialize for InvoiceNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InvoiceNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u64>()
            .map(InvoiceNumber)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, quantity: u32) -> LineItem {
        LineItem::new(
            ProductId::new(),
            "Module",
            quantity,
            Money::from_minor(price),
        )
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!(a.multiply(3).minor(), 3000);
        assert_eq!(a.percent(19).minor(), 190);
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_minor(500000).to_string(), "$500000");
    }

    #[test]
    fn line_item_total() {
        assert_eq!(item(1000, 3).total().minor(), 3000);
    }

    #[test]
    fn totals_match_reference_example() {
        let totals = OrderTotals::compute(&[item(500000, 1)], None);
        assert_eq!(totals.subtotal.minor(), 500000);
        assert_eq!(totals.tax.minor(), 95000);
        assert_eq!(totals.total.minor(), 595000);
    }

    #[test]
    fn totals_sum_multiple_items() {
        let totals = OrderTotals::compute(&[item(1000, 2), item(500, 3)], None);
        assert_eq!(totals.subtotal.minor(), 3500);
        assert_eq!(totals.tax.minor(), 665);
        assert_eq!(totals.total.minor(), 4165);
    }

    #[test]
    fn totals_apply_discount() {
        let discount = Discount {
            code: Some("LAUNCH".to_string()),
            amount: Money::from_minor(5000),
        };
        let totals = OrderTotals::compute(&[item(100000, 1)], Some(&discount));
        assert_eq!(totals.total.minor(), 100000 + 19000 - 5000);
    }

    #[test]
    fn totals_are_idempotent() {
        let items = vec![item(123456, 2), item(789, 5)];
        let first = OrderTotals::compute(&items, None);
        let second = OrderTotals::compute(&items, None);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_items_total_zero() {
        let totals = OrderTotals::compute(&[], None);
        assert!(totals.subtotal.is_zero());
        assert!(totals.total.is_zero());
    }

    #[test]
    fn invoice_number_zero_padded() {
        assert_eq!(InvoiceNumber::new(1).to_string(), "000001");
        assert_eq!(InvoiceNumber::new(42).to_string(), "000042");
        assert_eq!(InvoiceNumber::new(1234567).to_string(), "1234567");
    }

    #[test]
    fn invoice_number_serializes_as_string() {
        let json = serde_json::to_string(&InvoiceNumber::new(7)).unwrap();
        assert_eq!(json, "\"000007\"");

        let back: InvoiceNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), 7);
    }
}
