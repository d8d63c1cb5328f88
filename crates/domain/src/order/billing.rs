//! Billing records attached to an order.

use serde::{Deserialize, Serialize};

/// Whether the customer wants a simple receipt or a business invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingType {
    /// Consumer receipt.
    Receipt,
    /// Business invoice; requires the business fields to be populated.
    Invoice,
}

impl BillingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingType::Receipt => "receipt",
            BillingType::Invoice => "invoice",
        }
    }
}

impl std::fmt::Display for BillingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BillingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receipt" => Ok(BillingType::Receipt),
            "invoice" => Ok(BillingType::Invoice),
            other => Err(format!("unknown billing type: {other}")),
        }
    }
}

/// Billing details captured with an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    #[serde(rename = "type")]
    pub kind: BillingType,

    /// National tax identifier of the buyer.
    pub tax_id: String,

    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: String,
    pub city: String,
    pub region: String,

    // Business fields, required when `kind` is `Invoice`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_activity: Option<String>,
}

impl Billing {
    /// Returns true if the invoice-specific business fields are populated.
    pub fn has_business_fields(&self) -> bool {
        fn present(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|s| !s.trim().is_empty())
        }

        present(&self.business_name) && present(&self.business_tax_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_billing() -> Billing {
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

    #[test]
    fn billing_type_parses_known_values() {
        assert_eq!("receipt".parse::<BillingType>(), Ok(BillingType::Receipt));
        assert_eq!("invoice".parse::<BillingType>(), Ok(BillingType::Invoice));
        assert!("bogus".parse::<BillingType>().is_err());
    }

    #[test]
    fn billing_type_rejected_in_json() {
        let result = serde_json::from_str::<BillingType>("\"boleta\"");
        assert!(result.is_err());
    }

    #[test]
    fn receipt_does_not_need_business_fields() {
        let billing = receipt_billing();
        assert!(!billing.has_business_fields());
    }

    #[test]
    fn blank_business_fields_do_not_count() {
        let mut billing = receipt_billing();
        billing.business_name = Some("  ".to_string());
        billing.business_tax_id = Some("76.000.000-0".to_string());
        assert!(!billing.has_business_fields());
    }

    #[test]
    fn billing_serializes_type_field() {
        let json = serde_json::to_value(receipt_billing()).unwrap();
        assert_eq!(json["type"], "receipt");
    }
}
