//! Receipt data model.
//!
//! The business layer owns transactions, staff, customers and tables. This
//! module declares the slice of that data a receipt reads, plus the
//! [`ReceiptDocument`] view assembled from it for a single print.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::money::Money;

// ============================================================================
// BRANDING
// ============================================================================

/// Store branding printed in the receipt header and footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessProfile {
    pub name: String,
    /// Address lines, printed centered in order
    pub address: Vec<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    /// Footer lines; a stock thank-you is printed when empty
    pub footer: Vec<String>,
    /// Logo URL or file path
    pub logo: Option<String>,
}

// ============================================================================
// LINE ITEMS AND PAYMENTS
// ============================================================================

/// A priced option attached to a line item (e.g. "Extra shot").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    pub name: String,
    #[serde(default)]
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            modifiers: Vec::new(),
            special_instructions: None,
        }
    }

    /// Add a priced modifier.
    pub fn modifier(mut self, name: impl Into<String>, price: Money) -> Self {
        self.modifiers.push(Modifier {
            name: name.into(),
            price,
        });
        self
    }

    /// Attach a kitchen note.
    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.special_instructions = Some(text.into());
        self
    }

    /// Base price times quantity, excluding modifiers.
    pub fn base_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Discount classification as recorded by the business layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Regular,
    Promo,
    Employee,
    SeniorCitizen,
    Disability,
}

impl DiscountKind {
    /// Senior citizen and disability discounts are sold VAT-exempt.
    pub fn is_vat_exempt(self) -> bool {
        matches!(self, DiscountKind::SeniorCitizen | DiscountKind::Disability)
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscountKind::Regular => "Discount",
            DiscountKind::Promo => "Promo Discount",
            DiscountKind::Employee => "Employee Discount",
            DiscountKind::SeniorCitizen => "Senior Citizen Disc.",
            DiscountKind::Disability => "PWD Discount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Tender name as shown on the receipt ("Cash", "Card", ...)
    pub method: String,
    pub amount: Money,
    #[serde(default)]
    pub reference: Option<String>,
}

// ============================================================================
// COLLABORATOR RECORDS
// ============================================================================

/// A completed sale, as handed over by the business layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub receipt_number: String,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub discount_kind: Option<DiscountKind>,
    #[serde(default)]
    pub service_charge: Money,
    #[serde(default)]
    pub tax: Money,
    #[serde(default)]
    pub tip: Money,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub label: String,
}

// ============================================================================
// RECEIPT DOCUMENT
// ============================================================================

/// How the payments relate to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Exact,
    Change(Money),
    BalanceDue(Money),
}

/// Everything one printed receipt shows. Built fresh for each print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDocument {
    pub business: BusinessProfile,
    pub transaction_id: String,
    pub receipt_number: String,
    pub created_at: NaiveDateTime,
    pub cashier: Option<String>,
    pub table: Option<String>,
    pub customer: Option<String>,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub discount_kind: Option<DiscountKind>,
    pub service_charge: Money,
    pub tax: Money,
    pub tip: Money,
    pub total: Money,
    pub payments: Vec<Payment>,
}

impl ReceiptDocument {
    /// Assemble the receipt view of a transaction.
    pub fn from_transaction(
        transaction: &Transaction,
        business: &BusinessProfile,
        cashier: Option<&Employee>,
        customer: Option<&Customer>,
        table: Option<&Table>,
    ) -> Self {
        Self {
            business: business.clone(),
            transaction_id: transaction.id.clone(),
            receipt_number: transaction.receipt_number.clone(),
            created_at: transaction.created_at,
            cashier: cashier.map(|e| e.name.clone()),
            table: table.map(|t| t.label.clone()),
            customer: customer.map(|c| c.name.clone()),
            items: transaction.items.clone(),
            subtotal: transaction.subtotal,
            discount: transaction.discount,
            discount_kind: transaction.discount_kind,
            service_charge: transaction.service_charge,
            tax: transaction.tax,
            tip: transaction.tip,
            total: transaction.total,
            payments: transaction.payments.clone(),
        }
    }

    pub fn amount_paid(&self) -> Money {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Change owed to the customer, or the balance still due.
    pub fn settlement(&self) -> Settlement {
        let diff = self.amount_paid() - self.total;
        if diff.is_positive() {
            Settlement::Change(diff)
        } else if diff.is_negative() {
            Settlement::BalanceDue(diff.abs())
        } else {
            Settlement::Exact
        }
    }

    /// Tax was waived because of the discount classification.
    pub fn is_vat_exempt(&self) -> bool {
        self.tax.is_zero() && self.discount_kind.is_some_and(DiscountKind::is_vat_exempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction() -> Transaction {
        serde_json::from_str(
            r#"{
                "id": "tx-1",
                "receipt_number": "000042",
                "created_at": "2026-03-01T09:30:00",
                "items": [{"name": "Latte", "quantity": 2, "unit_price": 450}],
                "subtotal": 900,
                "total": 900,
                "payments": [{"method": "Cash", "amount": 1000}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_from_transaction_copies_references() {
        let cashier = Employee {
            id: "e1".into(),
            name: "Dana".into(),
        };
        let table = Table {
            id: "t4".into(),
            label: "T4".into(),
        };
        let doc = ReceiptDocument::from_transaction(
            &transaction(),
            &BusinessProfile::default(),
            Some(&cashier),
            None,
            Some(&table),
        );
        assert_eq!(doc.cashier.as_deref(), Some("Dana"));
        assert_eq!(doc.table.as_deref(), Some("T4"));
        assert_eq!(doc.customer, None);
        assert_eq!(doc.items.len(), 1);
    }

    #[test]
    fn test_settlement() {
        let mut doc = ReceiptDocument::from_transaction(
            &transaction(),
            &BusinessProfile::default(),
            None,
            None,
            None,
        );
        assert_eq!(doc.settlement(), Settlement::Change(Money::from_cents(100)));

        doc.payments[0].amount = Money::from_cents(500);
        assert_eq!(
            doc.settlement(),
            Settlement::BalanceDue(Money::from_cents(400))
        );

        doc.payments[0].amount = Money::from_cents(900);
        assert_eq!(doc.settlement(), Settlement::Exact);
    }

    #[test]
    fn test_vat_exempt_requires_zero_tax() {
        let mut doc = ReceiptDocument::from_transaction(
            &transaction(),
            &BusinessProfile::default(),
            None,
            None,
            None,
        );
        doc.discount_kind = Some(DiscountKind::SeniorCitizen);
        assert!(doc.is_vat_exempt());

        doc.tax = Money::from_cents(12);
        assert!(!doc.is_vat_exempt());

        doc.tax = Money::zero();
        doc.discount_kind = Some(DiscountKind::Promo);
        assert!(!doc.is_vat_exempt());
    }
}
