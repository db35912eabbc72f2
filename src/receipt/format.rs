//! # Receipt Formatter
//!
//! Renders a [`ReceiptDocument`] as plain fixed-width text.
//!
//! ## Section Order
//!
//! ```text
//! ┌────────────────────────────────┐
//! │          CORNER CAFE           │  header: name (unless a logo is
//! │           12 Main St           │  printed), address, phone, tax id
//! │      Tax ID: 123-456-789       │
//! │================================│
//! │Receipt #: 000042               │  metadata
//! │Date: 2026-03-01 09:30          │
//! │Cashier: Dana                   │
//! │--------------------------------│
//! │2 x Latte                   9.00│  items
//! │  + Oat milk                1.00│
//! │--------------------------------│
//! │Subtotal                   10.00│  totals
//! │TOTAL                      10.00│
//! │--------------------------------│
//! │Cash                       20.00│  payments
//! │Change                     10.00│
//! │================================│
//! │           Thank you!           │  footer
//! └────────────────────────────────┘
//! ```
//!
//! Output depends only on the document and the width.

use super::layout::{align_right, center, char_len, money_line, separator, wrap, wrap_indented};
use super::money::Money;
use super::types::{ReceiptDocument, Settlement};
use crate::printer::PaperWidth;

/// Footer printed when the business profile has none.
pub const DEFAULT_FOOTER: &str = "Thank you!";

/// Marker printed in place of a tax line on exempt sales.
pub const VAT_EXEMPT_MARKER: &str = "VAT-Exempt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a receipt with a text header.
pub fn format(document: &ReceiptDocument, paper_width: PaperWidth) -> String {
    Formatter::new(paper_width).format(document)
}

/// Receipt formatter for one paper width.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    width: usize,
    logo: bool,
}

impl Formatter {
    pub fn new(paper_width: PaperWidth) -> Self {
        Self {
            width: paper_width.columns(),
            logo: false,
        }
    }

    /// Set when a logo image is printed above the text; the business name
    /// line is then left out of the header.
    pub fn with_logo(mut self, logo: bool) -> Self {
        self.logo = logo;
        self
    }

    pub fn format(&self, doc: &ReceiptDocument) -> String {
        let mut out = Lines::new(self.width);
        self.header(doc, &mut out);
        self.metadata(doc, &mut out);
        self.items(doc, &mut out);
        self.totals(doc, &mut out);
        self.payments(doc, &mut out);
        self.footer(doc, &mut out);
        out.finish()
    }

    fn header(&self, doc: &ReceiptDocument, out: &mut Lines) {
        let business = &doc.business;
        if !self.logo && !business.name.is_empty() {
            out.centered(&business.name);
        }
        for line in &business.address {
            out.centered(line);
        }
        if let Some(phone) = &business.phone {
            out.centered(&format!("Tel: {}", phone));
        }
        if let Some(tax_id) = &business.tax_id {
            out.centered(&format!("Tax ID: {}", tax_id));
        }
        out.rule('=');
    }

    fn metadata(&self, doc: &ReceiptDocument, out: &mut Lines) {
        out.text(&format!("Receipt #: {}", doc.receipt_number));
        out.text(&format!("Date: {}", doc.created_at.format(TIMESTAMP_FORMAT)));
        if let Some(cashier) = &doc.cashier {
            out.text(&format!("Cashier: {}", cashier));
        }
        if let Some(table) = &doc.table {
            out.text(&format!("Table: {}", table));
        }
        if let Some(customer) = &doc.customer {
            out.text(&format!("Customer: {}", customer));
        }
        out.rule('-');
    }

    fn items(&self, doc: &ReceiptDocument, out: &mut Lines) {
        if doc.items.is_empty() {
            return;
        }
        for item in &doc.items {
            out.amount(
                &format!("{} x {}", item.quantity, item.name),
                item.base_total(),
            );
            for modifier in &item.modifiers {
                if modifier.price.is_zero() {
                    out.indented(&format!("+ {}", modifier.name), 2);
                } else {
                    out.indented_amount(
                        &format!("+ {}", modifier.name),
                        2,
                        modifier.price * item.quantity,
                    );
                }
            }
            if let Some(note) = &item.special_instructions {
                out.indented(&format!("* {}", note), 2);
            }
        }
        out.rule('-');
    }

    fn totals(&self, doc: &ReceiptDocument, out: &mut Lines) {
        out.amount("Subtotal", doc.subtotal);
        if doc.discount.is_positive() {
            let label = doc.discount_kind.map_or("Discount", |kind| kind.label());
            out.amount(label, -doc.discount);
        }
        if doc.service_charge.is_positive() {
            out.amount("Service Charge", doc.service_charge);
        }
        if doc.tax.is_positive() {
            out.amount("Tax", doc.tax);
        } else if doc.is_vat_exempt() {
            out.push(align_right(VAT_EXEMPT_MARKER, self.width));
        }
        if doc.tip.is_positive() {
            out.amount("Tip", doc.tip);
        }
        out.amount("TOTAL", doc.total);
    }

    fn payments(&self, doc: &ReceiptDocument, out: &mut Lines) {
        let settlement = doc.settlement();
        if doc.payments.is_empty() && settlement == Settlement::Exact {
            return;
        }
        out.rule('-');
        for payment in &doc.payments {
            out.amount(&payment.method, payment.amount);
            if let Some(reference) = &payment.reference {
                out.indented(&format!("Ref: {}", reference), 2);
            }
        }
        match settlement {
            Settlement::Change(change) => out.amount("Change", change),
            Settlement::BalanceDue(due) => out.amount("Balance Due", due),
            Settlement::Exact => {}
        }
    }

    fn footer(&self, doc: &ReceiptDocument, out: &mut Lines) {
        out.rule('=');
        if doc.business.footer.is_empty() {
            out.centered(DEFAULT_FOOTER);
        } else {
            for line in &doc.business.footer {
                out.centered(line);
            }
        }
    }
}

/// Accumulates output lines, wrapping each to the paper width.
struct Lines {
    width: usize,
    lines: Vec<String>,
}

impl Lines {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn text(&mut self, line: &str) {
        self.lines.extend(wrap(line, self.width));
    }

    fn indented(&mut self, line: &str, indent: usize) {
        self.lines.extend(wrap_indented(line, self.width, indent));
    }

    fn centered(&mut self, line: &str) {
        for part in wrap(line, self.width) {
            self.lines.push(center(&part, self.width));
        }
    }

    fn rule(&mut self, ch: char) {
        self.lines.push(separator(ch, self.width));
    }

    /// Label plus right-aligned amount. A label too long to share the line
    /// is wrapped first and the amount goes on its last line.
    fn amount(&mut self, label: &str, amount: Money) {
        self.indented_amount(label, 0, amount);
    }

    /// Like [`Lines::amount`], with every label line shifted right by `indent`.
    fn indented_amount(&mut self, label: &str, indent: usize, amount: Money) {
        let amount = amount.to_string();
        let room = self.width.saturating_sub(char_len(&amount) + 1).max(1);
        let mut parts = wrap_indented(label, room, indent);
        let last = parts.pop().unwrap_or_default();
        self.lines.extend(parts);
        self.lines.push(money_line(&last, &amount, self.width));
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

// ============================================================================
// TESTS
// ============================================================================
