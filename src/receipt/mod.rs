//! # Receipts
//!
//! Receipt data and the fixed-width text formatter.
//!
//! ## Module Structure
//!
//! - [`money`]: Integer-cents amounts
//! - [`types`]: Business-layer inputs and the [`ReceiptDocument`] view
//! - [`layout`]: Wrapping, alignment and label/amount lines
//! - [`format`]: Section-by-section receipt rendering
//!
//! ## Example
//!
//! ```
//! use blueslip::printer::PaperWidth;
//! use blueslip::receipt::{self, BusinessProfile, ReceiptDocument, Transaction};
//!
//! let tx: Transaction = serde_json::from_str(r#"{
//!     "id": "tx-9", "receipt_number": "0009", "created_at": "2026-01-20T12:00:00",
//!     "items": [{"name": "Espresso", "quantity": 1, "unit_price": 300}],
//!     "subtotal": 300, "total": 300
//! }"#)?;
//! let business = BusinessProfile { name: "CHURRA MART".into(), ..Default::default() };
//! let doc = ReceiptDocument::from_transaction(&tx, &business, None, None, None);
//!
//! let text = receipt::format(&doc, PaperWidth::Cols32);
//! assert!(text.contains("1 x Espresso"));
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod format;
pub mod layout;
pub mod money;
pub mod types;

pub use format::{Formatter, format};
pub use money::Money;
pub use types::{
    BusinessProfile, Customer, DiscountKind, Employee, LineItem, Modifier, Payment,
    ReceiptDocument, Settlement, Table, Transaction,
};
