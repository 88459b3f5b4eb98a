//! # bijak
//!
//! GST invoicing core for a single-business billing tool: tax
//! breakdowns (CGST/SGST/IGST), financial-year invoice numbering,
//! amount-in-words rendering, and an embedded ledger with a recycle
//! bin for soft-deleted invoices.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating
//! point. Persistence is a local [`redb`] database; there is no server
//! and no concurrent-writer support (single-user tool by design).
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "lifecycle")] {
//! use bijak::core::*;
//! use bijak::lifecycle::InvoiceManager;
//! use bijak::store::LedgerStore;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let store = LedgerStore::open_in_memory().unwrap();
//! let manager = InvoiceManager::new(store);
//!
//! let mut draft = InvoiceDraft::new(
//!     NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
//!     "Sharma Textiles",
//!     TaxRates::new(dec!(9), dec!(9), dec!(0)),
//! );
//! draft.line_items.push(LineItem::new("Cotton fabric", "5208", dec!(10), dec!(100)));
//!
//! let invoice = manager.create(draft).unwrap();
//! assert_eq!(invoice.invoice_number, "2425001");
//! assert_eq!(invoice.totals.grand_total, dec!(1180));
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Invoice types, tax engine, numbering, amount-in-words |
//! | `store` | redb-backed ledger store (five keyed collections) |
//! | `lifecycle` (default) | Create/edit/soft-delete/restore orchestration |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "store")]
pub mod store;

#[cfg(feature = "lifecycle")]
pub mod lifecycle;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
