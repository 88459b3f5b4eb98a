//! Core invoicing logic: types, tax engine, numbering, words, validation.
//!
//! Everything here is pure — no storage, no clocks, no I/O. The
//! lifecycle manager wires these pieces to the ledger store.

mod error;
mod numbering;
mod tax;
mod types;
mod validation;
mod words;

pub use error::*;
pub use numbering::*;
pub use tax::*;
pub use types::*;
pub use validation::*;
pub use words::*;
