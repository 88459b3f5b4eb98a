//! redb-backed ledger store: five keyed collections plus a counter.
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `invoices` | invoice id (`u64`) | JSON `Invoice` |
//! | `deleted_invoices` | invoice id (`u64`) | JSON `DeletedInvoice` |
//! | `customers` | phone (`&str`) | JSON `Customer` |
//! | `product_shortcuts` | shortcut (`&str`) | JSON `ProductShortcut` |
//! | `settings` | key (`&str`) | value (`&str`) |
//! | `meta` | name (`&str`) | `u64` (invoice id counter) |
//!
//! Values are JSON so historic record shapes can be read through a
//! legacy-normalization step on decode. redb commits are durable when
//! `commit()` returns; soft-delete and restore move records between
//! tables inside a single write transaction, so a half-applied move is
//! not observable.
//!
//! Reads of absent keys return `Ok(None)`; deletes of absent keys are
//! successful no-ops. Genuine storage failures surface as
//! [`StoreError`] with no retries.

mod migrate;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use thiserror::Error;

use crate::core::{Customer, DeletedInvoice, Invoice, ProductShortcut};

const INVOICES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("invoices");
const DELETED_INVOICES_TABLE: TableDefinition<u64, &[u8]> =
    TableDefinition::new("deleted_invoices");
const CUSTOMERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("customers");
const PRODUCT_SHORTCUTS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("product_shortcuts");
const SETTINGS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("settings");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const INVOICE_ID_KEY: &str = "last_invoice_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("record decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The ledger store. Cheap to clone; all clones share one database.
#[derive(Clone)]
pub struct LedgerStore {
    db: Arc<Database>,
}

impl LedgerStore {
    /// Open or create the ledger database at the given path.
    ///
    /// Schema setup is idempotent: all tables are created if missing and
    /// the invoice id counter is seeded once. Safe to call on every
    /// start against the same file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory ledger, for tests and ephemeral use.
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(INVOICES_TABLE)?;
            let _ = txn.open_table(DELETED_INVOICES_TABLE)?;
            let _ = txn.open_table(CUSTOMERS_TABLE)?;
            let _ = txn.open_table(PRODUCT_SHORTCUTS_TABLE)?;
            let _ = txn.open_table(SETTINGS_TABLE)?;

            let mut meta = txn.open_table(META_TABLE)?;
            if meta.get(INVOICE_ID_KEY)?.is_none() {
                meta.insert(INVOICE_ID_KEY, 0u64)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Invoice id counter ==========

    /// Allocate the next surrogate invoice id.
    pub fn next_invoice_id(&self) -> StoreResult<u64> {
        let txn = self.db.begin_write()?;
        let next = {
            let mut meta = txn.open_table(META_TABLE)?;
            let current = meta.get(INVOICE_ID_KEY)?.map(|g| g.value()).unwrap_or(0);
            let next = current + 1;
            meta.insert(INVOICE_ID_KEY, next)?;
            next
        };
        txn.commit()?;
        Ok(next)
    }

    // ========== Customers ==========

    /// Insert or overwrite a customer, keyed by phone. Full-record
    /// replacement, not a partial patch.
    pub fn put_customer(&self, customer: &Customer) -> StoreResult<()> {
        let value = serde_json::to_vec(customer)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CUSTOMERS_TABLE)?;
            table.insert(customer.phone.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_customer(&self, phone: &str) -> StoreResult<Option<Customer>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CUSTOMERS_TABLE)?;
        match table.get(phone)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All customers, order unspecified.
    pub fn all_customers(&self) -> StoreResult<Vec<Customer>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CUSTOMERS_TABLE)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    pub fn delete_customer(&self, phone: &str) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CUSTOMERS_TABLE)?;
            table.remove(phone)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Invoices ==========

    /// Insert or overwrite an invoice under its id, returning the key.
    ///
    /// An invoice with id 0 is treated as new and gets the next id from
    /// the counter before being stored.
    pub fn put_invoice(&self, invoice: &Invoice) -> StoreResult<u64> {
        let mut record = invoice.clone();
        if record.id == 0 {
            record.id = self.next_invoice_id()?;
        }
        let value = serde_json::to_vec(&record)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(INVOICES_TABLE)?;
            table.insert(record.id, value.as_slice())?;
        }
        txn.commit()?;
        tracing::debug!(id = record.id, number = %record.invoice_number, "invoice stored");
        Ok(record.id)
    }

    pub fn get_invoice(&self, id: u64) -> StoreResult<Option<Invoice>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(INVOICES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(migrate::decode_invoice(id, value.value())?)),
            None => Ok(None),
        }
    }

    /// All active invoices, order unspecified. Records in historic
    /// shapes are normalized on the way out.
    pub fn all_invoices(&self) -> StoreResult<Vec<Invoice>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(INVOICES_TABLE)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            out.push(migrate::decode_invoice(key.value(), value.value())?);
        }
        Ok(out)
    }

    pub fn delete_invoice(&self, id: u64) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(INVOICES_TABLE)?;
            table.remove(id)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Recycle bin ==========

    /// Move an active invoice into the recycle bin, in one transaction.
    ///
    /// Returns the moved record, or `None` when the id is absent (the
    /// transaction then commits without changing anything).
    pub fn soft_delete_invoice(
        &self,
        id: u64,
        deleted_at: DateTime<Utc>,
    ) -> StoreResult<Option<DeletedInvoice>> {
        let txn = self.db.begin_write()?;
        let moved = {
            let mut invoices = txn.open_table(INVOICES_TABLE)?;
            let mut deleted = txn.open_table(DELETED_INVOICES_TABLE)?;

            let invoice = match invoices.get(id)? {
                Some(value) => Some(migrate::decode_invoice(id, value.value())?),
                None => None,
            };

            match invoice {
                Some(invoice) => {
                    let record = DeletedInvoice {
                        invoice,
                        deleted_at,
                    };
                    let value = serde_json::to_vec(&record)?;
                    deleted.insert(id, value.as_slice())?;
                    invoices.remove(id)?;
                    Some(record)
                }
                None => None,
            }
        };
        txn.commit()?;
        if let Some(record) = &moved {
            tracing::debug!(id, number = %record.invoice.invoice_number, "invoice soft-deleted");
        }
        Ok(moved)
    }

    /// Move a binned invoice back to the active collection, dropping its
    /// deletion timestamp. Single transaction, mirror of soft delete.
    pub fn restore_invoice(&self, id: u64) -> StoreResult<Option<Invoice>> {
        let txn = self.db.begin_write()?;
        let restored = {
            let mut invoices = txn.open_table(INVOICES_TABLE)?;
            let mut deleted = txn.open_table(DELETED_INVOICES_TABLE)?;

            let record: Option<DeletedInvoice> = match deleted.get(id)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };

            match record {
                Some(record) => {
                    let value = serde_json::to_vec(&record.invoice)?;
                    invoices.insert(id, value.as_slice())?;
                    deleted.remove(id)?;
                    Some(record.invoice)
                }
                None => None,
            }
        };
        txn.commit()?;
        if let Some(invoice) = &restored {
            tracing::debug!(id, number = %invoice.invoice_number, "invoice restored");
        }
        Ok(restored)
    }

    pub fn get_deleted_invoice(&self, id: u64) -> StoreResult<Option<DeletedInvoice>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DELETED_INVOICES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Everything currently in the recycle bin, order unspecified.
    pub fn all_deleted_invoices(&self) -> StoreResult<Vec<DeletedInvoice>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(DELETED_INVOICES_TABLE)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    /// Remove a binned invoice permanently. No-op when absent.
    pub fn purge_deleted_invoice(&self, id: u64) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(DELETED_INVOICES_TABLE)?;
            table.remove(id)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Product shortcuts ==========

    pub fn put_shortcut(&self, shortcut: &ProductShortcut) -> StoreResult<()> {
        let value = serde_json::to_vec(shortcut)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCT_SHORTCUTS_TABLE)?;
            table.insert(shortcut.shortcut.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_shortcut(&self, key: &str) -> StoreResult<Option<ProductShortcut>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCT_SHORTCUTS_TABLE)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn all_shortcuts(&self) -> StoreResult<Vec<ProductShortcut>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(PRODUCT_SHORTCUTS_TABLE)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    pub fn delete_shortcut(&self, key: &str) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PRODUCT_SHORTCUTS_TABLE)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Settings ==========

    pub fn put_setting(&self, key: &str, value: &str) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> StoreResult<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS_TABLE)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }
}
