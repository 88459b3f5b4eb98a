//! Invoice lifecycle orchestration on top of the ledger store.
//!
//! [`InvoiceManager`] wires the pure core (validation, numbering, tax
//! engine) to [`LedgerStore`]: create and edit invoices, move them
//! through the recycle bin, maintain customers and product shortcuts,
//! and answer history and dashboard queries.
//!
//! Time handling: record timestamps come from the wall clock, but the
//! financial year for numbering is always derived from the invoice date
//! the caller supplies, so backdated invoices number into the year they
//! belong to.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::{
    compute_totals, next_invoice_number, validate_customer, validate_draft, validation_failure,
    BijakError, Customer, DeletedInvoice, FinancialYear, Invoice, InvoiceDraft, ProductShortcut,
    ValidationError,
};
use crate::store::LedgerStore;

/// Settings key holding the last invoice number handed out.
const LAST_INVOICE_NUMBER_KEY: &str = "lastInvoiceNumber";

/// Filters for invoice history lookups. All set filters must match;
/// an empty query matches everything.
#[derive(Debug, Clone, Default)]
pub struct InvoiceQuery {
    /// Exact invoice number.
    pub invoice_number: Option<String>,
    /// Customer name, compared case-insensitively but in full.
    pub customer_name: Option<String>,
    /// Inclusive start of the invoice date range.
    pub from: Option<NaiveDate>,
    /// Inclusive end of the invoice date range.
    pub to: Option<NaiveDate>,
}

/// Outcome of emptying the recycle bin. Entries are purged
/// independently, so a failure on one does not stop the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrashReport {
    pub purged: usize,
    pub failed: usize,
}

/// A customer ranked by invoiced revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCustomer {
    pub name: String,
    pub revenue: Decimal,
}

/// Dashboard figures over all active invoices.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    /// Sum of grand totals.
    pub total_sales: Decimal,
    pub invoice_count: usize,
    /// Mean grand total, rounded to 2 dp. Zero when there are no invoices.
    pub average_sale: Decimal,
    /// Customer with the highest summed revenue, if any invoice names one.
    pub top_customer: Option<TopCustomer>,
}

/// Orchestrates invoice, customer, and shortcut operations against one
/// ledger. Cheap to clone (shares the store).
#[derive(Clone)]
pub struct InvoiceManager {
    store: LedgerStore,
}

impl InvoiceManager {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// The underlying store, for callers that need raw access.
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    // ========== Numbering ==========

    /// Hand out the next invoice number for the financial year containing
    /// `on`, and persist it as the new high-water mark.
    ///
    /// The persisted marker is the only sequencing state: if a caller
    /// discards the returned number, that number is skipped, never
    /// reissued. Single-writer by design — two processes allocating
    /// concurrently can both read the same marker and collide.
    pub fn allocate_number(&self, on: NaiveDate) -> Result<String, BijakError> {
        let fy = FinancialYear::from_date(on);
        let last = self.store.get_setting(LAST_INVOICE_NUMBER_KEY)?;
        let number = next_invoice_number(last.as_deref(), fy);
        self.store.put_setting(LAST_INVOICE_NUMBER_KEY, &number)?;
        Ok(number)
    }

    // ========== Invoices ==========

    /// Validate, number, total, and persist a new invoice.
    ///
    /// A draft with a pre-set `invoice_number` keeps it verbatim and does
    /// not touch the allocator. Numbers are not checked for uniqueness:
    /// the surrogate id is the storage key, so two invoices can share a
    /// number and both remain readable.
    pub fn create(&self, draft: InvoiceDraft) -> Result<Invoice, BijakError> {
        let errors = validate_draft(&draft);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }

        let invoice_number = match &draft.invoice_number {
            Some(number) => number.clone(),
            None => self.allocate_number(draft.date)?,
        };

        let (line_items, totals) = compute_totals(&draft.line_items, &draft.tax_rates);
        let now = Utc::now();
        let mut invoice = Invoice {
            id: 0, // assigned by the store
            invoice_number,
            date: draft.date,
            supply_date: draft.supply_date,
            customer_phone: draft.customer_phone,
            customer_name: draft.customer_name,
            customer_address: draft.customer_address,
            customer_gstin: draft.customer_gstin,
            state: draft.state,
            state_code: draft.state_code,
            transport_mode: draft.transport_mode,
            vehicle_number: draft.vehicle_number,
            place_of_supply: draft.place_of_supply,
            line_items,
            tax_rates: draft.tax_rates,
            totals,
            reverse_charge: draft.reverse_charge,
            created_at: now,
            updated_at: now,
        };
        invoice.id = self.store.put_invoice(&invoice)?;
        tracing::info!(id = invoice.id, number = %invoice.invoice_number, "invoice created");
        Ok(invoice)
    }

    /// Replace an existing invoice's content, recomputing totals.
    ///
    /// The id, invoice number, and creation timestamp are immutable
    /// across edits; a number set on the draft is ignored.
    pub fn update(&self, id: u64, draft: InvoiceDraft) -> Result<Invoice, BijakError> {
        let existing = self
            .store
            .get_invoice(id)?
            .ok_or_else(|| BijakError::NotFound(format!("invoice id {id}")))?;

        let errors = validate_draft(&draft);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }

        let (line_items, totals) = compute_totals(&draft.line_items, &draft.tax_rates);
        let invoice = Invoice {
            id,
            invoice_number: existing.invoice_number,
            date: draft.date,
            supply_date: draft.supply_date,
            customer_phone: draft.customer_phone,
            customer_name: draft.customer_name,
            customer_address: draft.customer_address,
            customer_gstin: draft.customer_gstin,
            state: draft.state,
            state_code: draft.state_code,
            transport_mode: draft.transport_mode,
            vehicle_number: draft.vehicle_number,
            place_of_supply: draft.place_of_supply,
            line_items,
            tax_rates: draft.tax_rates,
            totals,
            reverse_charge: draft.reverse_charge,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.store.put_invoice(&invoice)?;
        tracing::info!(id, number = %invoice.invoice_number, "invoice updated");
        Ok(invoice)
    }

    pub fn get(&self, id: u64) -> Result<Option<Invoice>, BijakError> {
        Ok(self.store.get_invoice(id)?)
    }

    /// All active invoices, ordered by id (creation order).
    pub fn list(&self) -> Result<Vec<Invoice>, BijakError> {
        let mut invoices = self.store.all_invoices()?;
        invoices.sort_by_key(|i| i.id);
        Ok(invoices)
    }

    /// Active invoices matching every set filter of the query.
    pub fn find_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, BijakError> {
        let invoices = self
            .list()?
            .into_iter()
            .filter(|invoice| {
                if let Some(number) = &query.invoice_number {
                    if invoice.invoice_number != *number {
                        return false;
                    }
                }
                if let Some(name) = &query.customer_name {
                    if !invoice.customer_name.eq_ignore_ascii_case(name) {
                        return false;
                    }
                }
                if let Some(from) = query.from {
                    if invoice.date < from {
                        return false;
                    }
                }
                if let Some(to) = query.to {
                    if invoice.date > to {
                        return false;
                    }
                }
                true
            })
            .collect();
        Ok(invoices)
    }

    // ========== Recycle bin ==========

    /// Move an invoice to the recycle bin, stamping the deletion time.
    pub fn soft_delete(&self, id: u64) -> Result<DeletedInvoice, BijakError> {
        self.store
            .soft_delete_invoice(id, Utc::now())?
            .ok_or_else(|| BijakError::NotFound(format!("invoice id {id}")))
    }

    /// Bring a binned invoice back, exactly as it was deleted.
    pub fn restore(&self, id: u64) -> Result<Invoice, BijakError> {
        self.store
            .restore_invoice(id)?
            .ok_or_else(|| BijakError::NotFound(format!("deleted invoice id {id}")))
    }

    /// Contents of the recycle bin, most recently deleted first.
    pub fn trash(&self) -> Result<Vec<DeletedInvoice>, BijakError> {
        let mut deleted = self.store.all_deleted_invoices()?;
        deleted.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(deleted)
    }

    /// Permanently remove one binned invoice. No-op when absent.
    pub fn purge(&self, id: u64) -> Result<(), BijakError> {
        Ok(self.store.purge_deleted_invoice(id)?)
    }

    /// Purge everything in the recycle bin, entry by entry.
    pub fn empty_trash(&self) -> Result<TrashReport, BijakError> {
        let deleted = self.store.all_deleted_invoices()?;
        let mut report = TrashReport {
            purged: 0,
            failed: 0,
        };
        for record in deleted {
            match self.store.purge_deleted_invoice(record.invoice.id) {
                Ok(()) => report.purged += 1,
                Err(error) => {
                    tracing::warn!(id = record.invoice.id, %error, "purge failed");
                    report.failed += 1;
                }
            }
        }
        tracing::info!(purged = report.purged, failed = report.failed, "recycle bin emptied");
        Ok(report)
    }

    // ========== Customers ==========

    /// Validate and upsert a customer, keyed by phone.
    pub fn save_customer(&self, customer: &Customer) -> Result<(), BijakError> {
        let errors = validate_customer(customer);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }
        Ok(self.store.put_customer(customer)?)
    }

    pub fn get_customer(&self, phone: &str) -> Result<Option<Customer>, BijakError> {
        Ok(self.store.get_customer(phone)?)
    }

    /// All customers, sorted by name.
    pub fn list_customers(&self) -> Result<Vec<Customer>, BijakError> {
        let mut customers = self.store.all_customers()?;
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }

    /// Case-insensitive substring search over name, phone, and GSTIN.
    /// A blank query returns everyone.
    pub fn search_customers(&self, query: &str) -> Result<Vec<Customer>, BijakError> {
        let needle = query.trim().to_lowercase();
        let customers = self.list_customers()?;
        if needle.is_empty() {
            return Ok(customers);
        }
        Ok(customers
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.phone.contains(&needle)
                    || c.gstin
                        .as_deref()
                        .is_some_and(|g| g.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub fn delete_customer(&self, phone: &str) -> Result<(), BijakError> {
        Ok(self.store.delete_customer(phone)?)
    }

    // ========== Product shortcuts ==========

    /// Upsert a shortcut. Both the token and its expansion are required.
    pub fn save_shortcut(&self, shortcut: &ProductShortcut) -> Result<(), BijakError> {
        let mut errors = Vec::new();
        if shortcut.shortcut.trim().is_empty() {
            errors.push(ValidationError::new("shortcut", "shortcut must not be empty"));
        }
        if shortcut.description.trim().is_empty() {
            errors.push(ValidationError::new(
                "description",
                "description must not be empty",
            ));
        }
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }
        Ok(self.store.put_shortcut(shortcut)?)
    }

    /// All shortcuts, sorted by token.
    pub fn list_shortcuts(&self) -> Result<Vec<ProductShortcut>, BijakError> {
        let mut shortcuts = self.store.all_shortcuts()?;
        shortcuts.sort_by(|a, b| a.shortcut.cmp(&b.shortcut));
        Ok(shortcuts)
    }

    /// Expand a typed token to its product description, if registered.
    pub fn expand_shortcut(&self, token: &str) -> Result<Option<String>, BijakError> {
        Ok(self.store.get_shortcut(token)?.map(|s| s.description))
    }

    pub fn delete_shortcut(&self, token: &str) -> Result<(), BijakError> {
        Ok(self.store.delete_shortcut(token)?)
    }

    // ========== Dashboard ==========

    /// Aggregate sales figures over all active invoices.
    ///
    /// Legacy records contribute whatever grand total their shape
    /// carries; unreadable totals count as zero rather than poisoning
    /// the summary.
    pub fn sales_summary(&self) -> Result<SalesSummary, BijakError> {
        self.sales_summary_between(None, None)
    }

    /// Sales figures restricted to an inclusive invoice-date range.
    /// Either bound may be open.
    pub fn sales_summary_between(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<SalesSummary, BijakError> {
        let invoices = self.find_invoices(&InvoiceQuery {
            from,
            to,
            ..Default::default()
        })?;
        let invoice_count = invoices.len();
        let mut total_sales = Decimal::ZERO;
        let mut by_customer: HashMap<String, Decimal> = HashMap::new();

        for invoice in &invoices {
            total_sales += invoice.totals.grand_total;
            let name = invoice.customer_name.trim();
            if !name.is_empty() {
                *by_customer.entry(name.to_string()).or_insert(Decimal::ZERO) +=
                    invoice.totals.grand_total;
            }
        }

        let average_sale = if invoice_count == 0 {
            Decimal::ZERO
        } else {
            (total_sales / Decimal::from(invoice_count as u64))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        // Ties resolve to the lexicographically larger name, so the
        // result is stable across runs.
        let top_customer = by_customer
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
            .map(|(name, revenue)| TopCustomer { name, revenue });

        Ok(SalesSummary {
            total_sales,
            invoice_count,
            average_sale,
            top_customer,
        })
    }
}
