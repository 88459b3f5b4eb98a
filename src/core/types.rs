use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A customer, keyed by phone number.
///
/// Customers are upserted on save and referenced from invoices by copy,
/// not by foreign key — an invoice keeps the customer fields it was
/// issued with even if the customer record changes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Primary key: exactly 10 digits.
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    /// GST registration number, if the customer has one.
    #[serde(default)]
    pub gstin: Option<String>,
}

/// A typed token expanding to a full product description during entry.
///
/// A lookup table only — shortcuts play no part in invoice integrity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductShortcut {
    /// Primary key.
    pub shortcut: String,
    pub description: String,
}

/// One invoice line. Embedded in [`Invoice`], never stored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    /// HSN classification code for tax reporting.
    #[serde(default)]
    pub hsn_code: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    /// quantity × rate, set by the tax engine.
    pub amount: Decimal,
    /// Equal to `amount` — no discount modeling.
    pub taxable_value: Decimal,
}

impl LineItem {
    /// A raw line as entered; `amount`/`taxable_value` are filled in by
    /// [`compute_totals`](crate::core::compute_totals).
    pub fn new(
        description: impl Into<String>,
        hsn_code: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            hsn_code: hsn_code.into(),
            quantity,
            rate,
            amount: Decimal::ZERO,
            taxable_value: Decimal::ZERO,
        }
    }
}

/// The three GST rate percentages. By convention exactly one of
/// {cgst+sgst} and igst is nonzero, but this is the caller's
/// responsibility — nothing here enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRates {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

impl TaxRates {
    pub fn new(cgst: Decimal, sgst: Decimal, igst: Decimal) -> Self {
        Self { cgst, sgst, igst }
    }
}

/// Derived invoice totals, produced by the tax engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of all line taxable values.
    pub sub_total: Decimal,
    pub cgst_amount: Decimal,
    pub sgst_amount: Decimal,
    pub igst_amount: Decimal,
    /// cgst + sgst + igst amounts, exactly.
    pub total_tax_amount: Decimal,
    /// Signed difference `grand_total − (sub_total + total_tax_amount)`.
    pub round_off: Decimal,
    /// sub_total + total tax, rounded to the nearest whole rupee.
    pub grand_total: Decimal,
    /// Words rendering of the grand total.
    pub amount_in_words: String,
}

/// A fully assembled, persisted invoice record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Store-assigned surrogate key.
    pub id: u64,
    /// Business key: `YYFF NNN` — financial-year prefix + zero-padded
    /// sequence (e.g. "2425001"). Immutable once assigned.
    pub invoice_number: String,
    pub date: NaiveDate,
    pub supply_date: NaiveDate,

    // Customer fields, copied at issue time.
    pub customer_phone: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_gstin: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub state_code: String,

    // Transport fields.
    #[serde(default)]
    pub transport_mode: String,
    #[serde(default)]
    pub vehicle_number: String,
    #[serde(default)]
    pub place_of_supply: String,

    pub line_items: Vec<LineItem>,
    pub tax_rates: TaxRates,
    #[serde(flatten)]
    pub totals: Totals,

    pub reverse_charge: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw invoice input as collected by the entry form, before numbering
/// and totals computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    /// Pre-assigned number (manual entry during edit). When `None`, the
    /// allocator assigns the next sequential number.
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub date: NaiveDate,
    pub supply_date: NaiveDate,
    #[serde(default)]
    pub customer_phone: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_gstin: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub state_code: String,
    #[serde(default)]
    pub transport_mode: String,
    #[serde(default)]
    pub vehicle_number: String,
    #[serde(default)]
    pub place_of_supply: String,
    pub line_items: Vec<LineItem>,
    pub tax_rates: TaxRates,
    #[serde(default)]
    pub reverse_charge: bool,
}

impl InvoiceDraft {
    pub fn new(date: NaiveDate, customer_name: impl Into<String>, rates: TaxRates) -> Self {
        Self {
            invoice_number: None,
            date,
            supply_date: date,
            customer_phone: String::new(),
            customer_name: customer_name.into(),
            customer_address: String::new(),
            customer_gstin: String::new(),
            state: String::new(),
            state_code: String::new(),
            transport_mode: String::new(),
            vehicle_number: String::new(),
            place_of_supply: String::new(),
            line_items: Vec::new(),
            tax_rates: rates,
            reverse_charge: false,
        }
    }
}

/// An invoice moved verbatim into the recycle bin.
///
/// Same fields, same id — only `deleted_at` is added. Restoring drops
/// the timestamp and puts the record back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedInvoice {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub deleted_at: DateTime<Utc>,
}
