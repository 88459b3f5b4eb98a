//! Normalization of historic invoice record shapes.
//!
//! The ledger has carried two earlier record layouts:
//!
//! 1. PDF-era records: `{invoiceNo, customerName, date, total, pdfData,
//!    timestamp}` — the whole invoice is a rendered PDF plus a total.
//! 2. Form-era records: `{invoiceNo, invoiceDate, customer fields,
//!    products: [...], taxData: {...}, grandTotal, amountInWords,
//!    createdAt}` — every figure stored as a display string.
//!
//! Reads normalize both into the canonical [`Invoice`]. Normalization
//! never fails on a legacy record: missing fields default, unparseable
//! numbers coerce to zero, so one malformed historic row cannot take a
//! whole listing down.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::core::{parse_amount, Invoice, LineItem, TaxRates, Totals};

/// Decode a stored invoice record, normalizing legacy shapes.
///
/// Canonical records deserialize directly; anything else goes through
/// the tolerant legacy path. `id` is the table key and always wins over
/// whatever the record body claims.
pub(crate) fn decode_invoice(id: u64, bytes: &[u8]) -> Result<Invoice, serde_json::Error> {
    let value: Value = serde_json::from_slice(bytes)?;

    if value.get("invoiceNumber").is_some() {
        let mut invoice: Invoice = serde_json::from_value(value)?;
        invoice.id = id;
        return Ok(invoice);
    }

    Ok(normalize_legacy(id, &value))
}

/// Read a numeric field that may be a JSON number or a display string.
fn decimal_of(value: &Value) -> Decimal {
    match value {
        Value::String(s) => parse_amount(s),
        Value::Number(n) => parse_amount(&n.to_string()),
        _ => Decimal::ZERO,
    }
}

fn decimal_field(object: &Value, key: &str) -> Decimal {
    object.get(key).map(decimal_of).unwrap_or(Decimal::ZERO)
}

fn string_field(object: &Value, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn date_field(object: &Value, key: &str) -> Option<NaiveDate> {
    object
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// The grand total of a historic record, whichever field it lives in.
fn legacy_grand_total(object: &Value) -> Decimal {
    for key in ["grandTotal", "total", "amount"] {
        if let Some(value) = object.get(key) {
            let amount = decimal_of(value);
            if amount != Decimal::ZERO {
                return amount;
            }
        }
    }
    object
        .get("taxData")
        .map(|tax| decimal_field(tax, "grandTotal"))
        .unwrap_or(Decimal::ZERO)
}

fn normalize_legacy(id: u64, object: &Value) -> Invoice {
    let fallback_date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let date = date_field(object, "invoiceDate")
        .or_else(|| date_field(object, "date"))
        .unwrap_or(fallback_date);
    let supply_date = date_field(object, "supplyDate").unwrap_or(date);

    let created_at = object
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())
        .or_else(|| {
            object
                .get("timestamp")
                .and_then(Value::as_i64)
                .and_then(DateTime::from_timestamp_millis)
        })
        .unwrap_or(DateTime::UNIX_EPOCH);

    let line_items: Vec<LineItem> = object
        .get("products")
        .and_then(Value::as_array)
        .map(|products| {
            products
                .iter()
                .map(|p| LineItem {
                    description: string_field(p, "description"),
                    hsn_code: string_field(p, "hsnCode"),
                    quantity: decimal_field(p, "qty"),
                    rate: decimal_field(p, "rate"),
                    amount: decimal_field(p, "amount"),
                    taxable_value: decimal_field(p, "taxableValue"),
                })
                .collect()
        })
        .unwrap_or_default();

    let tax = object.get("taxData");
    let tax_rates = tax
        .map(|t| {
            TaxRates::new(
                decimal_field(t, "cgstRate"),
                decimal_field(t, "sgstRate"),
                decimal_field(t, "igstRate"),
            )
        })
        .unwrap_or(TaxRates::new(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));

    let grand_total = legacy_grand_total(object);
    let totals = Totals {
        sub_total: tax.map(|t| decimal_field(t, "subTotal")).unwrap_or(grand_total),
        cgst_amount: tax.map(|t| decimal_field(t, "cgstAmount")).unwrap_or(Decimal::ZERO),
        sgst_amount: tax.map(|t| decimal_field(t, "sgstAmount")).unwrap_or(Decimal::ZERO),
        igst_amount: tax.map(|t| decimal_field(t, "igstAmount")).unwrap_or(Decimal::ZERO),
        total_tax_amount: tax
            .map(|t| decimal_field(t, "totalTaxAmount"))
            .unwrap_or(Decimal::ZERO),
        round_off: tax.map(|t| decimal_field(t, "roundOff")).unwrap_or(Decimal::ZERO),
        grand_total,
        amount_in_words: string_field(object, "amountInWords"),
    };

    // Old forms stored reverse charge as the literal strings "Yes"/"No".
    let reverse_charge = object
        .get("reverseCharge")
        .map(|v| match v {
            Value::Bool(b) => *b,
            Value::String(s) => s.eq_ignore_ascii_case("yes"),
            _ => false,
        })
        .unwrap_or(false);

    Invoice {
        id,
        invoice_number: string_field(object, "invoiceNo"),
        date,
        supply_date,
        customer_phone: string_field(object, "customerPhone"),
        customer_name: string_field(object, "customerName"),
        customer_address: string_field(object, "customerAddress"),
        customer_gstin: string_field(object, "customerGSTIN"),
        state: string_field(object, "state"),
        state_code: string_field(object, "stateCode"),
        transport_mode: string_field(object, "transportMode"),
        vehicle_number: string_field(object, "vehicleNumber"),
        place_of_supply: string_field(object, "placeOfSupply"),
        line_items,
        tax_rates,
        totals,
        reverse_charge,
        created_at,
        updated_at: created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn canonical_records_pass_through() {
        let record = json!({
            "id": 0,
            "invoiceNumber": "2425007",
            "date": "2024-06-15",
            "supplyDate": "2024-06-15",
            "customerPhone": "9876543210",
            "customerName": "Sharma Textiles",
            "lineItems": [],
            "taxRates": {"cgst": "9", "sgst": "9", "igst": "0"},
            "subTotal": "0",
            "cgstAmount": "0",
            "sgstAmount": "0",
            "igstAmount": "0",
            "totalTaxAmount": "0",
            "roundOff": "0",
            "grandTotal": "0",
            "amountInWords": "Zero Rupees Only",
            "reverseCharge": false,
            "createdAt": "2024-06-15T10:00:00Z",
            "updatedAt": "2024-06-15T10:00:00Z"
        });
        let bytes = serde_json::to_vec(&record).unwrap();
        let invoice = decode_invoice(7, &bytes).unwrap();
        assert_eq!(invoice.id, 7);
        assert_eq!(invoice.invoice_number, "2425007");
        assert_eq!(invoice.tax_rates.cgst, dec!(9));
    }

    #[test]
    fn form_era_record_normalizes() {
        let record = json!({
            "invoiceNo": "2324042",
            "invoiceDate": "2023-11-02",
            "supplyDate": "2023-11-03",
            "customerName": "Patel Traders",
            "customerAddress": "Ring Road, Surat",
            "customerGSTIN": "24ABCDE1234F1Z5",
            "state": "Gujarat",
            "stateCode": "24",
            "transportMode": "Road",
            "vehicleNumber": "GJ05AB1234",
            "placeOfSupply": "Surat",
            "reverseCharge": "No",
            "products": [
                {
                    "sno": "1",
                    "description": "Cotton fabric",
                    "hsnCode": "5208",
                    "qty": "10",
                    "rate": "100.00",
                    "amount": "1000.00",
                    "taxableValue": "1000.00"
                }
            ],
            "taxData": {
                "subTotal": "1000.00",
                "cgstRate": "2.5",
                "cgstAmount": "25.00",
                "sgstRate": "2.5",
                "sgstAmount": "25.00",
                "igstRate": "0",
                "igstAmount": "0.00",
                "totalTaxAmount": "50.00",
                "roundOff": "0.00",
                "grandTotal": "1050.00"
            },
            "grandTotal": "1050.00",
            "amountInWords": "One Thousand and Fifty Rupees Only",
            "createdAt": "2023-11-02T09:30:00.000Z"
        });
        let bytes = serde_json::to_vec(&record).unwrap();
        let invoice = decode_invoice(42, &bytes).unwrap();

        assert_eq!(invoice.id, 42);
        assert_eq!(invoice.invoice_number, "2324042");
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2023, 11, 2).unwrap());
        assert_eq!(invoice.line_items.len(), 1);
        assert_eq!(invoice.line_items[0].quantity, dec!(10));
        assert_eq!(invoice.tax_rates.cgst, dec!(2.5));
        assert_eq!(invoice.totals.sub_total, dec!(1000.00));
        assert_eq!(invoice.totals.grand_total, dec!(1050.00));
        assert!(!invoice.reverse_charge);
    }

    #[test]
    fn pdf_era_record_normalizes() {
        let record = json!({
            "invoiceNo": "117",
            "customerName": "Mehta & Sons",
            "date": "2023-02-18",
            "total": "4720.00",
            "pdfData": "data:image/png;base64,AAAA",
            "timestamp": 1676700000000i64
        });
        let bytes = serde_json::to_vec(&record).unwrap();
        let invoice = decode_invoice(3, &bytes).unwrap();

        assert_eq!(invoice.invoice_number, "117");
        assert_eq!(invoice.customer_name, "Mehta & Sons");
        assert_eq!(invoice.totals.grand_total, dec!(4720.00));
        assert_eq!(invoice.totals.sub_total, dec!(4720.00));
        assert!(invoice.line_items.is_empty());
        assert_eq!(
            invoice.created_at,
            DateTime::from_timestamp_millis(1676700000000).unwrap()
        );
    }

    #[test]
    fn garbage_fields_coerce_instead_of_failing() {
        let record = json!({
            "invoiceNo": "x",
            "date": "not-a-date",
            "total": "abc",
            "reverseCharge": 7
        });
        let bytes = serde_json::to_vec(&record).unwrap();
        let invoice = decode_invoice(1, &bytes).unwrap();
        assert_eq!(invoice.totals.grand_total, Decimal::ZERO);
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert!(!invoice.reverse_charge);
    }
}
