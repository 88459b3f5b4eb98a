use super::error::ValidationError;
use super::types::{Customer, InvoiceDraft};

/// Exactly 10 ASCII digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Validate an invoice draft before numbering and persistence.
/// Returns all errors found (not just the first).
///
/// Deliberately lenient beyond the two hard rules: GSTIN format, line
/// contents, and rate combinations are the caller's responsibility.
pub fn validate_draft(draft: &InvoiceDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if draft.customer_name.trim().is_empty() {
        errors.push(ValidationError::new(
            "customer_name",
            "customer name must not be empty",
        ));
    }

    if !draft.customer_phone.is_empty() && !is_valid_phone(&draft.customer_phone) {
        errors.push(ValidationError::new(
            "customer_phone",
            "phone must be exactly 10 digits",
        ));
    }

    errors
}

/// Validate a customer record before upsert. Phone is the primary key
/// and is always required here, unlike on invoices.
pub fn validate_customer(customer: &Customer) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_valid_phone(&customer.phone) {
        errors.push(ValidationError::new(
            "phone",
            "phone must be exactly 10 digits",
        ));
    }

    if customer.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "customer name must not be empty"));
    }

    errors
}
