use chrono::{Datelike, NaiveDate};

use super::error::BijakError;

/// Width of the zero-padded sequence part of an invoice number.
const SEQUENCE_WIDTH: usize = 3;

/// An April–March financial year, the scope for invoice sequencing.
///
/// Invoice numbers carry a 4-digit prefix built from the two-digit start
/// and end years: FY 2024-25 → `"2425"`, so the first invoice of that
/// year is `"2425001"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialYear {
    start_year: i32,
}

impl FinancialYear {
    /// The financial year containing `date` (year starts April 1).
    pub fn from_date(date: NaiveDate) -> Self {
        let start_year = if date.month() >= 4 {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year }
    }

    /// Calendar year the financial year starts in.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// 4-digit invoice number prefix, e.g. "2425".
    pub fn prefix(&self) -> String {
        format!(
            "{:02}{:02}",
            self.start_year.rem_euclid(100),
            (self.start_year + 1).rem_euclid(100)
        )
    }

    /// Display label, e.g. "2024-2025".
    pub fn label(&self) -> String {
        format!("{}-{}", self.start_year, self.start_year + 1)
    }
}

/// Format an invoice number from its prefix and sequence.
pub fn format_invoice_number(fy: FinancialYear, sequence: u32) -> String {
    format!("{}{:0width$}", fy.prefix(), sequence, width = SEQUENCE_WIDTH)
}

/// Split a stored invoice number into its 4-digit prefix and sequence.
pub fn parse_invoice_number(number: &str) -> Result<(&str, u32), BijakError> {
    if number.len() < 5 {
        return Err(BijakError::Numbering(format!(
            "invoice number '{number}' too short — expected 4-digit prefix + sequence"
        )));
    }
    let (prefix, seq) = number.split_at(4);
    let sequence: u32 = seq.parse().map_err(|_| {
        BijakError::Numbering(format!("invoice number '{number}' has a non-numeric sequence"))
    })?;
    Ok((prefix, sequence))
}

/// The next invoice number given the last-assigned one.
///
/// Continues the sequence while the stored prefix matches the current
/// financial year, otherwise resets to 1. A missing or unparseable last
/// number also starts at 1 — the counter is self-healing across
/// first-run and rollover alike.
pub fn next_invoice_number(last: Option<&str>, fy: FinancialYear) -> String {
    let next_sequence = last
        .and_then(|value| parse_invoice_number(value).ok())
        .filter(|(prefix, _)| *prefix == fy.prefix())
        .map(|(_, sequence)| sequence + 1)
        .unwrap_or(1);
    format_invoice_number(fy, next_sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn financial_year_boundaries() {
        assert_eq!(FinancialYear::from_date(date(2024, 4, 1)).prefix(), "2425");
        assert_eq!(FinancialYear::from_date(date(2025, 3, 31)).prefix(), "2425");
        assert_eq!(FinancialYear::from_date(date(2025, 4, 1)).prefix(), "2526");
        assert_eq!(FinancialYear::from_date(date(2024, 12, 15)).label(), "2024-2025");
    }

    #[test]
    fn first_number_of_a_year() {
        let fy = FinancialYear::from_date(date(2024, 6, 1));
        assert_eq!(next_invoice_number(None, fy), "2425001");
    }

    #[test]
    fn sequence_continues_within_year() {
        let fy = FinancialYear::from_date(date(2024, 6, 1));
        assert_eq!(next_invoice_number(Some("2425001"), fy), "2425002");
        assert_eq!(next_invoice_number(Some("2425099"), fy), "2425100");
    }

    #[test]
    fn sequence_resets_at_rollover() {
        // Last invoice in March, next in April.
        let fy = FinancialYear::from_date(date(2025, 4, 2));
        assert_eq!(next_invoice_number(Some("2425117"), fy), "2526001");
    }

    #[test]
    fn padding_stops_at_three_digits() {
        let fy = FinancialYear::from_date(date(2024, 6, 1));
        assert_eq!(next_invoice_number(Some("2425999"), fy), "24251000");
    }

    #[test]
    fn garbage_last_value_starts_over() {
        let fy = FinancialYear::from_date(date(2024, 6, 1));
        assert_eq!(next_invoice_number(Some("24"), fy), "2425001");
        assert_eq!(next_invoice_number(Some("2425abc"), fy), "2425001");
    }

    #[test]
    fn parse_round_trip() {
        let fy = FinancialYear::from_date(date(2024, 6, 1));
        let number = format_invoice_number(fy, 42);
        assert_eq!(parse_invoice_number(&number).unwrap(), ("2425", 42));
    }
}
