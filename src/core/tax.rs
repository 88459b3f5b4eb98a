//! Pure tax computation: line items + rates in, derived totals out.
//!
//! The engine never fails. Blank, unparseable, or negative inputs are
//! coerced to zero before computing — tolerance for half-filled entry
//! forms is part of the contract, not an accident.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

use super::types::{LineItem, TaxRates, Totals};
use super::words::amount_in_words;

/// Round to `dp` decimal places, half-up (commercial rounding).
fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerce a raw form field to a non-negative amount.
///
/// Blank or unparseable input and negative values all become zero.
pub fn parse_amount(raw: &str) -> Decimal {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|d| !d.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

fn clamp_non_negative(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}

/// Compute a single line's amount: quantity × rate, negatives clamped.
pub fn compute_line_amount(quantity: Decimal, rate: Decimal) -> Decimal {
    round_half_up(clamp_non_negative(quantity) * clamp_non_negative(rate), 2)
}

/// Compute all derived totals for a set of lines and tax rates.
///
/// Returns the lines with `amount`/`taxable_value` filled in, alongside
/// the document totals. Each tax component is rounded to 2 dp and the
/// total tax is the exact sum of the rounded components; the grand total
/// is rounded to the whole rupee with the signed remainder in
/// `round_off`.
pub fn compute_totals(lines: &[LineItem], rates: &TaxRates) -> (Vec<LineItem>, Totals) {
    let mut computed = Vec::with_capacity(lines.len());
    let mut sub_total = Decimal::ZERO;

    for line in lines {
        let amount = compute_line_amount(line.quantity, line.rate);
        sub_total += amount;
        computed.push(LineItem {
            amount,
            taxable_value: amount,
            ..line.clone()
        });
    }

    let hundred = Decimal::ONE_HUNDRED;
    let cgst_amount = round_half_up(sub_total * clamp_non_negative(rates.cgst) / hundred, 2);
    let sgst_amount = round_half_up(sub_total * clamp_non_negative(rates.sgst) / hundred, 2);
    let igst_amount = round_half_up(sub_total * clamp_non_negative(rates.igst) / hundred, 2);
    let total_tax_amount = cgst_amount + sgst_amount + igst_amount;

    let exact = sub_total + total_tax_amount;
    let grand_total = round_half_up(exact, 0);
    let round_off = grand_total - exact;

    let words = grand_total
        .to_u64()
        .map(amount_in_words)
        .unwrap_or(super::words::AmountInWords::Overflow)
        .to_string();

    let totals = Totals {
        sub_total,
        cgst_amount,
        sgst_amount,
        igst_amount,
        total_tax_amount,
        round_off,
        grand_total,
        amount_in_words: words,
    };

    (computed, totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(qty: Decimal, rate: Decimal) -> LineItem {
        LineItem::new("Cotton fabric", "5208", qty, rate)
    }

    #[test]
    fn single_line_nine_nine_split() {
        let lines = vec![line(dec!(10), dec!(100))];
        let rates = TaxRates::new(dec!(9), dec!(9), dec!(0));
        let (computed, totals) = compute_totals(&lines, &rates);

        assert_eq!(computed[0].amount, dec!(1000.00));
        assert_eq!(computed[0].taxable_value, dec!(1000.00));
        assert_eq!(totals.sub_total, dec!(1000.00));
        assert_eq!(totals.cgst_amount, dec!(90.00));
        assert_eq!(totals.sgst_amount, dec!(90.00));
        assert_eq!(totals.igst_amount, dec!(0.00));
        assert_eq!(totals.total_tax_amount, dec!(180.00));
        assert_eq!(totals.grand_total, dec!(1180));
        assert_eq!(totals.round_off, dec!(0.00));
        assert_eq!(
            totals.amount_in_words,
            "One Thousand One Hundred and Eighty Rupees Only"
        );
    }

    #[test]
    fn fractional_subtotal_rounds_down() {
        let lines = vec![line(dec!(1), dec!(999.50))];
        let rates = TaxRates::new(dec!(2.5), dec!(2.5), dec!(0));
        let (_, totals) = compute_totals(&lines, &rates);

        assert_eq!(totals.sub_total, dec!(999.50));
        assert_eq!(totals.cgst_amount, dec!(24.99));
        assert_eq!(totals.sgst_amount, dec!(24.99));
        assert_eq!(totals.total_tax_amount, dec!(49.98));
        assert_eq!(totals.grand_total, dec!(1049));
        // 1049 − 1049.48
        assert_eq!(totals.round_off, dec!(-0.48));
        assert_eq!(
            totals.grand_total,
            totals.sub_total + totals.total_tax_amount + totals.round_off
        );
    }

    #[test]
    fn igst_only_invoice() {
        let lines = vec![line(dec!(4), dec!(250))];
        let rates = TaxRates::new(dec!(0), dec!(0), dec!(18));
        let (_, totals) = compute_totals(&lines, &rates);

        assert_eq!(totals.sub_total, dec!(1000.00));
        assert_eq!(totals.igst_amount, dec!(180.00));
        assert_eq!(totals.cgst_amount, dec!(0.00));
        assert_eq!(totals.grand_total, dec!(1180));
    }

    #[test]
    fn empty_lines_give_zero_totals() {
        let rates = TaxRates::new(dec!(9), dec!(9), dec!(0));
        let (computed, totals) = compute_totals(&[], &rates);

        assert!(computed.is_empty());
        assert_eq!(totals.sub_total, Decimal::ZERO);
        assert_eq!(totals.grand_total, Decimal::ZERO);
        assert_eq!(totals.amount_in_words, "Zero Rupees Only");
    }

    #[test]
    fn negative_inputs_coerce_to_zero() {
        let lines = vec![line(dec!(-3), dec!(100)), line(dec!(2), dec!(50))];
        let rates = TaxRates::new(dec!(-5), dec!(9), dec!(0));
        let (computed, totals) = compute_totals(&lines, &rates);

        assert_eq!(computed[0].amount, Decimal::ZERO);
        assert_eq!(computed[1].amount, dec!(100.00));
        assert_eq!(totals.sub_total, dec!(100.00));
        assert_eq!(totals.cgst_amount, Decimal::ZERO);
        assert_eq!(totals.sgst_amount, dec!(9.00));
    }

    #[test]
    fn parse_amount_is_lenient() {
        assert_eq!(parse_amount("12.50"), dec!(12.50));
        assert_eq!(parse_amount("  42 "), dec!(42));
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("-7"), Decimal::ZERO);
    }
}
