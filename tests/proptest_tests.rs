//! Property-based tests for the tax engine, numbering, and words.

#![cfg(feature = "core")]

use bijak::core::*;
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Strategies ──────────────────────────────────────────────────────────────

/// A quantity with up to 2 dp (0.01 to 999.99).
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1u64..100_000u64).prop_map(|hundredths| Decimal::new(hundredths as i64, 2))
}

/// A unit rate with up to 2 dp (0.01 to 99999.99).
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1u64..10_000_000u64).prop_map(|paise| Decimal::new(paise as i64, 2))
}

/// A GST percentage (0.00 to 28.00).
fn arb_percent() -> impl Strategy<Value = Decimal> {
    (0u64..=2_800u64).prop_map(|bp| Decimal::new(bp as i64, 2))
}

fn arb_line() -> impl Strategy<Value = LineItem> {
    (arb_quantity(), arb_rate())
        .prop_map(|(qty, rate)| LineItem::new("Cotton fabric", "5208", qty, rate))
}

fn arb_rates() -> impl Strategy<Value = TaxRates> {
    (arb_percent(), arb_percent(), arb_percent())
        .prop_map(|(cgst, sgst, igst)| TaxRates::new(cgst, sgst, igst))
}

proptest! {
    #[test]
    fn line_amounts_are_quantity_times_rate(lines in prop::collection::vec(arb_line(), 0..8), rates in arb_rates()) {
        let (computed, _) = compute_totals(&lines, &rates);
        for (raw, line) in lines.iter().zip(&computed) {
            prop_assert_eq!(line.amount, compute_line_amount(raw.quantity, raw.rate));
            prop_assert_eq!(line.taxable_value, line.amount);
            prop_assert!(!line.amount.is_sign_negative());
        }
    }

    #[test]
    fn subtotal_is_the_sum_of_line_amounts(lines in prop::collection::vec(arb_line(), 0..8), rates in arb_rates()) {
        let (computed, totals) = compute_totals(&lines, &rates);
        let sum: Decimal = computed.iter().map(|l| l.amount).sum();
        prop_assert_eq!(totals.sub_total, sum);
    }

    #[test]
    fn grand_total_is_whole_rupees_and_round_off_balances(lines in prop::collection::vec(arb_line(), 0..8), rates in arb_rates()) {
        let (_, totals) = compute_totals(&lines, &rates);
        prop_assert_eq!(totals.grand_total.fract(), Decimal::ZERO);
        prop_assert_eq!(
            totals.grand_total,
            totals.sub_total + totals.total_tax_amount + totals.round_off
        );
        // Rounding to the nearest rupee never moves more than half of one.
        prop_assert!(totals.round_off.abs() <= Decimal::new(50, 2));
    }

    #[test]
    fn total_tax_is_the_sum_of_its_components(lines in prop::collection::vec(arb_line(), 1..8), rates in arb_rates()) {
        let (_, totals) = compute_totals(&lines, &rates);
        prop_assert_eq!(
            totals.total_tax_amount,
            totals.cgst_amount + totals.sgst_amount + totals.igst_amount
        );
    }

    #[test]
    fn words_are_defined_across_the_supported_range(n in 0u64..=999_999_999) {
        let rendered = amount_in_words(n);
        prop_assert_ne!(&rendered, &AmountInWords::Overflow);
        let text = rendered.to_string();
        prop_assert!(text.ends_with("Rupees Only"));
        prop_assert!(!text.contains("  "));
    }

    #[test]
    fn numbering_round_trips_through_parse(seq in 1u32..100_000, month in 1u32..=12, year in 2000i32..2099) {
        let fy = FinancialYear::from_date(date(year, month, 1));
        let number = format_invoice_number(fy, seq);
        let (prefix, parsed) = parse_invoice_number(&number).unwrap();
        prop_assert_eq!(prefix, fy.prefix());
        prop_assert_eq!(parsed, seq);
    }

    #[test]
    fn sequences_strictly_increase_within_a_year(seq in 1u32..1_000_000) {
        let fy = FinancialYear::from_date(date(2024, 6, 1));
        let current = format_invoice_number(fy, seq);
        let next = next_invoice_number(Some(&current), fy);
        let (_, next_seq) = parse_invoice_number(&next).unwrap();
        prop_assert_eq!(next_seq, seq + 1);
    }

    #[test]
    fn parse_amount_never_returns_negative(raw in "\\PC*") {
        prop_assert!(!parse_amount(&raw).is_sign_negative());
    }
}
