//! Amount-in-words rendering on the Indian numbering scale.
//!
//! Groups are crore / lakh / thousand / hundred, with a two-digit
//! remainder: 12_34_56_789 reads "Twelve Crore Thirty Four Lakh Fifty
//! Six Thousand Seven Hundred and Eighty Nine Rupees Only".

use std::fmt;

/// Result of rendering an amount as words.
///
/// Amounts above nine digits are a defined [`Overflow`](Self::Overflow)
/// sentinel, never a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountInWords {
    Words(String),
    Overflow,
}

impl fmt::Display for AmountInWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Words(s) => f.write_str(s),
            Self::Overflow => f.write_str("overflow"),
        }
    }
}

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Render a value below 100 ("Five", "Nineteen", "Sixty Five").
fn two_digits(n: u64, out: &mut String) {
    debug_assert!(n < 100);
    if n < 20 {
        out.push_str(ONES[n as usize]);
    } else {
        out.push_str(TENS[(n / 10) as usize]);
        if n % 10 != 0 {
            out.push(' ');
            out.push_str(ONES[(n % 10) as usize]);
        }
    }
}

/// Render a whole rupee amount as words.
///
/// Defined for 0 ≤ n ≤ 999_999_999; larger values yield
/// [`AmountInWords::Overflow`]. Zero renders "Zero Rupees Only".
pub fn amount_in_words(n: u64) -> AmountInWords {
    if n > 999_999_999 {
        return AmountInWords::Overflow;
    }
    if n == 0 {
        return AmountInWords::Words("Zero Rupees Only".to_string());
    }

    // Digit groups: crore (2), lakh (2), thousand (2), hundred (1),
    // two-digit remainder.
    let crore = n / 10_000_000;
    let lakh = (n / 100_000) % 100;
    let thousand = (n / 1_000) % 100;
    let hundred = (n / 100) % 10;
    let rest = n % 100;

    let mut out = String::new();
    for (value, scale) in [
        (crore, "Crore"),
        (lakh, "Lakh"),
        (thousand, "Thousand"),
        (hundred, "Hundred"),
    ] {
        if value != 0 {
            two_digits(value, &mut out);
            out.push(' ');
            out.push_str(scale);
            out.push(' ');
        }
    }

    if rest != 0 {
        if !out.is_empty() {
            out.push_str("and ");
        }
        two_digits(rest, &mut out);
        out.push(' ');
    }

    out.push_str("Rupees Only");
    AmountInWords::Words(out)
}
