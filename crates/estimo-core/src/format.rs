//! # Display Formatter
//!
//! Renders exact money values for people. This is the only place
//! rounding happens.
//!
//! ```text
//! Money(3499.995) ──► round half away from zero ──► "$3,500.00"
//! Money(-1)       ──────────────────────────────► "-$1.00"
//! ```
//!
//! The formatter is always passed explicitly; there is no process-wide
//! currency setting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Largest supported `decimal_precision`.
pub const MAX_DECIMAL_PRECISION: u32 = 6;

/// Currency display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_precision: u32,

    /// Groups the whole part in thousands (`1,234`) when set.
    #[serde(default)]
    pub thousands_separator: Option<char>,
}

impl Default for CurrencyFormat {
    /// US dollars, two places, comma grouping.
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimal_precision: 2,
            thousands_separator: Some(','),
        }
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, decimal_precision: u32) -> Self {
        CurrencyFormat {
            symbol: symbol.into(),
            decimal_precision: decimal_precision.min(MAX_DECIMAL_PRECISION),
            thousands_separator: None,
        }
    }

    pub fn with_thousands_separator(mut self, separator: char) -> Self {
        self.thousands_separator = Some(separator);
        self
    }

    /// Formats an amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use estimo_core::{CurrencyFormat, Money};
    ///
    /// let usd = CurrencyFormat::new("$", 2);
    /// assert_eq!(usd.format(Money::from_minor(1234)), "$12.34");
    /// assert_eq!(usd.format(Money::from_major(-1)), "-$1.00");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let precision = self.decimal_precision.min(MAX_DECIMAL_PRECISION);
        let rounded = amount.rounded(precision);
        let negative = rounded < Decimal::ZERO;

        let digits = rounded.abs().to_string();
        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (digits.as_str(), None),
        };

        let whole = match self.thousands_separator {
            Some(sep) => group_thousands(whole, sep),
            None => whole.to_string(),
        };

        format!(
            "{}{}{}{}",
            if negative { "-" } else { "" },
            self.symbol,
            whole,
            frac.map(|f| format!(".{}", f)).unwrap_or_default()
        )
    }

    /// Formats a quantity for receipts: trailing zeros trimmed.
    pub fn format_quantity(quantity: Decimal) -> String {
        quantity.normalize().to_string()
    }
}

fn group_thousands(whole: &str, separator: char) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_positive() {
        let usd = CurrencyFormat::new("$", 2);
        assert_eq!(usd.format(Money::from_minor(1234)), "$12.34");
        assert_eq!(usd.format(Money::from_major(1)), "$1.00");
        assert_eq!(usd.format(Money::from_minor(1)), "$0.01");
        assert_eq!(usd.format(Money::zero()), "$0.00");
    }

    #[test]
    fn test_format_negative() {
        let usd = CurrencyFormat::new("$", 2);
        assert_eq!(usd.format(Money::from_major(-1)), "-$1.00");
        assert_eq!(usd.format(Money::from_minor(-1234)), "-$12.34");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        let usd = CurrencyFormat::new("$", 2);
        assert_eq!(usd.format(Money::new(dec!(0.125))), "$0.13");
        assert_eq!(usd.format(Money::new(dec!(-0.125))), "-$0.13");
        assert_eq!(usd.format(Money::new(dec!(41.666666))), "$41.67");
    }

    #[test]
    fn test_negative_that_rounds_to_zero_has_no_sign() {
        let usd = CurrencyFormat::new("$", 2);
        assert_eq!(usd.format(Money::new(dec!(-0.001))), "$0.00");
    }

    #[test]
    fn test_other_precisions() {
        assert_eq!(CurrencyFormat::new("¥", 0).format(Money::new(dec!(1234.5))), "¥1235");
        assert_eq!(CurrencyFormat::new("BD ", 3).format(Money::new(dec!(1.2))), "BD 1.200");
    }

    #[test]
    fn test_thousands_grouping() {
        let usd = CurrencyFormat::default();
        assert_eq!(usd.format(Money::new(dec!(1234567.891))), "$1,234,567.89");
        assert_eq!(usd.format(Money::from_major(999)), "$999.00");
        assert_eq!(usd.format(Money::from_major(1000)), "$1,000.00");
        assert_eq!(usd.format(Money::from_major(-3500)), "-$3,500.00");

        let eur = CurrencyFormat::new("€", 2).with_thousands_separator('.');
        assert_eq!(eur.format(Money::from_major(12000)), "€12.000.00");
    }

    #[test]
    fn test_saturated_amount_still_formats() {
        let usd = CurrencyFormat::default();
        assert_eq!(
            usd.format(Money::new(Decimal::MAX)),
            "$79,228,162,514,264,337,593,543,950,335"
        );
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(CurrencyFormat::format_quantity(dec!(900.000)), "900");
        assert_eq!(CurrencyFormat::format_quantity(dec!(1.50)), "1.5");
    }
}
