//! # Quote Aggregator
//!
//! Sums line totals and applies tax once, at quote level.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, TaxRate};

/// Quote-level totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub line_count: usize,
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
}

impl QuoteTotals {
    /// Totals of a quote with no lines.
    pub fn empty(tax_rate: TaxRate) -> Self {
        QuoteTotals {
            line_count: 0,
            subtotal: Money::zero(),
            tax_rate,
            tax: Money::zero(),
            total: Money::zero(),
        }
    }
}

/// Computes subtotal, tax and total from line totals.
///
/// ```rust
/// use estimo_core::pricing::compute_quote_totals;
/// use estimo_core::{Money, TaxRate};
///
/// let totals = compute_quote_totals(
///     [Money::from_major(600), Money::from_major(400)],
///     TaxRate::from_bps(825),
/// );
/// assert_eq!(totals.subtotal, Money::from_major(1000));
/// assert_eq!(totals.tax, Money::from_minor(8250));
/// assert_eq!(totals.total, Money::from_minor(108250));
/// ```
pub fn compute_quote_totals<I>(line_totals: I, tax_rate: TaxRate) -> QuoteTotals
where
    I: IntoIterator<Item = Money>,
{
    let mut line_count = 0;
    let mut subtotal = Money::zero();
    for total in line_totals {
        line_count += 1;
        subtotal += total;
    }

    let tax = subtotal.calculate_tax(tax_rate);

    QuoteTotals {
        line_count,
        subtotal,
        tax_rate,
        tax,
        total: subtotal + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_quote() {
        let totals = compute_quote_totals(Vec::new(), TaxRate::from_bps(825));
        assert_eq!(totals, QuoteTotals::empty(TaxRate::from_bps(825)));
    }

    #[test]
    fn test_tax_applies_to_subtotal_once() {
        // three lines of $0.10 at 5%: per-line rounding would give $0.00 tax
        let lines = vec![Money::from_minor(10); 3];
        let totals = compute_quote_totals(lines, TaxRate::from_percent(dec!(5)));

        assert_eq!(totals.line_count, 3);
        assert_eq!(totals.subtotal, Money::from_minor(30));
        assert_eq!(totals.tax.amount(), dec!(0.015));
        assert_eq!(totals.total.amount(), dec!(0.315));
    }

    #[test]
    fn test_zero_tax() {
        let totals = compute_quote_totals([Money::from_major(50)], TaxRate::zero());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total, Money::from_major(50));
    }
}
