//! # Quotes
//!
//! A quote groups priced line items under one tax rate and a lifecycle
//! status.
//!
//! ## Status Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   draft ──────► submitted ──────► accepted                              │
//! │     ▲               │                                                   │
//! │     │               └───────────► declined                              │
//! │     └───────────────────────────────┘  (revise)                         │
//! │                                                                         │
//! │   Lines can only be added or removed while the quote is a draft.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::line_item::QuoteLineItem;
use crate::money::TaxRate;
use crate::pricing::{compute_quote_totals, QuoteTotals};
use crate::MAX_QUOTE_LINES;

/// Quote lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Submitted,
    Accepted,
    Declined,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Draft,
        QuoteStatus::Submitted,
        QuoteStatus::Accepted,
        QuoteStatus::Declined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Submitted => "submitted",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Declined => "declined",
        }
    }

    /// Whether a quote may move from `self` to `next`.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted) | (Submitted, Accepted) | (Submitted, Declined) | (Declined, Draft)
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: QuoteStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

/// A customer quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Quote ID (UUID)
    pub id: String,

    pub customer_name: String,

    /// Applied once to the subtotal.
    pub tax_rate: TaxRate,

    pub status: QuoteStatus,

    pub lines: Vec<QuoteLineItem>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Creates an empty draft quote.
    pub fn new(customer_name: impl Into<String>, tax_rate: TaxRate) -> Self {
        let now = Utc::now();
        Quote {
            id: Uuid::new_v4().to_string(),
            customer_name: customer_name.into(),
            tax_rate,
            status: QuoteStatus::Draft,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a priced line.
    ///
    /// ## Returns
    /// - `Err(QuoteTooLarge)` past [`MAX_QUOTE_LINES`]
    pub fn add_line(&mut self, line: QuoteLineItem) -> CoreResult<()> {
        if self.lines.len() >= MAX_QUOTE_LINES {
            return Err(CoreError::QuoteTooLarge {
                max: MAX_QUOTE_LINES,
            });
        }
        self.lines.push(line);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Removes a line by id and returns it.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<QuoteLineItem> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        self.updated_at = Utc::now();
        Ok(self.lines.remove(index))
    }

    pub fn line(&self, line_id: &str) -> Option<&QuoteLineItem> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Subtotal, tax and total over the current lines.
    pub fn totals(&self) -> QuoteTotals {
        compute_quote_totals(self.lines.iter().map(|l| l.line_total), self.tax_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Measurement, Product};
    use rust_decimal_macros::dec;

    fn line(price: i64, value: rust_decimal::Decimal) -> QuoteLineItem {
        let product = Product::new("p", "Product", Money::from_major(price));
        QuoteLineItem::build(&product, Measurement::area(value), None, &[]).unwrap()
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("Accepted".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert_eq!(QuoteStatus::Submitted.to_string(), "submitted");
        assert!("paid".parse::<QuoteStatus>().is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert!(QuoteStatus::Draft.can_transition_to(QuoteStatus::Submitted));
        assert!(QuoteStatus::Submitted.can_transition_to(QuoteStatus::Accepted));
        assert!(QuoteStatus::Declined.can_transition_to(QuoteStatus::Draft));
        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Accepted));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Draft));
    }

    #[test]
    fn test_totals_follow_lines() {
        let mut quote = Quote::new("Jordan Smith", TaxRate::from_bps(825));
        quote.add_line(line(3, dec!(200))).unwrap();
        let second = line(4, dec!(100));
        let second_id = second.id.clone();
        quote.add_line(second).unwrap();

        let totals = quote.totals();
        assert_eq!(totals.subtotal, Money::from_major(1000));
        assert_eq!(totals.tax, Money::from_minor(8250));
        assert_eq!(totals.total, Money::from_minor(108250));

        quote.remove_line(&second_id).unwrap();
        assert_eq!(quote.totals().subtotal, Money::from_major(600));
        assert!(matches!(
            quote.remove_line(&second_id),
            Err(CoreError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_line_limit() {
        let mut quote = Quote::new("Bulk", TaxRate::zero());
        let template = line(1, dec!(1));
        for _ in 0..MAX_QUOTE_LINES {
            quote.add_line(template.clone()).unwrap();
        }
        assert!(matches!(
            quote.add_line(template),
            Err(CoreError::QuoteTooLarge { .. })
        ));
    }
}
