//! # Fail-Soft Numeric Parsing
//!
//! Catalog records arrive from a hosted store and a JavaScript frontend, so
//! a numeric field may be a JSON number, a numeric string, `null`, or
//! missing entirely. Pricing must not fail on any of them.
//!
//! ```text
//!   3.5      ──► Some(3.5)
//!   "3.50"   ──► Some(3.50)
//!   "1e-3"   ──► Some(0.001)
//!   null     ──► None
//!   "abc"    ──► None      (never an error)
//!   missing  ──► None      (via #[serde(default)])
//! ```
//!
//! Use with `#[serde(default, deserialize_with = "...")]`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::money::Money;

/// Parses a JSON value into a decimal, returning `None` for anything that
/// is not a finite number or a numeric string.
pub fn parse_lenient(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_text(&n.to_string()),
        Value::String(s) => parse_text(s.trim()),
        _ => None,
    }
}

fn parse_text(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Optional decimal; unparsable input becomes `None`.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_lenient))
}

/// Decimal that defaults to zero when missing or unparsable.
pub fn lenient_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_decimal(deserializer)?.unwrap_or(Decimal::ZERO))
}

/// Money that defaults to zero when missing or unparsable.
pub fn lenient_money<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Money::new(lenient_decimal_or_zero(deserializer)?))
}

/// Divides without panicking.
///
/// A zero divisor yields zero; an overflowing quotient saturates at
/// `Decimal::MAX` or `Decimal::MIN` according to its sign.
pub fn saturating_div(value: Decimal, divisor: Decimal) -> Decimal {
    if divisor.is_zero() {
        return Decimal::ZERO;
    }
    value.checked_div(divisor).unwrap_or_else(|| {
        if value.is_sign_negative() == divisor.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// Clamps a value at zero from below.
#[inline]
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_lenient_accepts_numbers_and_strings() {
        assert_eq!(parse_lenient(&json!(3.5)), Some(dec!(3.5)));
        assert_eq!(parse_lenient(&json!(12)), Some(dec!(12)));
        assert_eq!(parse_lenient(&json!("0.25")), Some(dec!(0.25)));
        assert_eq!(parse_lenient(&json!(" 7 ")), Some(dec!(7)));
        assert_eq!(parse_lenient(&json!("1e-3")), Some(dec!(0.001)));
    }

    #[test]
    fn test_parse_lenient_rejects_garbage_softly() {
        assert_eq!(parse_lenient(&json!(null)), None);
        assert_eq!(parse_lenient(&json!("abc")), None);
        assert_eq!(parse_lenient(&json!("")), None);
        assert_eq!(parse_lenient(&json!(true)), None);
        assert_eq!(parse_lenient(&json!({"value": 1})), None);
    }

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "lenient_decimal_or_zero")]
        price: Decimal,
        #[serde(default, deserialize_with = "lenient_decimal")]
        depth: Option<Decimal>,
    }

    #[test]
    fn test_missing_fields_default() {
        let fields: Fields = serde_json::from_value(json!({})).unwrap();
        assert_eq!(fields.price, Decimal::ZERO);
        assert_eq!(fields.depth, None);

        let fields: Fields =
            serde_json::from_value(json!({"price": "n/a", "depth": "4"})).unwrap();
        assert_eq!(fields.price, Decimal::ZERO);
        assert_eq!(fields.depth, Some(dec!(4)));
    }

    #[test]
    fn test_saturating_div() {
        assert_eq!(saturating_div(dec!(9), dec!(4)), dec!(2.25));
        assert_eq!(saturating_div(dec!(9), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(saturating_div(Decimal::MAX, dec!(0.001)), Decimal::MAX);
        assert_eq!(saturating_div(Decimal::MAX, dec!(-0.001)), Decimal::MIN);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(dec!(-2)), Decimal::ZERO);
        assert_eq!(non_negative(dec!(2)), dec!(2));
    }
}
