//! # Unit Resolver
//!
//! Derives the effective quantity from a raw measurement.
//!
//! ```text
//!   value ──┬── depth? ──► value × depth / 324   (cu yd)
//!           └── none  ──► value
//!                 │
//!                 ▼
//!   increment lot? ──► ceil(q / size) lots  (or half lots)  × size
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::{non_negative, saturating_div};
use crate::types::{IncrementsApplied, Measurement, Product};
use crate::CUBIC_YARD_DIVISOR;

/// Precision kept before rounding up to lots; absorbs division residue
/// such as `0.99999...` or `1.00000...1`.
const LOT_RATIO_PRECISION: u32 = 12;

/// Output of [`resolve_quantity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuantity {
    /// Quantity every downstream stage prices against.
    pub quantity: Decimal,

    /// Present when lot rounding was applied.
    pub increments_applied: Option<IncrementsApplied>,
}

/// Resolves a measurement into the quantity that is actually sold.
///
/// Non-positive values (and non-positive depths) resolve to zero, which is
/// a valid, priceable state.
///
/// ```rust
/// use estimo_core::pricing::resolve_quantity;
/// use estimo_core::{IncrementLot, Measurement, Money, Product};
/// use rust_decimal::Decimal;
///
/// let mut sod = Product::new("sod", "Sod", Money::from_major(1));
/// sod.increment_lot = Some(IncrementLot {
///     size: Decimal::from(450),
///     label: "pallet".into(),
///     allow_partial: false,
/// });
///
/// let resolved = resolve_quantity(&Measurement::area(Decimal::from(500)), &sod);
/// assert_eq!(resolved.quantity, Decimal::from(900));
/// ```
pub fn resolve_quantity(measurement: &Measurement, product: &Product) -> ResolvedQuantity {
    let measured = measured_quantity(measurement);

    let lot = match product.increment_lot.as_ref() {
        Some(lot) if lot.size > Decimal::ZERO && measured > Decimal::ZERO => lot,
        _ => {
            return ResolvedQuantity {
                quantity: measured,
                increments_applied: None,
            }
        }
    };

    let ratio = saturating_div(measured, lot.size).round_dp(LOT_RATIO_PRECISION);
    let lots = if lot.allow_partial {
        // Round up to the next half lot.
        ratio.saturating_mul(Decimal::TWO).ceil() / Decimal::TWO
    } else {
        ratio.ceil()
    };

    ResolvedQuantity {
        quantity: lots.saturating_mul(lot.size),
        increments_applied: Some(IncrementsApplied {
            units_needed: lots,
            increment_size: lot.size,
            increment_label: lot.label.clone(),
        }),
    }
}

/// Raw quantity before lot rounding.
fn measured_quantity(measurement: &Measurement) -> Decimal {
    if measurement.value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    match measurement.depth {
        Some(depth) => non_negative(
            measurement.value.saturating_mul(depth) / Decimal::from(CUBIC_YARD_DIVISOR),
        ),
        None => measurement.value,
    }
}
