//! # Base Price Resolver
//!
//! Determines the per-unit price stored on the line item.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  uses_tiered_pricing?                                                   │
//! │     ├── yes ──► active tier containing quantity ──► tier_price          │
//! │     │              └── no tier matches ──────────► unit_price           │
//! │     └── no  ──► unit_price                                              │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │  variation?                                                             │
//! │     ├── percentage ──► base + base × adj / 100                          │
//! │     ├── fixed      ──► base + adj                                       │
//! │     └── none       ──► base                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The percentage is taken off the post-tier base exactly once.

use rust_decimal::Decimal;

use crate::money::Money;
use crate::types::{AdjustmentType, PricingTier, Product, Variation};

/// Finds the active tier whose `[min, max]` contains `quantity`.
///
/// Overlapping tiers (malformed data) resolve to the smallest `minQuantity`.
pub fn tier_price_for(quantity: Decimal, tiers: &[PricingTier]) -> Option<Money> {
    tiers
        .iter()
        .filter(|t| t.is_active && t.contains(quantity))
        .min_by_key(|t| t.min_quantity)
        .map(|t| t.tier_price)
}

/// Resolves the effective unit price for a quantity and variation.
pub fn resolve_unit_price(
    product: &Product,
    quantity: Decimal,
    variation: Option<&Variation>,
) -> Money {
    let base = if product.uses_tiered_pricing {
        tier_price_for(quantity, &product.pricing_tiers).unwrap_or(product.unit_price)
    } else {
        product.unit_price
    };

    apply_variation(base, variation)
}

/// Applies at most one variation adjustment. The result is never negative.
pub fn apply_variation(base: Money, variation: Option<&Variation>) -> Money {
    let adjusted = match variation {
        None => base,
        Some(v) => match v.adjustment_type {
            AdjustmentType::Percentage => base.adjust_by_percent(v.price_adjustment),
            AdjustmentType::Fixed => base + Money::new(v.price_adjustment),
        },
    };
    adjusted.non_negative()
}
