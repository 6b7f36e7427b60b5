//! # Line Aggregator
//!
//! Combines the resolved quantity, unit price and add-on charges into the
//! line total.
//!
//! ```text
//! basePrice   = unitPrice × quantity
//! addonsTotal = Σ selected add-on charges
//! lineTotal   = basePrice + addonsTotal
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::addons::{evaluate_selected, AddonCharge, VariationContext};
use super::base_price::resolve_unit_price;
use super::units::resolve_quantity;
use crate::money::Money;
use crate::types::{Addon, IncrementsApplied, Measurement, Product, Variation};

/// The full pricing breakdown of one line.
///
/// Exact: nothing here is rounded. Use [`crate::format::CurrencyFormat`]
/// to display it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LinePricing {
    /// Quantity after depth conversion and lot rounding.
    #[ts(type = "string")]
    pub quantity: Decimal,

    /// Per-unit price after tier lookup and variation adjustment.
    pub unit_price: Money,

    pub base_price: Money,
    pub addons_total: Money,
    pub line_total: Money,

    pub increments_applied: Option<IncrementsApplied>,

    /// One entry per selected add-on, in catalog order.
    pub addon_charges: Vec<AddonCharge>,
}

/// Prices a single line.
///
/// `addons` is the line's add-on list with selection quantities filled in;
/// entries with `quantity <= 0` are ignored. The variation, if any, is
/// expected to belong to `product` (see [`crate::validation`]).
///
/// ## User Workflow
/// ```text
/// Contractor draws 100 ft of fence, picks "6 ft" and "Stain"
///      │
///      ▼
/// compute_line_total ← THIS FUNCTION
///      │
///      ▼
/// LinePricing { unit_price: $32, base: $3,200, addons: $300, total: $3,500 }
/// ```
pub fn compute_line_total(
    product: &Product,
    measurement: &Measurement,
    variation: Option<&Variation>,
    addons: &[Addon],
) -> LinePricing {
    let resolved = resolve_quantity(measurement, product);
    let quantity = resolved.quantity;

    let unit_price = resolve_unit_price(product, quantity, variation);
    let base_price = unit_price * quantity;

    let context = VariationContext::for_line(product, variation);
    let addon_charges = evaluate_selected(addons, quantity, measurement, context.as_ref());
    let addons_total: Money = addon_charges.iter().map(|c| c.amount).sum();

    LinePricing {
        quantity,
        unit_price,
        base_price,
        addons_total,
        line_total: base_price + addons_total,
        increments_applied: resolved.increments_applied,
        addon_charges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ChargeBasis;
    use crate::types::{CalculationType, IncrementLot, PricingTier};
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_line() {
        let product = Product::new("sod", "Sod", Money::from_major(3));
        let line = compute_line_total(&product, &Measurement::area(dec!(200)), None, &[]);

        assert_eq!(line.quantity, dec!(200));
        assert_eq!(line.unit_price, Money::from_major(3));
        assert_eq!(line.base_price, Money::from_major(600));
        assert_eq!(line.addons_total, Money::zero());
        assert_eq!(line.line_total, Money::from_major(600));
        assert!(line.addon_charges.is_empty());
    }

    #[test]
    fn test_line_total_is_base_plus_addons() {
        let product = Product::new("patio", "Patio", Money::from_minor(1250));
        let addons = vec![
            Addon::new("haul", CalculationType::Total, Money::from_major(75)).with_quantity(dec!(1)),
            Addon::new("seal", CalculationType::PerUnit, Money::from_minor(40))
                .with_quantity(dec!(2)),
            Addon::new("edging", CalculationType::PerUnit, Money::from_major(9)),
        ];

        let line = compute_line_total(&product, &Measurement::area(dec!(100)), None, &addons);
        assert_eq!(line.base_price, Money::from_major(1250));
        // 75 + 0.40 × 100 × 2
        assert_eq!(line.addons_total, Money::from_major(155));
        assert_eq!(line.line_total, line.base_price + line.addons_total);
        assert_eq!(line.addon_charges.len(), 2);
    }

    #[test]
    fn test_fence_with_height_derived_stain() {
        let mut product = Product::new("fence", "Privacy Fence", Money::from_major(28));
        let six_ft = Variation::fixed("6ft", dec!(4)).with_height(dec!(6), "ft");
        product.variations.push(six_ft.clone());
        let stain = Addon::new("stain", CalculationType::AreaCalculation, Money::from_minor(50))
            .with_quantity(dec!(1));

        let line = compute_line_total(
            &product,
            &Measurement::linear(dec!(100)),
            Some(&six_ft),
            &[stain],
        );

        assert_eq!(line.unit_price, Money::from_major(32));
        assert_eq!(line.base_price, Money::from_major(3200));
        assert_eq!(line.addons_total, Money::from_major(300));
        assert_eq!(line.line_total, Money::from_major(3500));
        assert_eq!(
            line.addon_charges[0].basis,
            ChargeBasis::DerivedArea { square_feet: dec!(600) }
        );
    }

    #[test]
    fn test_pallet_rounding_feeds_price_and_addons() {
        let mut product = Product::new("sod", "Sod", Money::from_minor(80));
        product.increment_lot = Some(IncrementLot {
            size: dec!(450),
            label: "pallet".to_string(),
            allow_partial: false,
        });
        let delivery = Addon::new("install", CalculationType::PerUnit, Money::from_minor(20))
            .with_quantity(dec!(1));

        let line = compute_line_total(&product, &Measurement::area(dec!(500)), None, &[delivery]);
        assert_eq!(line.quantity, dec!(900));
        assert_eq!(line.base_price, Money::from_major(720));
        assert_eq!(line.addons_total, Money::from_major(180));
        assert_eq!(line.increments_applied.unwrap().units_needed, dec!(2));
    }

    #[test]
    fn test_tier_lookup_uses_resolved_quantity() {
        let mut product = Product::new("pavers", "Pavers", Money::from_major(5));
        product.uses_tiered_pricing = true;
        product.pricing_tiers = vec![
            PricingTier::new(dec!(1), Some(dec!(10)), Money::from_major(5)),
            PricingTier::new(dec!(11), None, Money::from_major(4)),
        ];
        product.increment_lot = Some(IncrementLot {
            size: dec!(6),
            label: "bundle".to_string(),
            allow_partial: false,
        });

        // 7 measured rounds up to 12, which lands in the second tier
        let line = compute_line_total(&product, &Measurement::point(dec!(7)), None, &[]);
        assert_eq!(line.quantity, dec!(12));
        assert_eq!(line.unit_price, Money::from_major(4));
        assert_eq!(line.line_total, Money::from_major(48));
    }

    #[test]
    fn test_zero_measurement_prices_to_zero() {
        let product = Product::new("sod", "Sod", Money::from_major(3));
        let haul = Addon::new("haul", CalculationType::Total, Money::from_major(75))
            .with_quantity(dec!(1));
        let seal = Addon::new("seal", CalculationType::PerUnit, Money::from_minor(40))
            .with_quantity(dec!(2));

        let line = compute_line_total(&product, &Measurement::area(dec!(0)), None, &[haul, seal]);
        assert_eq!(line.quantity, Decimal::ZERO);
        assert_eq!(line.base_price, Money::zero());
        assert_eq!(line.addon_charges[1].basis, ChargeBasis::PerUnit { quantity: dec!(0) });
        assert_eq!(line.addon_charges[1].amount, Money::zero());
        // flat add-ons still apply to an empty line
        assert_eq!(line.line_total, Money::from_major(75));
    }

    #[test]
    fn test_pricing_is_deterministic() {
        let mut product = Product::new("mulch", "Mulch", Money::from_major(45));
        product.variations.push(Variation::percentage("dyed", dec!(15)));
        let m = Measurement::area(dec!(100)).with_depth(dec!(3));
        let addons =
            vec![Addon::new("spread", CalculationType::PerUnit, Money::from_major(20)).with_quantity(dec!(1))];

        let first = compute_line_total(&product, &m, product.variations.first(), &addons);
        let second = compute_line_total(&product, &m, product.variations.first(), &addons);
        assert_eq!(first, second);
    }
    #[test]
    fn test_area_derived_addon_at_two_dollars() {
        let mut product = Product::new("fence", "Privacy Fence", Money::from_major(28));
        let six_ft = Variation::fixed("6ft", dec!(0)).with_height(dec!(6), "ft");
        product.variations.push(six_ft.clone());
        let paint = Addon::new("paint", CalculationType::AreaCalculation, Money::from_major(2))
            .with_quantity(dec!(1));

        let line = compute_line_total(
            &product,
            &Measurement::linear(dec!(100)),
            Some(&six_ft),
            &[paint],
        );
        assert_eq!(line.addons_total, Money::from_major(1200));
    }

    #[test]
    fn test_end_to_end_line() {
        let mut product = Product::new("pavers", "Pavers", Money::from_major(3));
        let premium = Variation::fixed("premium", dec!(0.50));
        product.variations.push(premium.clone());
        let addons = vec![
            Addon::new("base", CalculationType::PerUnit, Money::from_minor(25)).with_quantity(dec!(1)),
            Addon::new("haul", CalculationType::Total, Money::from_major(20)).with_quantity(dec!(1)),
        ];

        let line = compute_line_total(
            &product,
            &Measurement::area(dec!(200)),
            Some(&premium),
            &addons,
        );
        assert_eq!(line.unit_price, Money::from_minor(350));
        assert_eq!(line.base_price, Money::from_major(700));
        assert_eq!(line.addons_total, Money::from_major(70));
        assert_eq!(line.line_total, Money::from_major(770));
    }

    #[test]
    fn test_overflowing_input_saturates_instead_of_panicking() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": "pavers",
            "unitPrice": "1000000",
            "addons": [
                { "id": "base", "calculationType": "per_unit", "priceValue": "1000000", "quantity": 1 }
            ]
        }))
        .unwrap();
        let measurement: Measurement =
            serde_json::from_value(serde_json::json!({ "type": "area", "value": "1e25" })).unwrap();

        let line = compute_line_total(&product, &measurement, None, &product.addons);
        assert_eq!(line.base_price, Money::new(Decimal::MAX));
        assert_eq!(line.addons_total, Money::new(Decimal::MAX));
        assert_eq!(line.line_total, Money::new(Decimal::MAX));

        let totals = crate::pricing::compute_quote_totals(
            [line.line_total, line.line_total],
            crate::money::TaxRate::from_bps(1000),
        );
        assert_eq!(totals.total, Money::new(Decimal::MAX));
    }

    #[test]
    fn test_volume_line_stays_exact_until_display() {
        let product = Product::new("mulch", "Mulch", Money::from_major(45));
        let line = compute_line_total(
            &product,
            &Measurement::area(dec!(100)).with_depth(dec!(3)),
            None,
            &[],
        );

        assert_eq!(line.quantity.round_dp(4), dec!(0.9259));
        assert_eq!(line.line_total.rounded(2), dec!(41.67));
        assert_ne!(line.line_total.amount(), dec!(41.67));
    }
}
