//! # Add-on Evaluator
//!
//! Computes the charge for each selected add-on.
//!
//! ## Calculation Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total            price × multiplier                                    │
//! │                                                                         │
//! │  per_unit         price × line quantity × multiplier                    │
//! │                                                                         │
//! │  area_calculation                                                       │
//! │     linear measurement AND height AND affects_area                      │
//! │        ├── yes ──► price × (length × height ft) × multiplier            │
//! │        └── no  ──► price × line quantity × multiplier   (fallback)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fallback is silent in the total but recorded in [`ChargeBasis`] so
//! receipts and logs can show which rule priced the add-on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::numeric::non_negative;
use crate::types::{Addon, CalculationType, Measurement, MeasurementKind, Product, Variation};

// =============================================================================
// Variation Context
// =============================================================================

/// Height information available to area-derived add-ons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariationContext {
    /// Height in feet.
    #[ts(type = "string | null")]
    pub height: Option<Decimal>,

    /// Unit label the height was configured in.
    pub unit: String,

    pub affects_area: bool,
}

impl VariationContext {
    /// Builds the context for a line.
    ///
    /// The selected variation's height wins. The product's `heightConfig`
    /// fills in when the variation affects area but carries no height, or
    /// when no variation is selected and the config opts in.
    pub fn for_line(product: &Product, variation: Option<&Variation>) -> Option<Self> {
        let product_height = product
            .height_config
            .as_ref()
            .filter(|c| c.use_height_in_area_calc && c.base_height > Decimal::ZERO);

        match variation {
            Some(v) => {
                let (height, unit) = match (v.height_feet(), product_height) {
                    (Some(h), _) => (Some(h), v.unit_of_measurement.clone().unwrap_or_default()),
                    (None, Some(cfg)) if v.affects_area_calculation => {
                        (Some(cfg.height_feet()), cfg.height_unit.clone())
                    }
                    (None, _) => (None, String::new()),
                };
                Some(VariationContext {
                    height,
                    unit,
                    affects_area: v.affects_area_calculation,
                })
            }
            None => product_height.map(|cfg| VariationContext {
                height: Some(cfg.height_feet()),
                unit: cfg.height_unit.clone(),
                affects_area: true,
            }),
        }
    }

    /// Height in feet when it can drive an area derivation.
    fn area_height(&self) -> Option<Decimal> {
        self.height
            .filter(|h| self.affects_area && *h > Decimal::ZERO)
    }
}

// =============================================================================
// Charges
// =============================================================================

/// Which rule produced an add-on charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChargeBasis {
    /// `total` mode: independent of the line quantity.
    Flat,

    /// `per_unit` mode.
    PerUnit {
        #[ts(type = "string")]
        quantity: Decimal,
    },

    /// `area_calculation` with a derived square footage.
    DerivedArea {
        #[ts(type = "string")]
        square_feet: Decimal,
    },

    /// `area_calculation` that could not derive an area and priced per unit.
    AreaFallback {
        #[ts(type = "string")]
        quantity: Decimal,
    },
}

/// The evaluated charge for one add-on on one line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonCharge {
    pub addon_id: String,
    pub name: String,
    pub calculation_type: CalculationType,
    pub basis: ChargeBasis,

    /// Price per charged unit, including the selected option.
    pub unit_price: Money,

    #[ts(type = "string")]
    pub multiplier: Decimal,

    pub amount: Money,
}

/// Evaluates a single add-on.
///
/// Disabled add-ons (`quantity <= 0`) evaluate to a zero charge.
///
/// ## Example
/// ```rust
/// use estimo_core::pricing::{evaluate_addon, ChargeBasis};
/// use estimo_core::{Addon, CalculationType, Measurement, Money};
/// use rust_decimal::Decimal;
///
/// let haul = Addon::new("haul", CalculationType::Total, Money::from_major(75))
///     .with_quantity(Decimal::ONE);
/// let measurement = Measurement::area(Decimal::from(200));
///
/// let charge = evaluate_addon(&haul, Decimal::from(200), &measurement, None);
/// assert_eq!(charge.amount, Money::from_major(75));
/// assert_eq!(charge.basis, ChargeBasis::Flat);
/// ```
pub fn evaluate_addon(
    addon: &Addon,
    quantity: Decimal,
    measurement: &Measurement,
    context: Option<&VariationContext>,
) -> AddonCharge {
    let multiplier = addon.selection().quantity();
    let price = addon.effective_price();

    let basis = match addon.calculation_type {
        CalculationType::Total => ChargeBasis::Flat,
        CalculationType::PerUnit => ChargeBasis::PerUnit { quantity },
        CalculationType::AreaCalculation => {
            match (measurement.kind, context.and_then(VariationContext::area_height)) {
                (MeasurementKind::Linear, Some(height)) => ChargeBasis::DerivedArea {
                    square_feet: non_negative(measurement.value).saturating_mul(height),
                },
                _ => ChargeBasis::AreaFallback { quantity },
            }
        }
    };

    let charged_units = match &basis {
        ChargeBasis::Flat => Decimal::ONE,
        ChargeBasis::PerUnit { quantity } | ChargeBasis::AreaFallback { quantity } => *quantity,
        ChargeBasis::DerivedArea { square_feet } => *square_feet,
    };

    AddonCharge {
        addon_id: addon.id.clone(),
        name: addon.name.clone(),
        calculation_type: addon.calculation_type,
        basis,
        unit_price: price,
        multiplier,
        amount: price * charged_units * multiplier,
    }
}

/// Evaluates every selected add-on. Disabled add-ons are skipped.
pub fn evaluate_selected(
    addons: &[Addon],
    quantity: Decimal,
    measurement: &Measurement,
    context: Option<&VariationContext>,
) -> Vec<AddonCharge> {
    addons
        .iter()
        .filter(|a| a.selection().is_selected())
        .map(|a| evaluate_addon(a, quantity, measurement, context))
        .collect()
}

/// Sums the charges of every selected add-on.
pub fn addons_total(
    addons: &[Addon],
    quantity: Decimal,
    measurement: &Measurement,
    context: Option<&VariationContext>,
) -> Money {
    evaluate_selected(addons, quantity, measurement, context)
        .iter()
        .map(|c| c.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddonOption, HeightConfig};
    use rust_decimal_macros::dec;

    fn fence() -> Product {
        Product::new("fence", "Privacy Fence", Money::from_major(28))
    }

    #[test]
    fn test_total_mode_ignores_quantity() {
        let addon = Addon::new("gate", CalculationType::Total, Money::from_major(150))
            .with_quantity(dec!(2));
        let m = Measurement::linear(dec!(100));

        let small = evaluate_addon(&addon, dec!(1), &m, None);
        let large = evaluate_addon(&addon, dec!(1000), &m, None);
        assert_eq!(small.amount, Money::from_major(300));
        assert_eq!(large.amount, Money::from_major(300));
    }

    #[test]
    fn test_per_unit_scales_with_quantity() {
        let addon = Addon::new("seal", CalculationType::PerUnit, Money::from_minor(50))
            .with_quantity(dec!(1));
        let m = Measurement::area(dec!(200));

        let charge = evaluate_addon(&addon, dec!(200), &m, None);
        assert_eq!(charge.amount, Money::from_major(100));
        assert_eq!(charge.basis, ChargeBasis::PerUnit { quantity: dec!(200) });
    }

    #[test]
    fn test_area_calculation_uses_variation_height() {
        let addon = Addon::new("stain", CalculationType::AreaCalculation, Money::from_minor(50))
            .with_quantity(dec!(1));
        let six_ft = Variation::fixed("6ft", dec!(0)).with_height(dec!(6), "ft");
        let context = VariationContext::for_line(&fence(), Some(&six_ft));
        let m = Measurement::linear(dec!(100));

        let charge = evaluate_addon(&addon, dec!(100), &m, context.as_ref());
        assert_eq!(charge.basis, ChargeBasis::DerivedArea { square_feet: dec!(600) });
        assert_eq!(charge.amount, Money::from_major(300));
    }

    #[test]
    fn test_area_calculation_converts_inches() {
        let addon = Addon::new("stain", CalculationType::AreaCalculation, Money::from_major(1))
            .with_quantity(dec!(1));
        let variation = Variation::fixed("72in", dec!(0)).with_height(dec!(72), "in");
        let context = VariationContext::for_line(&fence(), Some(&variation));

        let charge = evaluate_addon(&addon, dec!(10), &Measurement::linear(dec!(10)), context.as_ref());
        assert_eq!(charge.amount, Money::from_major(60));
    }

    #[test]
    fn test_area_calculation_falls_back_without_height() {
        let addon = Addon::new("stain", CalculationType::AreaCalculation, Money::from_minor(50))
            .with_quantity(dec!(1));
        let m = Measurement::linear(dec!(100));

        let charge = evaluate_addon(&addon, dec!(100), &m, None);
        assert_eq!(charge.basis, ChargeBasis::AreaFallback { quantity: dec!(100) });
        assert_eq!(charge.amount, Money::from_major(50));
    }

    #[test]
    fn test_area_calculation_falls_back_when_variation_does_not_affect_area() {
        let addon = Addon::new("stain", CalculationType::AreaCalculation, Money::from_minor(50))
            .with_quantity(dec!(1));
        let mut variation = Variation::fixed("6ft", dec!(0)).with_height(dec!(6), "ft");
        variation.affects_area_calculation = false;
        let context = VariationContext::for_line(&fence(), Some(&variation));

        let charge =
            evaluate_addon(&addon, dec!(100), &Measurement::linear(dec!(100)), context.as_ref());
        assert!(matches!(charge.basis, ChargeBasis::AreaFallback { .. }));
    }

    #[test]
    fn test_area_calculation_falls_back_for_area_measurements() {
        let addon = Addon::new("stain", CalculationType::AreaCalculation, Money::from_minor(50))
            .with_quantity(dec!(1));
        let variation = Variation::fixed("6ft", dec!(0)).with_height(dec!(6), "ft");
        let context = VariationContext::for_line(&fence(), Some(&variation));

        let charge =
            evaluate_addon(&addon, dec!(200), &Measurement::area(dec!(200)), context.as_ref());
        assert_eq!(charge.amount, Money::from_major(100));
    }

    #[test]
    fn test_product_height_config_fills_in() {
        let mut product = fence();
        product.height_config = Some(HeightConfig {
            base_height: dec!(4),
            height_unit: "ft".to_string(),
            use_height_in_area_calc: true,
        });

        // no variation selected
        let context = VariationContext::for_line(&product, None).unwrap();
        assert_eq!(context.height, Some(dec!(4)));
        assert!(context.affects_area);

        // variation affects area but has no height of its own
        let mut plain = Variation::fixed("plain", dec!(0));
        plain.affects_area_calculation = true;
        let context = VariationContext::for_line(&product, Some(&plain)).unwrap();
        assert_eq!(context.height, Some(dec!(4)));

        // variation height wins over the product config
        let tall = Variation::fixed("8ft", dec!(0)).with_height(dec!(8), "ft");
        let context = VariationContext::for_line(&product, Some(&tall)).unwrap();
        assert_eq!(context.height, Some(dec!(8)));
    }

    #[test]
    fn test_no_context_without_variation_or_config() {
        assert!(VariationContext::for_line(&fence(), None).is_none());
    }

    #[test]
    fn test_disabled_addons_are_excluded() {
        let on = Addon::new("a", CalculationType::Total, Money::from_major(10)).with_quantity(dec!(1));
        let off = Addon::new("b", CalculationType::Total, Money::from_major(99));
        let negative =
            Addon::new("c", CalculationType::Total, Money::from_major(99)).with_quantity(dec!(-1));
        let m = Measurement::area(dec!(1));

        let total = addons_total(&[on, off.clone(), negative], dec!(1), &m, None);
        assert_eq!(total, Money::from_major(10));
        assert_eq!(evaluate_addon(&off, dec!(1), &m, None).amount, Money::zero());
    }

    #[test]
    fn test_selected_option_adjusts_price() {
        let mut addon = Addon::new("stain", CalculationType::PerUnit, Money::from_minor(50))
            .with_quantity(dec!(1));
        addon.options.push(AddonOption {
            id: "dark".to_string(),
            name: "Dark Walnut".to_string(),
            price_adjustment: Money::from_minor(25),
        });
        addon.selected_option_id = Some("dark".to_string());

        let charge = evaluate_addon(&addon, dec!(100), &Measurement::linear(dec!(100)), None);
        assert_eq!(charge.unit_price, Money::from_minor(75));
        assert_eq!(charge.amount, Money::from_major(75));
    }
}
