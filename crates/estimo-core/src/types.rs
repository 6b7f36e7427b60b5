//! # Domain Types
//!
//! Catalog records and measurements consumed by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Snapshot                                │
//! │                                                                         │
//! │  ┌──────────────────────┐                                              │
//! │  │       Product        │                                              │
//! │  │  ──────────────────  │      ┌─────────────────┐                     │
//! │  │  unit_price          │─────►│   Variation[]   │  fixed | percentage │
//! │  │  unit_type           │      └─────────────────┘                     │
//! │  │  increment_lot?      │      ┌─────────────────┐                     │
//! │  │  height_config?      │─────►│     Addon[]     │  total | per_unit | │
//! │  │  uses_tiered_pricing │      └─────────────────┘  area_calculation   │
//! │  │                      │      ┌─────────────────┐                     │
//! │  │                      │─────►│ PricingTier[]   │  [min, max] @ price │
//! │  └──────────────────────┘      └─────────────────┘                     │
//! │                                                                         │
//! │  ┌──────────────────────┐                                              │
//! │  │     Measurement      │  area | linear | point, value, depth?        │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Records are camelCase JSON, matching what the catalog provider stores.
//! Every numeric field is parsed fail-soft (see [`crate::numeric`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::numeric;

fn default_true() -> bool {
    true
}

// =============================================================================
// Enumerations
// =============================================================================

/// Unit a product is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Square feet.
    #[default]
    #[serde(alias = "sq_ft", alias = "square_feet", alias = "sqft")]
    Area,
    /// Linear feet.
    #[serde(alias = "linear_ft", alias = "linear_feet", alias = "linear")]
    Length,
    /// Discrete items.
    #[serde(alias = "each", alias = "unit", alias = "point")]
    Count,
    /// Cubic yards.
    #[serde(alias = "cubic_yards", alias = "cu_yd")]
    Volume,
    /// Labor hours.
    #[serde(alias = "hours", alias = "hour")]
    Time,
    /// Pounds or tons.
    #[serde(alias = "pounds", alias = "tons")]
    Weight,
    /// Fixed lots (pallets, bundles).
    #[serde(alias = "pallet", alias = "bundle")]
    Lot,
}

impl UnitType {
    /// Short label for receipts.
    pub fn label(&self) -> &'static str {
        match self {
            UnitType::Area => "sq ft",
            UnitType::Length => "linear ft",
            UnitType::Count => "each",
            UnitType::Volume => "cu yd",
            UnitType::Time => "hr",
            UnitType::Weight => "lb",
            UnitType::Lot => "lot",
        }
    }
}

/// How a measurement was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Polygon area in square feet.
    #[default]
    Area,
    /// Polyline length in feet.
    Linear,
    /// Count of placed points.
    Point,
}

/// How a variation's `priceAdjustment` is applied to the base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// Adds a flat amount per unit.
    #[default]
    Fixed,
    /// Adds a percentage of the base per-unit price.
    Percentage,
}

/// Add-on calculation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    /// Flat charge times the add-on's own quantity.
    #[default]
    Total,
    /// Charge per resolved unit of the line.
    PerUnit,
    /// Charge per square foot derived from length × variation height.
    AreaCalculation,
}

/// Length unit for heights. Parsed leniently from free-form labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeightUnit {
    Inches,
    #[default]
    Feet,
    Yards,
    Centimeters,
    Meters,
}

impl HeightUnit {
    /// Parses a unit label; anything unrecognised is treated as feet.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "in" | "inch" | "inches" | "\"" => HeightUnit::Inches,
            "yd" | "yard" | "yards" => HeightUnit::Yards,
            "cm" | "centimeter" | "centimeters" => HeightUnit::Centimeters,
            "m" | "meter" | "meters" | "metre" | "metres" => HeightUnit::Meters,
            _ => HeightUnit::Feet,
        }
    }

    /// Converts a height in this unit to feet.
    pub fn to_feet(&self, value: Decimal) -> Decimal {
        match self {
            HeightUnit::Inches => value / Decimal::from(12),
            HeightUnit::Feet => value,
            HeightUnit::Yards => value.saturating_mul(Decimal::from(3)),
            // 1 m = 3.28084 ft
            HeightUnit::Centimeters => value.saturating_mul(Decimal::new(328_084, 7)),
            HeightUnit::Meters => value.saturating_mul(Decimal::new(328_084, 5)),
        }
    }
}

// =============================================================================
// Product Configuration
// =============================================================================

/// Fixed lot size a product is sold in (e.g. a 450 sq ft pallet of sod).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IncrementLot {
    /// Quantity per lot in the product's base unit.
    #[serde(default, deserialize_with = "numeric::lenient_decimal_or_zero")]
    #[ts(type = "string")]
    pub size: Decimal,

    /// Lot name for receipts ("pallet", "bundle").
    #[serde(default)]
    pub label: String,

    /// Allows half lots instead of whole lots.
    #[serde(default)]
    pub allow_partial: bool,
}

/// Product-level height, used when the selected variation has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HeightConfig {
    #[serde(default, deserialize_with = "numeric::lenient_decimal_or_zero")]
    #[ts(type = "string")]
    pub base_height: Decimal,

    #[serde(default)]
    pub height_unit: String,

    #[serde(default)]
    pub use_height_in_area_calc: bool,
}

impl HeightConfig {
    /// Base height converted to feet.
    pub fn height_feet(&self) -> Decimal {
        HeightUnit::parse(&self.height_unit).to_feet(self.base_height)
    }
}

// =============================================================================
// Variation
// =============================================================================

/// A mutually exclusive product option that adjusts the unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Dollars per unit (fixed) or percent of base (percentage). May be negative.
    #[serde(default, deserialize_with = "numeric::lenient_decimal_or_zero")]
    #[ts(type = "string")]
    pub price_adjustment: Decimal,

    #[serde(default)]
    pub adjustment_type: AdjustmentType,

    /// Physical height this option represents (fence height, wall height).
    #[serde(default, deserialize_with = "numeric::lenient_decimal")]
    #[ts(type = "string | null")]
    pub height_value: Option<Decimal>,

    /// Unit label for `height_value` ("ft", "in", ...).
    #[serde(default)]
    pub unit_of_measurement: Option<String>,

    /// Whether `height_value` turns a linear measurement into an area
    /// for `area_calculation` add-ons.
    #[serde(default)]
    pub affects_area_calculation: bool,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_default: bool,
}

impl Variation {
    /// Creates a fixed-adjustment variation.
    pub fn fixed(id: impl Into<String>, adjustment: Decimal) -> Self {
        Variation {
            id: id.into(),
            name: String::new(),
            price_adjustment: adjustment,
            adjustment_type: AdjustmentType::Fixed,
            height_value: None,
            unit_of_measurement: None,
            affects_area_calculation: false,
            is_required: false,
            is_default: false,
        }
    }

    /// Creates a percentage-adjustment variation.
    pub fn percentage(id: impl Into<String>, percent: Decimal) -> Self {
        Variation {
            adjustment_type: AdjustmentType::Percentage,
            ..Variation::fixed(id, percent)
        }
    }

    /// Sets a height that drives area-derived add-ons.
    pub fn with_height(mut self, height: Decimal, unit: impl Into<String>) -> Self {
        self.height_value = Some(height);
        self.unit_of_measurement = Some(unit.into());
        self.affects_area_calculation = true;
        self
    }

    /// Height converted to feet, if this variation has one.
    pub fn height_feet(&self) -> Option<Decimal> {
        let unit = self
            .unit_of_measurement
            .as_deref()
            .map(HeightUnit::parse)
            .unwrap_or_default();
        self.height_value.map(|h| unit.to_feet(h))
    }
}

// =============================================================================
// Addon
// =============================================================================

/// A named sub-choice layered on an add-on (e.g. a stain color).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonOption {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "numeric::lenient_money")]
    pub price_adjustment: Money,
}

/// Whether an add-on participates in the line, and how many times.
///
/// The wire format keeps a single `quantity` field; this is the internal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonSelection {
    /// `quantity <= 0`: present in the list but not charged.
    Disabled,
    /// `quantity > 0`: charged `multiplier` times.
    Selected { multiplier: Decimal },
}

impl AddonSelection {
    /// Translates the wire `quantity`.
    pub fn from_quantity(quantity: Decimal) -> Self {
        if quantity > Decimal::ZERO {
            AddonSelection::Selected {
                multiplier: quantity,
            }
        } else {
            AddonSelection::Disabled
        }
    }

    /// Translates back to the wire `quantity`.
    pub fn quantity(&self) -> Decimal {
        match self {
            AddonSelection::Disabled => Decimal::ZERO,
            AddonSelection::Selected { multiplier } => *multiplier,
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, AddonSelection::Selected { .. })
    }
}

/// An optional extra charge attached to a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "numeric::lenient_money")]
    pub price_value: Money,

    #[serde(default)]
    pub calculation_type: CalculationType,

    /// `0` = not selected; `> 0` = selected with this multiplier.
    #[serde(default, deserialize_with = "numeric::lenient_decimal_or_zero")]
    #[ts(type = "string")]
    pub quantity: Decimal,

    #[serde(default)]
    pub options: Vec<AddonOption>,

    #[serde(default)]
    pub selected_option_id: Option<String>,
}

impl Addon {
    /// Creates an add-on that is not yet selected.
    pub fn new(
        id: impl Into<String>,
        calculation_type: CalculationType,
        price_value: Money,
    ) -> Self {
        Addon {
            id: id.into(),
            name: String::new(),
            price_value,
            calculation_type,
            quantity: Decimal::ZERO,
            options: Vec::new(),
            selected_option_id: None,
        }
    }

    /// Returns a copy with the given selection quantity.
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn selection(&self) -> AddonSelection {
        AddonSelection::from_quantity(self.quantity)
    }

    pub fn option(&self, option_id: &str) -> Option<&AddonOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Base price plus the selected option's adjustment, never below zero.
    ///
    /// An unknown `selected_option_id` contributes nothing.
    pub fn effective_price(&self) -> Money {
        let adjustment = self
            .selected_option_id
            .as_deref()
            .and_then(|id| self.option(id))
            .map(|o| o.price_adjustment)
            .unwrap_or_default();
        (self.price_value + adjustment).non_negative()
    }
}

// =============================================================================
// Pricing Tier
// =============================================================================

/// A quantity-banded override of the product's unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    /// Inclusive lower bound.
    #[serde(default, deserialize_with = "numeric::lenient_decimal_or_zero")]
    #[ts(type = "string")]
    pub min_quantity: Decimal,

    /// Inclusive upper bound; `None` is unbounded.
    #[serde(default, deserialize_with = "numeric::lenient_decimal")]
    #[ts(type = "string | null")]
    pub max_quantity: Option<Decimal>,

    #[serde(default, deserialize_with = "numeric::lenient_money")]
    pub tier_price: Money,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl PricingTier {
    pub fn new(min: Decimal, max: Option<Decimal>, price: Money) -> Self {
        PricingTier {
            min_quantity: min,
            max_quantity: max,
            tier_price: price,
            is_active: true,
        }
    }

    /// Checks `min <= quantity <= max`.
    pub fn contains(&self, quantity: Decimal) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable catalog entry, as snapshotted at quote time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "numeric::lenient_money")]
    pub unit_price: Money,

    #[serde(default)]
    pub unit_type: UnitType,

    #[serde(default, deserialize_with = "numeric::lenient_decimal")]
    #[ts(type = "string | null")]
    pub min_order_quantity: Option<Decimal>,

    #[serde(default)]
    pub uses_tiered_pricing: bool,

    #[serde(default)]
    pub increment_lot: Option<IncrementLot>,

    #[serde(default)]
    pub height_config: Option<HeightConfig>,

    #[serde(default)]
    pub variations: Vec<Variation>,

    #[serde(default)]
    pub addons: Vec<Addon>,

    #[serde(default)]
    pub pricing_tiers: Vec<PricingTier>,
}

impl Product {
    /// Creates a flat-priced product with no options.
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            unit_price,
            unit_type: UnitType::default(),
            min_order_quantity: None,
            uses_tiered_pricing: false,
            increment_lot: None,
            height_config: None,
            variations: Vec::new(),
            addons: Vec::new(),
            pricing_tiers: Vec::new(),
        }
    }

    pub fn variation(&self, id: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == id)
    }

    pub fn addon(&self, id: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id == id)
    }

    /// The first variation flagged as default.
    pub fn default_variation(&self) -> Option<&Variation> {
        self.variations.iter().find(|v| v.is_default)
    }

    /// True when any variation is marked required.
    pub fn requires_variation(&self) -> bool {
        self.variations.iter().any(|v| v.is_required)
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// Audit of the lot rounding applied by the Unit Resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IncrementsApplied {
    /// Lots sold (may be a half lot when partial lots are allowed).
    #[ts(type = "string")]
    pub units_needed: Decimal,

    #[ts(type = "string")]
    pub increment_size: Decimal,

    pub increment_label: String,
}

/// The raw user input driving quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(rename = "type", default)]
    pub kind: MeasurementKind,

    /// Raw magnitude in the product's base unit.
    #[serde(default, deserialize_with = "numeric::lenient_decimal_or_zero")]
    #[ts(type = "string")]
    pub value: Decimal,

    /// Depth in inches; turns the measurement into cubic yards.
    #[serde(default, deserialize_with = "numeric::lenient_decimal")]
    #[ts(type = "string | null")]
    pub depth: Option<Decimal>,

    /// Filled in by the Unit Resolver when lot rounding applied.
    #[serde(default)]
    pub increments_applied: Option<IncrementsApplied>,
}

impl Measurement {
    fn of(kind: MeasurementKind, value: Decimal) -> Self {
        Measurement {
            kind,
            value,
            depth: None,
            increments_applied: None,
        }
    }

    pub fn area(value: Decimal) -> Self {
        Measurement::of(MeasurementKind::Area, value)
    }

    pub fn linear(value: Decimal) -> Self {
        Measurement::of(MeasurementKind::Linear, value)
    }

    pub fn point(count: Decimal) -> Self {
        Measurement::of(MeasurementKind::Point, count)
    }

    pub fn with_depth(mut self, depth_inches: Decimal) -> Self {
        self.depth = Some(depth_inches);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_height_unit_conversion() {
        assert_eq!(HeightUnit::parse("in").to_feet(dec!(72)), dec!(6));
        assert_eq!(HeightUnit::parse("FT").to_feet(dec!(6)), dec!(6));
        assert_eq!(HeightUnit::parse("yd").to_feet(dec!(2)), dec!(6));
        assert_eq!(HeightUnit::parse("m").to_feet(dec!(1)), dec!(3.28084));
        assert_eq!(HeightUnit::parse("furlongs"), HeightUnit::Feet);
    }

    #[test]
    fn test_addon_selection_translation() {
        assert_eq!(
            AddonSelection::from_quantity(dec!(0)),
            AddonSelection::Disabled
        );
        assert_eq!(
            AddonSelection::from_quantity(dec!(-1)),
            AddonSelection::Disabled
        );
        let selected = AddonSelection::from_quantity(dec!(2));
        assert!(selected.is_selected());
        assert_eq!(selected.quantity(), dec!(2));
    }

    #[test]
    fn test_addon_effective_price_with_option() {
        let mut addon = Addon::new("stain", CalculationType::PerUnit, Money::from_minor(50));
        addon.options.push(AddonOption {
            id: "cedar".to_string(),
            name: "Cedar".to_string(),
            price_adjustment: Money::from_minor(25),
        });
        assert_eq!(addon.effective_price(), Money::from_minor(50));

        addon.selected_option_id = Some("cedar".to_string());
        assert_eq!(addon.effective_price(), Money::from_minor(75));

        addon.selected_option_id = Some("missing".to_string());
        assert_eq!(addon.effective_price(), Money::from_minor(50));
    }

    #[test]
    fn test_tier_contains_is_inclusive() {
        let tier = PricingTier::new(dec!(1), Some(dec!(10)), Money::from_major(5));
        assert!(tier.contains(dec!(1)));
        assert!(tier.contains(dec!(10)));
        assert!(!tier.contains(dec!(10.5)));

        let open = PricingTier::new(dec!(11), None, Money::from_major(4));
        assert!(open.contains(dec!(1000000)));
    }

    #[test]
    fn test_product_from_catalog_json() {
        let product: Product = serde_json::from_value(json!({
            "id": "fence-wood",
            "name": "Wood Privacy Fence",
            "unitPrice": "28.00",
            "unitType": "linear_ft",
            "variations": [
                {"id": "6ft", "priceAdjustment": 4, "heightValue": "6",
                 "unitOfMeasurement": "ft", "affectsAreaCalculation": true, "isDefault": true}
            ],
            "addons": [
                {"id": "stain", "priceValue": null, "calculationType": "area_calculation"}
            ],
            "pricingTiers": [
                {"minQuantity": 1, "maxQuantity": null, "tierPrice": "26"}
            ]
        }))
        .unwrap();

        assert_eq!(product.unit_type, UnitType::Length);
        assert_eq!(product.unit_price, Money::from_major(28));
        assert_eq!(product.default_variation().map(|v| v.id.as_str()), Some("6ft"));
        assert_eq!(product.variations[0].height_feet(), Some(dec!(6)));
        // null price fails soft to zero
        assert_eq!(product.addons[0].price_value, Money::zero());
        assert_eq!(product.addons[0].quantity, Decimal::ZERO);
        assert!(product.pricing_tiers[0].is_active);
        assert_eq!(product.pricing_tiers[0].max_quantity, None);
    }

    #[test]
    fn test_measurement_json_uses_type_tag() {
        let m: Measurement =
            serde_json::from_value(json!({"type": "linear", "value": "100"})).unwrap();
        assert_eq!(m.kind, MeasurementKind::Linear);
        assert_eq!(m.value, dec!(100));
        assert_eq!(m.depth, None);
    }
}
