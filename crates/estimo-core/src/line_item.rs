//! # Quote Line Items
//!
//! A line item is a frozen snapshot of everything needed to price it again:
//! the product as it was, the measurement, the chosen variation and the
//! add-on selections. Catalog edits after the fact never change a saved line.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Line Item Operations                                │
//! │                                                                         │
//! │  Builder Action            Method                   Snapshot Change     │
//! │  ──────────────            ──────                   ───────────────     │
//! │                                                                         │
//! │  Add line ───────────────► build() ───────────────► new snapshot        │
//! │                                                                         │
//! │  Redraw area ────────────► update_measurement() ──► measurement, reprice│
//! │                                                                         │
//! │  Pick another option ────► update_variation() ────► variation, reprice  │
//! │                                                                         │
//! │  Toggle add-ons ─────────► update_addons() ───────► addons, reprice     │
//! │                                                                         │
//! │  Re-open saved quote ────► reprice() ─────────────► same numbers        │
//! │                                                                         │
//! │  NOTE: every edit re-prices the WHOLE line from the stored inputs.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{compute_line_total, AddonCharge, LinePricing};
use crate::types::{Addon, IncrementsApplied, Measurement, Product, Variation};

fn default_pick_quantity() -> Decimal {
    Decimal::ONE
}

/// A caller's choice of one add-on for a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonPick {
    pub addon_id: String,

    /// Multiplier; defaults to 1. Zero or less leaves the add-on unselected.
    #[serde(default = "default_pick_quantity")]
    #[ts(type = "string")]
    pub quantity: Decimal,

    #[serde(default)]
    pub option_id: Option<String>,
}

impl AddonPick {
    pub fn new(addon_id: impl Into<String>) -> Self {
        AddonPick {
            addon_id: addon_id.into(),
            quantity: Decimal::ONE,
            option_id: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_option(mut self, option_id: impl Into<String>) -> Self {
        self.option_id = Some(option_id.into());
        self
    }
}

/// A priced line on a quote.
///
/// ## Design Notes
/// - `product`: frozen copy of the catalog record at the time of adding
/// - `addons`: the product's add-on list with this line's selections
///   applied (unpicked add-ons carry `quantity = 0`)
/// - pricing fields are exact and are recomputed by every edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    /// Line ID (UUID)
    pub id: String,

    pub product: Product,
    pub measurement: Measurement,
    pub variation: Option<Variation>,
    pub addons: Vec<Addon>,

    #[ts(type = "string")]
    pub quantity: Decimal,
    pub unit_price: Money,
    pub base_price: Money,
    pub addons_total: Money,
    pub line_total: Money,
    pub increments_applied: Option<IncrementsApplied>,
    pub addon_charges: Vec<AddonCharge>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl QuoteLineItem {
    /// Builds and prices a new line from a catalog product.
    ///
    /// ## Behavior
    /// - `variation_id = None` selects the product's default variation, if any
    /// - picks must reference add-ons (and options) the product offers
    /// - required-variation and minimum-order checks are NOT done here;
    ///   call [`crate::validation::validate_line_selection`] first
    ///
    /// ## Example
    /// ```rust
    /// use estimo_core::{AddonPick, Addon, CalculationType, Measurement, Money, Product, QuoteLineItem};
    /// use rust_decimal::Decimal;
    ///
    /// let mut patio = Product::new("patio", "Paver Patio", Money::from_minor(350));
    /// patio.addons.push(Addon::new("haul", CalculationType::Total, Money::from_major(70)));
    ///
    /// let line = QuoteLineItem::build(
    ///     &patio,
    ///     Measurement::area(Decimal::from(200)),
    ///     None,
    ///     &[AddonPick::new("haul")],
    /// )
    /// .unwrap();
    /// assert_eq!(line.line_total, Money::from_major(770));
    /// ```
    pub fn build(
        product: &Product,
        measurement: Measurement,
        variation_id: Option<&str>,
        picks: &[AddonPick],
    ) -> CoreResult<Self> {
        let variation = select_variation(product, variation_id)?;
        let addons = apply_picks(product, picks)?;

        let now = Utc::now();
        let mut line = QuoteLineItem {
            id: Uuid::new_v4().to_string(),
            product: product.clone(),
            measurement,
            variation,
            addons,
            quantity: Decimal::ZERO,
            unit_price: Money::zero(),
            base_price: Money::zero(),
            addons_total: Money::zero(),
            line_total: Money::zero(),
            increments_applied: None,
            addon_charges: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        line.apply_pricing(line.price());
        Ok(line)
    }

    /// Prices the stored snapshot without modifying it.
    pub fn price(&self) -> LinePricing {
        compute_line_total(
            &self.product,
            &self.measurement,
            self.variation.as_ref(),
            &self.addons,
        )
    }

    /// Recomputes every pricing field from the stored inputs.
    pub fn reprice(&mut self) {
        self.apply_pricing(self.price());
        self.updated_at = Utc::now();
    }

    /// True when the stored numbers match a fresh pricing of the snapshot.
    pub fn is_consistent(&self) -> bool {
        let fresh = self.price();
        fresh.quantity == self.quantity
            && fresh.unit_price == self.unit_price
            && fresh.base_price == self.base_price
            && fresh.addons_total == self.addons_total
            && fresh.line_total == self.line_total
    }

    /// Replaces the measurement and re-prices.
    pub fn update_measurement(&mut self, measurement: Measurement) {
        self.measurement = measurement;
        self.reprice();
    }

    /// Switches the variation (resolved against the product snapshot) and re-prices.
    pub fn update_variation(&mut self, variation_id: Option<&str>) -> CoreResult<()> {
        self.variation = select_variation(&self.product, variation_id)?;
        self.reprice();
        Ok(())
    }

    /// Replaces all add-on selections and re-prices.
    pub fn update_addons(&mut self, picks: &[AddonPick]) -> CoreResult<()> {
        self.addons = apply_picks(&self.product, picks)?;
        self.reprice();
        Ok(())
    }

    /// The selected add-ons only.
    pub fn selected_addons(&self) -> impl Iterator<Item = &Addon> {
        self.addons.iter().filter(|a| a.selection().is_selected())
    }

    fn apply_pricing(&mut self, pricing: LinePricing) {
        self.measurement.increments_applied = pricing.increments_applied.clone();
        self.quantity = pricing.quantity;
        self.unit_price = pricing.unit_price;
        self.base_price = pricing.base_price;
        self.addons_total = pricing.addons_total;
        self.line_total = pricing.line_total;
        self.increments_applied = pricing.increments_applied;
        self.addon_charges = pricing.addon_charges;
    }
}

/// Resolves the variation for a line. `None` falls back to the default.
fn select_variation(product: &Product, variation_id: Option<&str>) -> CoreResult<Option<Variation>> {
    match variation_id {
        Some(id) => product
            .variation(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| CoreError::UnknownVariation {
                product_id: product.id.clone(),
                variation_id: id.to_string(),
            }),
        None => Ok(product.default_variation().cloned()),
    }
}

/// Copies the product's add-ons with the picks applied.
fn apply_picks(product: &Product, picks: &[AddonPick]) -> CoreResult<Vec<Addon>> {
    let mut addons: Vec<Addon> = product
        .addons
        .iter()
        .map(|a| Addon {
            quantity: Decimal::ZERO,
            selected_option_id: None,
            ..a.clone()
        })
        .collect();

    for pick in picks {
        let addon = addons
            .iter_mut()
            .find(|a| a.id == pick.addon_id)
            .ok_or_else(|| CoreError::UnknownAddon {
                product_id: product.id.clone(),
                addon_id: pick.addon_id.clone(),
            })?;

        if let Some(option_id) = &pick.option_id {
            if addon.option(option_id).is_none() {
                return Err(CoreError::UnknownAddonOption {
                    addon_id: addon.id.clone(),
                    option_id: option_id.clone(),
                });
            }
        }

        addon.quantity = pick.quantity;
        addon.selected_option_id = pick.option_id.clone();
    }

    Ok(addons)
}
