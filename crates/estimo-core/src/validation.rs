//! # Validation Module
//!
//! Structural checks on catalog records and line selections.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Product save (catalog editor)                                         │
//! │  ├── validate_product                                                  │
//! │  │   ├── validate_tiers       (contiguous, ordered, one open end)     │
//! │  │   └── validate_variations  (at most one default)                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Add to quote (quote builder)                                          │
//! │  └── validate_line_selection  (required variation, minimum order)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Pricing engine                                                        │
//! │  └── never validates: missing numbers price as zero                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use estimo_core::validation::validate_line_selection;
//! use estimo_core::{Measurement, Money, Product};
//! use rust_decimal::Decimal;
//!
//! let sod = Product::new("sod", "Sod", Money::from_major(1));
//! assert!(validate_line_selection(&sod, &Measurement::area(Decimal::from(10)), None).is_ok());
//! assert!(validate_line_selection(&sod, &Measurement::area(Decimal::ZERO), None).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::TaxRate;
use crate::pricing::resolve_quantity;
use crate::types::{Measurement, PricingTier, Product, Variation};
use crate::TIER_CONTIGUITY_STEP;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product's pricing tiers.
///
/// Only active tiers are checked. Indexes in errors refer to positions in
/// `tiers`.
///
/// ## Rules
/// - `minQuantity` and `tierPrice` are not negative
/// - `minQuantity <= maxQuantity`
/// - sorted by minimum, each tier starts after the previous one ends, and
///   at most [`TIER_CONTIGUITY_STEP`] later
/// - only the highest tier may omit `maxQuantity`
///
/// ## Example
/// ```rust
/// use estimo_core::validation::validate_tiers;
/// use estimo_core::{Money, PricingTier};
/// use rust_decimal::Decimal;
///
/// let tiers = vec![
///     PricingTier::new(Decimal::from(1), Some(Decimal::from(10)), Money::from_major(5)),
///     PricingTier::new(Decimal::from(11), None, Money::from_major(4)),
/// ];
/// assert!(validate_tiers(&tiers).is_ok());
/// ```
pub fn validate_tiers(tiers: &[PricingTier]) -> ValidationResult<()> {
    let mut active: Vec<(usize, &PricingTier)> =
        tiers.iter().enumerate().filter(|(_, t)| t.is_active).collect();

    for (index, tier) in &active {
        if tier.min_quantity < Decimal::ZERO {
            return Err(ValidationError::Negative {
                field: format!("pricingTiers[{}].minQuantity", index),
            });
        }
        if tier.tier_price.is_negative() {
            return Err(ValidationError::Negative {
                field: format!("pricingTiers[{}].tierPrice", index),
            });
        }
        if let Some(max) = tier.max_quantity {
            if max < tier.min_quantity {
                return Err(ValidationError::InvertedTier {
                    index: *index,
                    min: tier.min_quantity.to_string(),
                    max: max.to_string(),
                });
            }
        }
    }

    active.sort_by_key(|(_, t)| t.min_quantity);
    let step = Decimal::from(TIER_CONTIGUITY_STEP);

    for pair in active.windows(2) {
        let (first, prev) = pair[0];
        let (second, next) = pair[1];

        let Some(prev_max) = prev.max_quantity else {
            return Err(ValidationError::UnboundedTierNotLast { index: first });
        };

        if next.min_quantity <= prev_max {
            return Err(ValidationError::OverlappingTiers { first, second });
        }

        if next.min_quantity - prev_max > step {
            return Err(ValidationError::TierGap {
                first,
                second,
                max: prev_max.to_string(),
                min: next.min_quantity.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a product's variations.
///
/// ## Rules
/// - every variation has an id
/// - at most one variation is the default
pub fn validate_variations(variations: &[Variation]) -> ValidationResult<()> {
    if variations.iter().any(|v| v.id.trim().is_empty()) {
        return Err(ValidationError::Required {
            field: "variations[].id".to_string(),
        });
    }

    let defaults = variations.iter().filter(|v| v.is_default).count();
    if defaults > 1 {
        return Err(ValidationError::MultipleDefaultVariations { count: defaults });
    }

    Ok(())
}

/// Validates a product at save time.
///
/// ## Rules
/// - id is present, unit price is not negative
/// - an increment lot, if configured, has a positive size
/// - minimum order quantity is not negative
/// - add-on prices are not negative
/// - tiers (when tiered pricing is on) and variations pass their validators
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if product.unit_price.is_negative() {
        return Err(ValidationError::Negative {
            field: "unitPrice".to_string(),
        });
    }

    if let Some(lot) = &product.increment_lot {
        if lot.size <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: "incrementLot.size".to_string(),
            });
        }
    }

    if product
        .min_order_quantity
        .is_some_and(|min| min < Decimal::ZERO)
    {
        return Err(ValidationError::Negative {
            field: "minOrderQuantity".to_string(),
        });
    }

    if let Some(addon) = product.addons.iter().find(|a| a.price_value.is_negative()) {
        return Err(ValidationError::Negative {
            field: format!("addons[{}].priceValue", addon.id),
        });
    }

    if product.uses_tiered_pricing {
        validate_tiers(&product.pricing_tiers)?;
    }

    validate_variations(&product.variations)
}

// =============================================================================
// Selection Validators
// =============================================================================

/// Validates a line selection before it is added to a quote.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Quote Builder: Add Line                                                │
/// │                                                                         │
/// │  Contractor measures 40 sq ft, picks no variation                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_line_selection ← THIS FUNCTION                               │
/// │       │                                                                 │
/// │       ├── unknown variation id?     → NotAllowed                       │
/// │       ├── required, none, no default? → VariationRequired              │
/// │       ├── value <= 0?               → MustBePositive                   │
/// │       ├── quantity < minimum order? → BelowMinimumOrder                │
/// │       │                                                                 │
/// │       └── OK → QuoteLineItem::build                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The minimum order is compared against the lot-rounded quantity, the
/// quantity actually sold.
pub fn validate_line_selection(
    product: &Product,
    measurement: &Measurement,
    variation_id: Option<&str>,
) -> ValidationResult<()> {
    let variation = match variation_id {
        Some(id) => Some(product.variation(id).ok_or_else(|| ValidationError::NotAllowed {
            field: "variationId".to_string(),
            allowed: product.variations.iter().map(|v| v.id.clone()).collect(),
        })?),
        None => product.default_variation(),
    };

    if variation.is_none() && product.requires_variation() {
        return Err(ValidationError::VariationRequired {
            product_id: product.id.clone(),
        });
    }

    if measurement.value <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "measurement.value".to_string(),
        });
    }

    if let Some(minimum) = product.min_order_quantity {
        let quantity = resolve_quantity(measurement, product).quantity;
        if quantity < minimum {
            return Err(ValidationError::BelowMinimumOrder {
                requested: quantity.normalize().to_string(),
                minimum: minimum.normalize().to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a quote tax rate.
///
/// ## Rules
/// - Must be between 0% and 100%
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.percent() < Decimal::ZERO || rate.percent() > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
