//! # Error Types
//!
//! Domain-specific error types for estimo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  estimo-core errors (this file)                                        │
//! │  ├── CoreError        - Structural problems with a quote request       │
//! │  └── ValidationError  - Catalog / selection validation failures        │
//! │                                                                         │
//! │  estimo-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  estimo-cli errors (app)                                               │
//! │  └── CliError         - What the operator sees (with exit code)        │
//! │                                                                         │
//! │  NOTE: the pricing functions themselves never return an error.         │
//! │  Numeric gaps price as zero; only structure is rejected.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Structural errors raised while assembling a quote line.
///
/// These never come out of the arithmetic. They come from resolving the
/// caller's picks against a catalog snapshot.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The selected variation is not part of the product.
    #[error("Variation {variation_id} does not belong to product {product_id}")]
    UnknownVariation {
        product_id: String,
        variation_id: String,
    },

    /// An add-on pick references an add-on the product does not offer.
    #[error("Add-on {addon_id} does not belong to product {product_id}")]
    UnknownAddon { product_id: String, addon_id: String },

    /// An add-on pick references an option the add-on does not offer.
    #[error("Option {option_id} is not available on add-on {addon_id}")]
    UnknownAddonOption { addon_id: String, option_id: String },

    /// Line item not present in the quote.
    #[error("Line item not found: {0}")]
    LineNotFound(String),

    /// Quote has exceeded maximum allowed lines.
    #[error("Quote cannot have more than {max} line items")]
    QuoteTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Catalog and selection validation errors.
///
/// Raised at product-save time (tiers, defaults) or before add-to-quote
/// (required variation, minimum order). Surfaced as form messages.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is outside the allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// A tier's minimum is above its maximum.
    #[error("Tier {index} has minimum {min} above maximum {max}")]
    InvertedTier {
        index: usize,
        min: String,
        max: String,
    },

    /// Two active tiers cover the same quantity.
    #[error("Tiers {first} and {second} overlap")]
    OverlappingTiers { first: usize, second: usize },

    /// Quantities between two active tiers are not covered.
    #[error("Gap between tier {first} (max {max}) and tier {second} (min {min})")]
    TierGap {
        first: usize,
        second: usize,
        max: String,
        min: String,
    },

    /// Only the last active tier may be open-ended.
    #[error("Tier {index} is unbounded but is not the highest tier")]
    UnboundedTierNotLast { index: usize },

    /// More than one variation is flagged as the default.
    #[error("Product has {count} default variations; at most one is allowed")]
    MultipleDefaultVariations { count: usize },

    /// The product has a required variation but none was selected.
    #[error("Product {product_id} requires a variation to be selected")]
    VariationRequired { product_id: String },

    /// Measured quantity is below the product's minimum order.
    #[error("Quantity {requested} is below the minimum order of {minimum}")]
    BelowMinimumOrder { requested: String, minimum: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
