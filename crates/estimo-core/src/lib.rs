//! # estimo-core: Pure Pricing Engine for Estimo
//!
//! This crate is the **single pricing truth** of Estimo. Every surface that
//! shows a price (quote builder, review screen, contractor line editor)
//! calls into it; none of them re-implement the arithmetic.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estimo Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Measurement capture / product selection UI             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain catalog records + picks          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ estimo-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   Measurement ──► Unit Resolver ──► Base Price Resolver         │   │
//! │  │                                          │                      │   │
//! │  │                                          ▼                      │   │
//! │  │             Line Aggregator ◄── Add-on Evaluator                │   │
//! │  │                    │                                            │   │
//! │  │                    ▼                                            │   │
//! │  │             Quote Aggregator (subtotal + tax)                   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 estimo-db (snapshot persistence)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog records (Product, Variation, Addon, PricingTier) and Measurement
//! - [`money`] - Exact decimal `Money` and percentage `TaxRate`
//! - [`pricing`] - The four engine stages plus quote totals
//! - [`line_item`] - Snapshotted quote line items
//! - [`quote`] - Quotes, their status lifecycle and totals
//! - [`validation`] - Product-save and add-to-quote structural checks
//! - [`format`] - Explicitly configured currency display
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, bit for bit
//! 2. **Fail-Soft Numbers**: missing prices price as zero, never panic
//! 3. **Exact Decimals**: rounding happens only when formatting for display
//! 4. **Structural Errors Are the Caller's**: required selections are validated
//!    before pricing, not inside it
//!
//! ## Example Usage
//!
//! ```rust
//! use estimo_core::pricing::compute_line_total;
//! use estimo_core::{Measurement, Money, Product};
//! use rust_decimal::Decimal;
//!
//! let product = Product::new("sod", "Bermuda Sod", Money::new(Decimal::new(3, 0)));
//! let measurement = Measurement::area(Decimal::new(200, 0));
//!
//! let line = compute_line_total(&product, &measurement, None, &[]);
//! assert_eq!(line.line_total, Money::new(Decimal::new(600, 0)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod format;
pub mod line_item;
pub mod money;
pub mod numeric;
pub mod pricing;
pub mod quote;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use format::CurrencyFormat;
pub use line_item::{AddonPick, QuoteLineItem};
pub use money::{Money, TaxRate};
pub use pricing::{AddonCharge, ChargeBasis, LinePricing, QuoteTotals, VariationContext};
pub use quote::{Quote, QuoteStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Square-foot inches in one cubic yard (27 cu ft × 12 in).
///
/// A measurement with a depth in inches over an area in square feet becomes
/// cubic yards by `value * depth / CUBIC_YARD_DIVISOR`.
pub const CUBIC_YARD_DIVISOR: u32 = 324;

/// Largest allowed distance between one tier's `maxQuantity` and the next
/// tier's `minQuantity` before the pair counts as a gap.
pub const TIER_CONTIGUITY_STEP: u32 = 1;

/// Maximum line items allowed in a single quote.
pub const MAX_QUOTE_LINES: usize = 200;
