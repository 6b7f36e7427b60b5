//! # Pricing Engine
//!
//! The four stages that turn a measurement and a set of selections into a
//! line total, plus the quote-level aggregation.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Pricing Pipeline                                │
//! │                                                                         │
//! │  Measurement + Product                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [units]      resolve_quantity ──► quantity (lot-rounded)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [base_price] resolve_unit_price ──► tier or flat, then variation      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [addons]     evaluate_addon × N ──► total | per_unit | area           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [line]       compute_line_total ──► LinePricing                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  [quote]      compute_quote_totals ──► subtotal + tax = total          │
//! │                                                                         │
//! │  Every stage is a pure function of its inputs. Calling the pipeline    │
//! │  twice with the same inputs yields identical output.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod addons;
pub mod base_price;
pub mod line;
pub mod quote;
pub mod units;

pub use addons::{
    addons_total, evaluate_addon, evaluate_selected, AddonCharge, ChargeBasis, VariationContext,
};
pub use base_price::{apply_variation, resolve_unit_price, tier_price_for};
pub use line::{compute_line_total, LinePricing};
pub use quote::{compute_quote_totals, QuoteTotals};
pub use units::{resolve_quantity, ResolvedQuantity};
