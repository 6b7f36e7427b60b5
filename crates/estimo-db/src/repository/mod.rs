//! # Repository Module
//!
//! Database repository implementations for Estimo.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.line_items().delete(quote_id, line_id)                     │
//! │       ▼                                                                 │
//! │  LineItemRepository                                                    │
//! │  ├── insert / update / delete  ──► recompute quote totals (same tx)   │
//! │  └── get                                                               │
//! │                                                                         │
//! │  QuoteRepository                                                       │
//! │  ├── insert (quote + lines, one tx)                                    │
//! │  ├── get_by_id / summary / list                                        │
//! │  ├── set_status (lifecycle checked)                                    │
//! │  └── delete (lines cascade)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (decimals as TEXT, snapshots as JSON)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`QuoteRepository`](quote::QuoteRepository) - Quotes, status and totals
//! - [`LineItemRepository`](line_item::LineItemRepository) - Line-item snapshots

use std::str::FromStr;

use estimo_core::Money;
use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

pub mod line_item;
pub mod quote;

/// Parses a decimal stored as TEXT.
pub(crate) fn decimal_column(column: &str, text: &str) -> DbResult<Decimal> {
    Decimal::from_str(text).map_err(|e| DbError::invalid(column, format!("'{}' ({})", text, e)))
}

/// Parses money stored as TEXT.
pub(crate) fn money_column(column: &str, text: &str) -> DbResult<Money> {
    decimal_column(column, text).map(Money::new)
}
