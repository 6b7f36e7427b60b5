//! # estimo-db: Database Layer for Estimo
//!
//! Persists quotes and their line-item snapshots in SQLite with sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estimo Data Flow                                 │
//! │                                                                         │
//! │  estimo save quote.json                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  estimo-core: QuoteLineItem::build ──► priced snapshot                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     estimo-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ QuoteRepo      │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ LineItemRepo   │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (path from estimo.toml / ESTIMO_DB_PATH)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Quote and line-item repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use estimo_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("estimo.db")).await?;
//! db.quotes().insert(&quote).await?;
//! let stored = db.quotes().get_by_id(&quote.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::line_item::LineItemRepository;
pub use repository::quote::{QuoteRepository, QuoteSummary};
