//! # Line Item Repository
//!
//! Database operations for quote line items.
//!
//! ## Snapshot Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    quote_line_items row                                 │
//! │                                                                         │
//! │  id, quote_id, position                                                │
//! │  product_id, product_name           ← for listings                     │
//! │  quantity, unit_price, base_price,  ← decimal TEXT, exact              │
//! │  addons_total, line_total                                              │
//! │  snapshot                           ← full QuoteLineItem JSON          │
//! │                                                                         │
//! │  Every write:                                                          │
//! │    1. quote must be a draft                                            │
//! │    2. line is re-priced if its numbers drifted from its snapshot       │
//! │    3. row written                                                      │
//! │    4. quote totals recomputed        (all in one transaction)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::borrow::Cow;

use estimo_core::pricing::QuoteTotals;
use estimo_core::{CoreError, QuoteLineItem, MAX_QUOTE_LINES};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use super::quote::{ensure_draft, recompute_totals};
use crate::error::{DbError, DbResult};

/// Repository for line-item database operations.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    pool: SqlitePool,
}

impl LineItemRepository {
    /// Creates a new LineItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LineItemRepository { pool }
    }

    /// Appends a line to a draft quote and returns the new quote totals.
    ///
    /// ## Returns
    /// - `Err(NotFound)` if the quote doesn't exist
    /// - `Err(QuoteNotEditable)` unless the quote is a draft
    /// - `Err(Core(QuoteTooLarge))` past [`MAX_QUOTE_LINES`]
    pub async fn insert(&self, quote_id: &str, line: &QuoteLineItem) -> DbResult<QuoteTotals> {
        debug!(quote_id = %quote_id, line_id = %line.id, "Adding line to quote");

        let mut tx = self.pool.begin().await?;
        ensure_draft(&mut *tx, quote_id).await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quote_line_items WHERE quote_id = ?1")
                .bind(quote_id)
                .fetch_one(&mut *tx)
                .await?;
        if count as usize >= MAX_QUOTE_LINES {
            return Err(CoreError::QuoteTooLarge {
                max: MAX_QUOTE_LINES,
            }
            .into());
        }

        let position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM quote_line_items WHERE quote_id = ?1",
        )
        .bind(quote_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_line(&mut *tx, quote_id, position, line).await?;
        let totals = recompute_totals(&mut *tx, quote_id).await?;
        tx.commit().await?;

        Ok(totals)
    }

    /// Replaces a line's snapshot (after a measurement, variation or
    /// add-on edit) and returns the new quote totals.
    pub async fn update(&self, quote_id: &str, line: &QuoteLineItem) -> DbResult<QuoteTotals> {
        debug!(quote_id = %quote_id, line_id = %line.id, "Updating quote line");

        let line = priced(line);
        let snapshot = serde_json::to_string(line.as_ref())?;

        let mut tx = self.pool.begin().await?;
        ensure_draft(&mut *tx, quote_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE quote_line_items SET
                product_id = ?3,
                product_name = ?4,
                quantity = ?5,
                unit_price = ?6,
                base_price = ?7,
                addons_total = ?8,
                line_total = ?9,
                snapshot = ?10,
                updated_at = ?11
            WHERE id = ?1 AND quote_id = ?2
            "#,
        )
        .bind(&line.id)
        .bind(quote_id)
        .bind(&line.product.id)
        .bind(&line.product.name)
        .bind(line.quantity.to_string())
        .bind(line.unit_price.amount().to_string())
        .bind(line.base_price.amount().to_string())
        .bind(line.addons_total.amount().to_string())
        .bind(line.line_total.amount().to_string())
        .bind(snapshot)
        .bind(line.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Line item", &line.id));
        }

        let totals = recompute_totals(&mut *tx, quote_id).await?;
        tx.commit().await?;

        Ok(totals)
    }

    /// Removes a line from a draft quote and returns the new quote totals.
    pub async fn delete(&self, quote_id: &str, line_id: &str) -> DbResult<QuoteTotals> {
        let mut tx = self.pool.begin().await?;
        ensure_draft(&mut *tx, quote_id).await?;

        let result = sqlx::query("DELETE FROM quote_line_items WHERE id = ?1 AND quote_id = ?2")
            .bind(line_id)
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Line item", line_id));
        }

        let totals = recompute_totals(&mut *tx, quote_id).await?;
        tx.commit().await?;

        info!(quote_id = %quote_id, line_id = %line_id, total = %totals.total, "Line removed");
        Ok(totals)
    }

    /// Gets one line of a quote.
    pub async fn get(&self, quote_id: &str, line_id: &str) -> DbResult<Option<QuoteLineItem>> {
        let snapshot: Option<String> = sqlx::query_scalar(
            "SELECT snapshot FROM quote_line_items WHERE id = ?1 AND quote_id = ?2",
        )
        .bind(line_id)
        .bind(quote_id)
        .fetch_optional(&self.pool)
        .await?;

        snapshot.map(|s| decode_snapshot(&s)).transpose()
    }
}

// =============================================================================
// Shared Transaction Helpers
// =============================================================================

/// Writes one line row at the given position.
pub(crate) async fn insert_line(
    conn: &mut SqliteConnection,
    quote_id: &str,
    position: i64,
    line: &QuoteLineItem,
) -> DbResult<()> {
    let line = priced(line);
    let snapshot = serde_json::to_string(line.as_ref())?;

    sqlx::query(
        r#"
        INSERT INTO quote_line_items (
            id, quote_id, position, product_id, product_name,
            quantity, unit_price, base_price, addons_total, line_total,
            snapshot, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13
        )
        "#,
    )
    .bind(&line.id)
    .bind(quote_id)
    .bind(position)
    .bind(&line.product.id)
    .bind(&line.product.name)
    .bind(line.quantity.to_string())
    .bind(line.unit_price.amount().to_string())
    .bind(line.base_price.amount().to_string())
    .bind(line.addons_total.amount().to_string())
    .bind(line.line_total.amount().to_string())
    .bind(snapshot)
    .bind(line.created_at)
    .bind(line.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Loads every line of a quote in position order.
pub(crate) async fn fetch_lines(
    conn: &mut SqliteConnection,
    quote_id: &str,
) -> DbResult<Vec<QuoteLineItem>> {
    let snapshots: Vec<String> = sqlx::query_scalar(
        "SELECT snapshot FROM quote_line_items WHERE quote_id = ?1 ORDER BY position",
    )
    .bind(quote_id)
    .fetch_all(&mut *conn)
    .await?;

    snapshots.iter().map(|s| decode_snapshot(s)).collect()
}

fn decode_snapshot(snapshot: &str) -> DbResult<QuoteLineItem> {
    let line: QuoteLineItem = serde_json::from_str(snapshot)?;
    if !line.is_consistent() {
        // Stored numbers are kept; the snapshot is what was quoted.
        warn!(line_id = %line.id, "Stored line totals differ from a fresh pricing of its snapshot");
    }
    Ok(line)
}

/// The line to persist, re-priced if its numbers drifted from its inputs.
fn priced(line: &QuoteLineItem) -> Cow<'_, QuoteLineItem> {
    if line.is_consistent() {
        Cow::Borrowed(line)
    } else {
        warn!(line_id = %line.id, "Line totals were stale; re-pricing before save");
        let mut fresh = line.clone();
        fresh.reprice();
        Cow::Owned(fresh)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
