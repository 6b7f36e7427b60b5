//! # Quote Repository
//!
//! Database operations for quotes.
//!
//! ## Quote Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quote Lifecycle                                   │
//! │                                                                         │
//! │  1. SAVE DRAFT                                                         │
//! │     └── insert() → quote row + line snapshots + totals (one tx)        │
//! │                                                                         │
//! │  2. EDIT LINES (draft only)                                            │
//! │     └── line_items().insert/update/delete()                            │
//! │     └── totals recomputed in the same transaction                      │
//! │                                                                         │
//! │  3. SEND                                                               │
//! │     └── set_status(Submitted)                                          │
//! │                                                                         │
//! │  4. CUSTOMER DECIDES                                                   │
//! │     └── set_status(Accepted | Declined)                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use estimo_core::pricing::{compute_quote_totals, QuoteTotals};
use estimo_core::{CoreError, Money, Quote, QuoteStatus, TaxRate, MAX_QUOTE_LINES};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::line_item::{fetch_lines, insert_line};
use super::{decimal_column, money_column};
use crate::error::{DbError, DbResult};

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct QuoteRow {
    id: String,
    customer_name: String,
    tax_rate: String,
    status: String,
    line_count: i64,
    subtotal: String,
    tax: String,
    total: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuoteRow {
    fn status(&self) -> DbResult<QuoteStatus> {
        self.status
            .parse()
            .map_err(|e| DbError::invalid("status", e))
    }

    fn tax_rate(&self) -> DbResult<TaxRate> {
        decimal_column("tax_rate", &self.tax_rate).map(TaxRate::from_percent)
    }
}

/// A quote header without its lines, for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSummary {
    pub id: String,
    pub customer_name: String,
    pub status: QuoteStatus,
    pub line_count: usize,
    pub tax_rate: TaxRate,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for QuoteSummary {
    type Error = DbError;

    fn try_from(row: QuoteRow) -> DbResult<Self> {
        Ok(QuoteSummary {
            status: row.status()?,
            tax_rate: row.tax_rate()?,
            line_count: usize::try_from(row.line_count).unwrap_or_default(),
            subtotal: money_column("subtotal", &row.subtotal)?,
            tax: money_column("tax", &row.tax)?,
            total: money_column("total", &row.total)?,
            id: row.id,
            customer_name: row.customer_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_QUOTE: &str = r#"
    SELECT id, customer_name, tax_rate, status, line_count,
           subtotal, tax, total, created_at, updated_at
    FROM quotes
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for quote database operations.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    /// Creates a new QuoteRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuoteRepository { pool }
    }

    /// Saves a quote with all of its lines.
    ///
    /// ## Snapshot Pattern
    /// Each line is stored with its full product snapshot. Editing the
    /// catalog afterwards never changes a saved quote.
    ///
    /// ## Returns
    /// - `Err(Core(QuoteTooLarge))` past [`MAX_QUOTE_LINES`], nothing written
    pub async fn insert(&self, quote: &Quote) -> DbResult<QuoteTotals> {
        debug!(id = %quote.id, lines = quote.lines.len(), "Inserting quote");

        if quote.lines.len() > MAX_QUOTE_LINES {
            return Err(CoreError::QuoteTooLarge {
                max: MAX_QUOTE_LINES,
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, customer_name, tax_rate, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&quote.id)
        .bind(&quote.customer_name)
        .bind(quote.tax_rate.percent().to_string())
        .bind(quote.status.as_str())
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in quote.lines.iter().enumerate() {
            insert_line(&mut *tx, &quote.id, position as i64, line).await?;
        }

        let totals = recompute_totals(&mut *tx, &quote.id).await?;
        tx.commit().await?;

        info!(id = %quote.id, total = %totals.total, "Quote saved");
        Ok(totals)
    }

    /// Gets a quote with its lines, in their saved order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Quote>> {
        let Some(row) = self.fetch_row(id).await? else {
            return Ok(None);
        };

        let mut conn = self.pool.acquire().await?;
        let lines = fetch_lines(&mut conn, id).await?;

        Ok(Some(Quote {
            status: row.status()?,
            tax_rate: row.tax_rate()?,
            id: row.id,
            customer_name: row.customer_name,
            lines,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    /// Gets the stored header and totals of a quote.
    pub async fn summary(&self, id: &str) -> DbResult<Option<QuoteSummary>> {
        self.fetch_row(id)
            .await?
            .map(QuoteSummary::try_from)
            .transpose()
    }

    /// Lists the most recently updated quotes.
    pub async fn list(&self, limit: i64) -> DbResult<Vec<QuoteSummary>> {
        let sql = format!("{} ORDER BY updated_at DESC LIMIT ?1", SELECT_QUOTE);
        let rows: Vec<QuoteRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(QuoteSummary::try_from).collect()
    }

    /// Moves a quote to a new status.
    ///
    /// ## Rules
    /// See [`QuoteStatus::can_transition_to`]. Setting the current status
    /// again is a no-op.
    pub async fn set_status(&self, id: &str, status: QuoteStatus) -> DbResult<QuoteSummary> {
        let mut tx = self.pool.begin().await?;

        let current = current_status(&mut *tx, id).await?;
        if current != status {
            if !current.can_transition_to(status) {
                return Err(DbError::InvalidTransition {
                    from: current,
                    to: status,
                });
            }

            sqlx::query("UPDATE quotes SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status.as_str())
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(id = %id, from = %current, to = %status, "Quote status updated");

        self.summary(id)
            .await?
            .ok_or_else(|| DbError::not_found("Quote", id))
    }

    /// Deletes a quote and (by cascade) its lines.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quote", id));
        }

        info!(id = %id, "Quote deleted");
        Ok(())
    }

    async fn fetch_row(&self, id: &str) -> DbResult<Option<QuoteRow>> {
        let sql = format!("{} WHERE id = ?1", SELECT_QUOTE);
        let row = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

// =============================================================================
// Shared Transaction Helpers
// =============================================================================

/// Reads a quote's status, failing if the quote does not exist.
pub(crate) async fn current_status(conn: &mut SqliteConnection, id: &str) -> DbResult<QuoteStatus> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM quotes WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    status
        .ok_or_else(|| DbError::not_found("Quote", id))?
        .parse()
        .map_err(|e| DbError::invalid("status", e))
}

/// Fails unless the quote exists and is still a draft.
pub(crate) async fn ensure_draft(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let status = current_status(conn, id).await?;
    if status != QuoteStatus::Draft {
        return Err(DbError::QuoteNotEditable {
            id: id.to_string(),
            status,
        });
    }
    Ok(())
}

/// Recomputes subtotal, tax and total from the stored line totals.
///
/// Tax is applied once to the subtotal, never per line.
pub(crate) async fn recompute_totals(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<QuoteTotals> {
    let tax_rate: Option<String> = sqlx::query_scalar("SELECT tax_rate FROM quotes WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let tax_rate = tax_rate.ok_or_else(|| DbError::not_found("Quote", id))?;
    let tax_rate = TaxRate::from_percent(decimal_column("tax_rate", &tax_rate)?);

    let line_totals: Vec<String> = sqlx::query_scalar(
        "SELECT line_total FROM quote_line_items WHERE quote_id = ?1 ORDER BY position",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let line_totals = line_totals
        .iter()
        .map(|t| money_column("line_total", t))
        .collect::<DbResult<Vec<Money>>>()?;

    let totals = compute_quote_totals(line_totals, tax_rate);

    sqlx::query(
        r#"
        UPDATE quotes SET
            line_count = ?2,
            subtotal = ?3,
            tax = ?4,
            total = ?5,
            updated_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(totals.line_count as i64)
    .bind(totals.subtotal.amount().to_string())
    .bind(totals.tax.amount().to_string())
    .bind(totals.total.amount().to_string())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    debug!(id = %id, lines = totals.line_count, subtotal = %totals.subtotal, "Quote totals recomputed");
    Ok(totals)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use estimo_core::{
        Addon, AddonPick, CalculationType, Measurement, Product, QuoteLineItem, Variation,
    };
    use rust_decimal_macros::dec;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn fence() -> Product {
        let mut product = Product::new("fence", "Privacy Fence", Money::from_major(28));
        product
            .variations
            .push(Variation::fixed("6ft", dec!(4)).with_height(dec!(6), "ft"));
        product.addons.push(Addon::new(
            "stain",
            CalculationType::AreaCalculation,
            Money::from_minor(50),
        ));
        product
    }

    fn sample_quote() -> Quote {
        let mut quote = Quote::new("Jordan Smith", TaxRate::from_bps(825));
        let fence_line = QuoteLineItem::build(
            &fence(),
            Measurement::linear(dec!(100)),
            Some("6ft"),
            &[AddonPick::new("stain")],
        )
        .unwrap();
        let sod = Product::new("sod", "Sod", Money::from_minor(80));
        let sod_line =
            QuoteLineItem::build(&sod, Measurement::area(dec!(500)), None, &[]).unwrap();
        quote.add_line(fence_line).unwrap();
        quote.add_line(sod_line).unwrap();
        quote
    }

    #[tokio::test]
    async fn test_insert_rejects_oversized_quote() {
        let db = test_db().await;
        let mut quote = Quote::new("Big Job", TaxRate::zero());
        let sod = Product::new("sod", "Sod", Money::from_minor(80));
        let line = QuoteLineItem::build(&sod, Measurement::area(dec!(10)), None, &[]).unwrap();
        // pushed directly, past the add_line guard
        for i in 0..=MAX_QUOTE_LINES {
            let mut next = line.clone();
            next.id = format!("line-{}", i);
            quote.lines.push(next);
        }

        let err = db.quotes().insert(&quote).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::QuoteTooLarge { max: MAX_QUOTE_LINES })
        ));
        assert!(db.quotes().get_by_id(&quote.id).await.unwrap().is_none());

        quote.lines.truncate(MAX_QUOTE_LINES);
        let totals = db.quotes().insert(&quote).await.unwrap();
        assert_eq!(totals.line_count, MAX_QUOTE_LINES);
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let quote = sample_quote();

        let totals = db.quotes().insert(&quote).await.unwrap();
        assert_eq!(totals, quote.totals());

        let stored = db.quotes().get_by_id(&quote.id).await.unwrap().unwrap();
        assert_eq!(stored.id, quote.id);
        assert_eq!(stored.customer_name, "Jordan Smith");
        assert_eq!(stored.tax_rate, quote.tax_rate);
        assert_eq!(stored.lines, quote.lines);
        assert_eq!(stored.totals(), quote.totals());
    }

    #[tokio::test]
    async fn test_get_missing_quote() {
        let db = test_db().await;
        assert!(db.quotes().get_by_id("missing").await.unwrap().is_none());
        assert!(db.quotes().summary("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_summary_stores_exact_totals() {
        let db = test_db().await;
        let quote = sample_quote();
        db.quotes().insert(&quote).await.unwrap();

        let summary = db.quotes().summary(&quote.id).await.unwrap().unwrap();
        // fence 3200 + stain 300 + sod 400
        assert_eq!(summary.subtotal, Money::from_major(3900));
        assert_eq!(summary.tax.amount(), dec!(321.75));
        assert_eq!(summary.total.amount(), dec!(4221.75));
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.status, QuoteStatus::Draft);
    }

    #[tokio::test]
    async fn test_saved_quote_survives_catalog_edit() {
        let db = test_db().await;
        let quote = sample_quote();
        db.quotes().insert(&quote).await.unwrap();

        // the catalog price changes after the quote was saved
        let mut edited = fence();
        edited.unit_price = Money::from_major(99);

        assert_ne!(edited.unit_price, quote.lines[0].product.unit_price);

        let mut stored = db.quotes().get_by_id(&quote.id).await.unwrap().unwrap();
        assert_eq!(stored.lines[0].product.unit_price, Money::from_major(28));
        for line in &mut stored.lines {
            line.reprice();
        }
        assert_eq!(stored.totals().subtotal, Money::from_major(3900));
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let db = test_db().await;
        let quote = sample_quote();
        db.quotes().insert(&quote).await.unwrap();
        let repo = db.quotes();

        let err = repo
            .set_status(&quote.id, QuoteStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidTransition { .. }));

        let summary = repo
            .set_status(&quote.id, QuoteStatus::Submitted)
            .await
            .unwrap();
        assert_eq!(summary.status, QuoteStatus::Submitted);

        let summary = repo
            .set_status(&quote.id, QuoteStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(summary.status, QuoteStatus::Accepted);

        assert!(matches!(
            repo.set_status("missing", QuoteStatus::Submitted).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let db = test_db().await;
        let first = sample_quote();
        let second = Quote::new("Avery Lee", TaxRate::zero());
        db.quotes().insert(&first).await.unwrap();
        db.quotes().insert(&second).await.unwrap();

        let listed = db.quotes().list(10).await.unwrap();
        assert_eq!(listed.len(), 2);

        db.quotes().delete(&first.id).await.unwrap();
        assert!(db.quotes().get_by_id(&first.id).await.unwrap().is_none());
        for line in &first.lines {
            assert!(db.line_items().get(&first.id, &line.id).await.unwrap().is_none());
        }
        assert!(matches!(
            db.quotes().delete(&first.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_quote_id() {
        let db = test_db().await;
        let quote = Quote::new("Dup", TaxRate::zero());
        db.quotes().insert(&quote).await.unwrap();
        assert!(matches!(
            db.quotes().insert(&quote).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }
}
