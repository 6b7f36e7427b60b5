//! # Schema Migrations
//!
//! The quote schema ships inside the binary; opening a database brings it
//! up to date before any repository touches it.
//!
//! ```text
//!   Database::new
//!        │
//!        ▼
//!   versions already in _sqlx_migrations   (none on a fresh file)
//!        │
//!        ▼
//!   MIGRATOR.run ──► 001_initial_schema   quotes + quote_line_items
//!        │
//!        ▼
//!   SchemaReport { newly_applied, total }  ──► logged by the pool
//! ```
//!
//! New schema changes go in `migrations/sqlite/NNN_description.sql`.
//! Applied files are never edited; sqlx checks their checksums.

use std::collections::HashSet;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// What a migration run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    /// `NNN_description` of each migration applied by this run, in order.
    pub newly_applied: Vec<String>,

    /// Migrations embedded in the binary.
    pub total: usize,
}

impl SchemaReport {
    /// True when the database was already current.
    pub fn was_current(&self) -> bool {
        self.newly_applied.is_empty()
    }
}

/// Applies every pending migration and reports which ones ran.
pub async fn migrate(pool: &SqlitePool) -> DbResult<SchemaReport> {
    let before = applied_versions(pool).await?;

    MIGRATOR.run(pool).await?;

    let newly_applied: Vec<String> = MIGRATOR
        .iter()
        .filter(|m| !before.contains(&m.version))
        .map(|m| format!("{:03}_{}", m.version, m.description.replace(' ', "_")))
        .collect();

    for name in &newly_applied {
        info!(migration = %name, "Applied schema migration");
    }
    debug!(total = MIGRATOR.migrations.len(), "Schema is current");

    Ok(SchemaReport {
        newly_applied,
        total: MIGRATOR.migrations.len(),
    })
}

async fn applied_versions(pool: &SqlitePool) -> DbResult<HashSet<i64>> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok(HashSet::new());
    }

    let versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?;
    Ok(versions.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_fresh_database_gets_full_schema() {
        // one connection: every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let report = migrate(&pool).await.unwrap();
        assert!(report.total >= 1);
        assert_eq!(report.newly_applied.len(), report.total);
        assert_eq!(report.newly_applied[0], "001_initial_schema");

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('quotes', 'quote_line_items')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 2);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let report = db.migrate().await.unwrap();
        assert!(report.was_current());
    }
}
