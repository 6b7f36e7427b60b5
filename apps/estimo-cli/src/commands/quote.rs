//! # Quote Commands
//!
//! Pricing, saving and editing quotes.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Quoting a Job                                     │
//! │                                                                         │
//! │  1. estimo price job.json          ← try measurements, no save         │
//! │  2. estimo save job.json           ← draft stored, id printed          │
//! │  3. estimo add-line <id> line.json ← another product on the job       │
//! │  4. estimo update-line <id> <line> edit.json                           │
//! │                                    ← redrawn area, line re-priced      │
//! │  5. estimo remove-line <id> <line> ← drop a line, totals recomputed    │
//! │  6. estimo status <id> submitted   ← sent to the customer              │
//! │  7. estimo status <id> accepted    ← customer signed                   │
//! │     estimo delete <id>             ← or drop an abandoned quote        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use estimo_core::pricing::QuoteTotals;
use estimo_core::{Quote, QuoteStatus};
use estimo_db::{Database, DbError};
use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::error::CliResult;
use crate::report;
use crate::request::{read_json, LineEdit, LineRequest, QuoteRequest};

/// JSON output: the quote plus its totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput<'a> {
    #[serde(flatten)]
    quote: &'a Quote,
    totals: QuoteTotals,
}

fn render(quote: &Quote, json: bool, config: &AppConfig) -> CliResult<String> {
    if json {
        let output = QuoteOutput {
            quote,
            totals: quote.totals(),
        };
        Ok(format!("{}\n", serde_json::to_string_pretty(&output)?))
    } else {
        Ok(report::render_quote(quote, &config.currency_format()))
    }
}

/// Prices a quote request without saving it.
pub fn price(file: &Path, json: bool, config: &AppConfig) -> CliResult<String> {
    let request: QuoteRequest = read_json(file)?;
    let quote = request.into_quote(config.default_tax_rate())?;
    render(&quote, json, config)
}

/// Prices a quote request and saves it as a draft.
pub async fn save(db: &Database, file: &Path, json: bool, config: &AppConfig) -> CliResult<String> {
    let request: QuoteRequest = read_json(file)?;
    let quote = request.into_quote(config.default_tax_rate())?;

    let totals = db.quotes().insert(&quote).await?;
    info!(id = %quote.id, lines = totals.line_count, "Quote saved as draft");

    render(&quote, json, config)
}

/// Prints a saved quote.
pub async fn show(
    db: &Database,
    quote_id: &str,
    json: bool,
    config: &AppConfig,
) -> CliResult<String> {
    render(&load_quote(db, quote_id).await?, json, config)
}

/// Lists recently updated quotes.
pub async fn list(db: &Database, limit: i64, config: &AppConfig) -> CliResult<String> {
    let summaries = db.quotes().list(limit).await?;
    Ok(report::render_summaries(&summaries, &config.currency_format()))
}

async fn load_quote(db: &Database, quote_id: &str) -> CliResult<Quote> {
    Ok(db
        .quotes()
        .get_by_id(quote_id)
        .await?
        .ok_or_else(|| DbError::not_found("Quote", quote_id))?)
}

/// Prices a line request and appends it to a draft quote.
pub async fn add_line(
    db: &Database,
    quote_id: &str,
    file: &Path,
    json: bool,
    config: &AppConfig,
) -> CliResult<String> {
    let request: LineRequest = read_json(file)?;
    let line = request.build(&format!("line ({})", request.product.id))?;

    let totals = db.line_items().insert(quote_id, &line).await?;
    info!(quote_id = %quote_id, line_id = %line.id, total = %totals.total, "Line added");

    render(&load_quote(db, quote_id).await?, json, config)
}

/// Applies a line edit to a saved line and re-prices it.
pub async fn update_line(
    db: &Database,
    quote_id: &str,
    line_id: &str,
    file: &Path,
    json: bool,
    config: &AppConfig,
) -> CliResult<String> {
    let edit: LineEdit = read_json(file)?;
    let mut line = db
        .line_items()
        .get(quote_id, line_id)
        .await?
        .ok_or_else(|| DbError::not_found("Line item", line_id))?;

    edit.apply(&mut line, &format!("line {}", line_id))?;
    let totals = db.line_items().update(quote_id, &line).await?;
    info!(quote_id = %quote_id, line_id = %line_id, total = %totals.total, "Line updated");

    render(&load_quote(db, quote_id).await?, json, config)
}

/// Removes a line from a draft quote.
pub async fn remove_line(
    db: &Database,
    quote_id: &str,
    line_id: &str,
    config: &AppConfig,
) -> CliResult<String> {
    let totals = db.line_items().delete(quote_id, line_id).await?;
    Ok(report::render_totals_only(
        quote_id,
        &totals,
        &config.currency_format(),
    ))
}

/// Deletes a quote and its lines.
pub async fn delete(db: &Database, quote_id: &str) -> CliResult<String> {
    db.quotes().delete(quote_id).await?;
    Ok(format!("Deleted quote {}\n", quote_id))
}

/// Moves a quote to a new status.
pub async fn set_status(db: &Database, quote_id: &str, status: QuoteStatus) -> CliResult<String> {
    let summary = db.quotes().set_status(quote_id, status).await?;
    Ok(report::render_status(&summary))
}
