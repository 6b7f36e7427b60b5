//! # Input Files
//!
//! JSON shapes the CLI reads: quote requests and product catalogs.
//!
//! ## Quote Request
//! ```json
//! {
//!   "customerName": "Jordan Smith",
//!   "taxRate": "8.25",
//!   "lines": [
//!     {
//!       "product": { "id": "fence", "unitPrice": 28, "variations": [...], "addons": [...] },
//!       "measurement": { "type": "linear", "value": 100 },
//!       "variationId": "6ft",
//!       "addons": [{ "addonId": "stain" }, { "addonId": "gate", "quantity": 2 }]
//!     }
//!   ]
//! }
//! ```
//!
//! Each line carries the catalog product as it is at quote time; the built
//! line keeps that copy as its snapshot.
//!
//! ## Line Edit
//! ```json
//! { "measurement": { "type": "linear", "value": 120 }, "variationId": "4ft" }
//! ```
//! Fields left out keep their saved value. Edits resolve against the line's
//! product snapshot, not the current catalog.

use std::path::Path;

use estimo_core::validation::{validate_line_selection, validate_tax_rate};
use estimo_core::{AddonPick, Measurement, Product, Quote, QuoteLineItem, TaxRate};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// A quote to price or save.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub customer_name: String,

    /// Percent; the configured default applies when missing.
    #[serde(default, deserialize_with = "estimo_core::numeric::lenient_decimal")]
    pub tax_rate: Option<Decimal>,

    #[serde(default)]
    pub lines: Vec<LineRequest>,
}

/// One product selection on a quote request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product: Product,
    pub measurement: Measurement,

    #[serde(default)]
    pub variation_id: Option<String>,

    #[serde(default)]
    pub addons: Vec<AddonPick>,
}

impl QuoteRequest {
    /// Validates every selection and builds a priced draft quote.
    ///
    /// ## Errors
    /// The first failing line is reported with its 1-based position and
    /// product id.
    pub fn into_quote(self, default_tax_rate: TaxRate) -> CliResult<Quote> {
        let tax_rate = self
            .tax_rate
            .map(TaxRate::from_percent)
            .unwrap_or(default_tax_rate);
        validate_tax_rate(tax_rate).map_err(|e| CliError::invalid("quote", e))?;

        let mut quote = Quote::new(self.customer_name, tax_rate);
        for (index, line) in self.lines.iter().enumerate() {
            let context = format!("line {} ({})", index + 1, line.product.id);
            quote
                .add_line(line.build(&context)?)
                .map_err(|e| CliError::core(&context, e))?;
        }

        debug!(lines = quote.lines.len(), "Quote request priced");
        Ok(quote)
    }
}

impl LineRequest {
    /// Checks the selection, then builds the priced line.
    ///
    /// `context` names the line in error messages.
    pub fn build(&self, context: &str) -> CliResult<QuoteLineItem> {
        let variation_id = self.variation_id.as_deref();

        validate_line_selection(&self.product, &self.measurement, variation_id)
            .map_err(|e| CliError::invalid(context, e))?;

        QuoteLineItem::build(
            &self.product,
            self.measurement.clone(),
            variation_id,
            &self.addons,
        )
        .map_err(|e| CliError::core(context, e))
    }
}

/// Changes to a saved line. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEdit {
    #[serde(default)]
    pub measurement: Option<Measurement>,

    #[serde(default)]
    pub variation_id: Option<String>,

    /// Replaces every add-on selection when present.
    #[serde(default)]
    pub addons: Option<Vec<AddonPick>>,
}

impl LineEdit {
    /// Applies the edit to `line`, re-pricing it, then re-checks the
    /// selection against the line's product snapshot.
    pub fn apply(&self, line: &mut QuoteLineItem, context: &str) -> CliResult<()> {
        if let Some(measurement) = &self.measurement {
            line.update_measurement(measurement.clone());
        }
        if let Some(variation_id) = &self.variation_id {
            line.update_variation(Some(variation_id))
                .map_err(|e| CliError::core(context, e))?;
        }
        if let Some(picks) = &self.addons {
            line.update_addons(picks)
                .map_err(|e| CliError::core(context, e))?;
        }

        let variation_id = line.variation.as_ref().map(|v| v.id.as_str());
        validate_line_selection(&line.product, &line.measurement, variation_id)
            .map_err(|e| CliError::invalid(context, e))
    }
}

/// Reads and parses a JSON input file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}
