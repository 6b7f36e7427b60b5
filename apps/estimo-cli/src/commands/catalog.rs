//! # Catalog Command
//!
//! `estimo validate <catalog.json>` runs the product-save checks over a
//! catalog export (a JSON array of products) and reports every failure,
//! not just the first.

use std::fmt::Write;
use std::path::Path;

use estimo_core::validation::validate_product;
use estimo_core::Product;
use tracing::warn;

use crate::error::{CliError, CliResult};
use crate::request::read_json;

/// Outcome of checking one catalog.
#[derive(Debug)]
pub struct CatalogReport {
    pub text: String,
    pub total: usize,
    pub failed: usize,
}

/// Checks every product in a catalog.
pub fn check_catalog(products: &[Product]) -> CatalogReport {
    let mut text = String::new();
    let mut failed = 0;

    for product in products {
        match validate_product(product) {
            Ok(()) => {
                let _ = writeln!(text, "ok    {}", product.id);
            }
            Err(e) => {
                failed += 1;
                warn!(product_id = %product.id, error = %e, "Product failed validation");
                let _ = writeln!(text, "FAIL  {}: {}", product.id, e);
            }
        }
    }

    let _ = writeln!(
        text,
        "\n{} products checked, {} failed",
        products.len(),
        failed
    );

    CatalogReport {
        text,
        total: products.len(),
        failed,
    }
}

/// Validates a catalog file.
///
/// ## Returns
/// - `Ok(report)` when every product passes
/// - `Err(CatalogInvalid)` otherwise; the per-product report is printed
///   to stdout first
pub fn validate(file: &Path) -> CliResult<String> {
    let products: Vec<Product> = read_json(file)?;
    let report = check_catalog(&products);

    if report.failed > 0 {
        print!("{}", report.text);
        return Err(CliError::CatalogInvalid {
            failed: report.failed,
            total: report.total,
        });
    }

    Ok(report.text)
}
