//! # Text Reports
//!
//! Plain-text rendering of quotes for the terminal. Every amount goes
//! through the configured [`CurrencyFormat`]; nothing here rounds on its own.
//!
//! ```text
//! Quote 1f0c…  Jordan Smith  [draft]
//!
//!   #  Line                                  Qty         Unit        Total
//!   1  Privacy Fence (6ft)              100 linear ft   $32.00    $3,500.00
//!        + stain  600 sq ft × $0.50                                 $300.00
//!
//!                                                  Subtotal     $3,500.00
//!                                                  Tax 8.25%      $288.75
//!                                                  Total        $3,788.75
//! ```

use std::fmt::Write;

use estimo_core::pricing::QuoteTotals;
use estimo_core::{
    AddonCharge, ChargeBasis, CurrencyFormat, Quote, QuoteLineItem, QuoteStatus,
};
use estimo_db::QuoteSummary;

/// Renders a full quote with its lines and totals.
pub fn render_quote(quote: &Quote, format: &CurrencyFormat) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Quote {}  {}  [{}]",
        quote.id,
        display_customer(&quote.customer_name),
        quote.status
    );
    out.push('\n');

    if quote.lines.is_empty() {
        out.push_str("  (no lines)\n");
    } else {
        let _ = writeln!(
            out,
            "  {:>3}  {:<36} {:>18} {:>12} {:>14}",
            "#", "Line", "Qty", "Unit", "Total"
        );
        for (index, line) in quote.lines.iter().enumerate() {
            render_line(&mut out, index + 1, line, format);
        }
    }

    out.push('\n');
    render_totals(&mut out, &quote.totals(), format);
    out
}

/// Renders stored totals after a save or an edit.
pub fn render_totals_only(quote_id: &str, totals: &QuoteTotals, format: &CurrencyFormat) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quote {}  ({} lines)", quote_id, totals.line_count);
    render_totals(&mut out, totals, format);
    out
}

/// One row per quote, newest first.
pub fn render_summaries(summaries: &[QuoteSummary], format: &CurrencyFormat) -> String {
    if summaries.is_empty() {
        return "No quotes saved.\n".to_string();
    }

    let mut out = String::new();
    for summary in summaries {
        let _ = writeln!(
            out,
            "{}  {:<10} {:<24} {:>3} lines  {:>14}  {}",
            summary.id,
            summary.status,
            display_customer(&summary.customer_name),
            summary.line_count,
            format.format(summary.total),
            summary.updated_at.format("%Y-%m-%d %H:%M"),
        );
    }
    out
}

/// Confirms a status change.
pub fn render_status(summary: &QuoteSummary) -> String {
    let hint = match summary.status {
        QuoteStatus::Draft => "lines can be edited",
        QuoteStatus::Submitted => "awaiting customer decision",
        QuoteStatus::Accepted => "accepted by customer",
        QuoteStatus::Declined => "declined; move back to draft to revise",
    };
    format!("Quote {} is now {} ({})\n", summary.id, summary.status, hint)
}

fn render_line(out: &mut String, number: usize, line: &QuoteLineItem, format: &CurrencyFormat) {
    let mut name = if line.product.name.is_empty() {
        line.product.id.clone()
    } else {
        line.product.name.clone()
    };
    if let Some(variation) = &line.variation {
        let label = if variation.name.is_empty() {
            &variation.id
        } else {
            &variation.name
        };
        let _ = write!(name, " ({})", label);
    }

    let quantity = format!(
        "{} {}",
        CurrencyFormat::format_quantity(line.quantity),
        line.product.unit_type.label()
    );

    let _ = writeln!(
        out,
        "  {:>3}  {:<36} {:>18} {:>12} {:>14}",
        number,
        name,
        quantity,
        format.format(line.unit_price),
        format.format(line.line_total)
    );

    if let Some(lots) = &line.increments_applied {
        let _ = writeln!(
            out,
            "         {} × {} of {}",
            CurrencyFormat::format_quantity(lots.units_needed),
            lots.increment_label,
            CurrencyFormat::format_quantity(lots.increment_size)
        );
    }

    for charge in &line.addon_charges {
        let _ = writeln!(
            out,
            "         + {:<50} {:>14}",
            describe_charge(charge, format),
            format.format(charge.amount)
        );
    }
}

fn describe_charge(charge: &AddonCharge, format: &CurrencyFormat) -> String {
    let name = if charge.name.is_empty() {
        &charge.addon_id
    } else {
        &charge.name
    };
    let price = format.format(charge.unit_price);
    let basis = match &charge.basis {
        ChargeBasis::Flat => price,
        ChargeBasis::PerUnit { quantity } | ChargeBasis::AreaFallback { quantity } => {
            format!("{} × {}", CurrencyFormat::format_quantity(*quantity), price)
        }
        ChargeBasis::DerivedArea { square_feet } => format!(
            "{} sq ft × {}",
            CurrencyFormat::format_quantity(*square_feet),
            price
        ),
    };
    if charge.multiplier == rust_decimal::Decimal::ONE {
        format!("{}  {}", name, basis)
    } else {
        format!(
            "{}  {} (×{})",
            name,
            basis,
            CurrencyFormat::format_quantity(charge.multiplier)
        )
    }
}

fn render_totals(out: &mut String, totals: &QuoteTotals, format: &CurrencyFormat) {
    let _ = writeln!(out, "{:>60} {:>14}", "Subtotal", format.format(totals.subtotal));
    let _ = writeln!(
        out,
        "{:>60} {:>14}",
        format!("Tax {}%", totals.tax_rate.percent().normalize()),
        format.format(totals.tax)
    );
    let _ = writeln!(out, "{:>60} {:>14}", "Total", format.format(totals.total));
}

fn display_customer(name: &str) -> &str {
    if name.trim().is_empty() {
        "(no customer)"
    } else {
        name
    }
}
