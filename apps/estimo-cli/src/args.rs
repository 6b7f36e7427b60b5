//! # Argument Parsing
//!
//! `estimo [OPTIONS] <COMMAND> [ARGS]`, declared with clap derive.
//!
//! Global options (`--config`, `--db`, `--verbose`) may appear before or
//! after the subcommand. Usage errors exit with code 2; `--help` and
//! `--version` exit with 0.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use estimo_core::QuoteStatus;

const DEFAULT_LIST_LIMIT: i64 = 20;

/// Global options plus the command to run.
#[derive(Debug, Parser)]
#[command(name = "estimo")]
#[command(about = "Contractor quoting and pricing engine")]
#[command(version)]
pub struct CliArgs {
    /// Config file (default: platform config dir/estimo.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    /// Database file (overrides config and ESTIMO_DB_PATH)
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,

    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// A parsed subcommand.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Price a quote request and print it
    Price {
        /// Quote request JSON
        file: PathBuf,

        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },

    /// Price a quote request and save it as a draft
    Save {
        /// Quote request JSON
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Print a saved quote
    Show {
        quote_id: String,

        #[arg(long)]
        json: bool,
    },

    /// List recently updated quotes
    List {
        /// Rows to show
        #[arg(
            short = 'n',
            long,
            default_value_t = DEFAULT_LIST_LIMIT,
            value_parser = clap::value_parser!(i64).range(1..)
        )]
        limit: i64,
    },

    /// Add a line to a draft quote
    AddLine {
        quote_id: String,

        /// Line request JSON (product, measurement, variationId, addons)
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Change a line's measurement, variation or add-ons and re-price it
    UpdateLine {
        quote_id: String,
        line_id: String,

        /// Line edit JSON (any of measurement, variationId, addons)
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Remove a line from a draft quote
    RemoveLine { quote_id: String, line_id: String },

    /// Set status: draft, submitted, accepted, declined
    Status {
        quote_id: String,

        #[arg(value_parser = parse_status)]
        status: QuoteStatus,
    },

    /// Delete a quote and its lines
    Delete { quote_id: String },

    /// Check a product catalog
    Validate {
        /// Catalog JSON (array of products)
        file: PathBuf,
    },
}

impl Command {
    /// True when the command needs the quote database.
    pub fn uses_database(&self) -> bool {
        !matches!(self, Command::Price { .. } | Command::Validate { .. })
    }
}

fn parse_status(value: &str) -> Result<QuoteStatus, String> {
    QuoteStatus::from_str(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("estimo").chain(args.iter().copied()))
    }

    fn run(args: &[&str]) -> CliArgs {
        parse(args).unwrap()
    }

    #[test]
    fn test_price_with_json() {
        let cli = run(&["price", "quote.json", "--json"]);
        assert_eq!(
            cli.command,
            Command::Price {
                file: PathBuf::from("quote.json"),
                json: true
            }
        );
        assert!(!cli.command.uses_database());
    }

    #[test]
    fn test_global_options() {
        let cli = run(&["--db", "/tmp/q.db", "show", "q-1"]);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/q.db")));
        assert!(cli.command.uses_database());

        let cli = run(&["list", "--config=/etc/estimo.toml", "-v", "--limit", "5"]);
        assert_eq!(cli.config_path, Some(PathBuf::from("/etc/estimo.toml")));
        assert!(cli.verbose);
        assert_eq!(cli.command, Command::List { limit: 5 });

        assert_eq!(run(&["list"]).command, Command::List { limit: 20 });
    }

    #[test]
    fn test_status_parsing() {
        let cli = run(&["status", "q-1", "submitted"]);
        assert_eq!(
            cli.command,
            Command::Status {
                quote_id: "q-1".into(),
                status: QuoteStatus::Submitted
            }
        );

        let err = parse(&["status", "q-1", "shipped"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_line_commands() {
        assert_eq!(
            run(&["remove-line", "q-1", "l-2"]).command,
            Command::RemoveLine {
                quote_id: "q-1".into(),
                line_id: "l-2".into()
            }
        );
        assert_eq!(
            run(&["delete", "q-1"]).command,
            Command::Delete {
                quote_id: "q-1".into()
            }
        );
        assert!(run(&["delete", "q-1"]).command.uses_database());
        assert_eq!(
            run(&["add-line", "q-1", "line.json"]).command,
            Command::AddLine {
                quote_id: "q-1".into(),
                file: PathBuf::from("line.json"),
                json: false
            }
        );
        assert_eq!(
            run(&["update-line", "q-1", "l-2", "edit.json", "--json"]).command,
            Command::UpdateLine {
                quote_id: "q-1".into(),
                line_id: "l-2".into(),
                file: PathBuf::from("edit.json"),
                json: true
            }
        );
    }

    #[test]
    fn test_help_and_version_exit_zero() {
        let help = parse(&["--help"]).unwrap_err();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        assert_eq!(help.exit_code(), 0);
        assert!(help.to_string().contains("remove-line"));

        let version = parse(&["--version"]).unwrap_err();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
        assert_eq!(version.exit_code(), 0);
    }

    #[test]
    fn test_usage_errors_exit_two() {
        for args in [
            &["frobnicate"][..],
            &["price"],
            &["show", "a", "b"],
            &["--bogus", "list"],
            &["list", "--limit", "0"],
            &["list", "--db"],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(err.exit_code(), 2, "args: {:?}", args);
        }
    }
}
