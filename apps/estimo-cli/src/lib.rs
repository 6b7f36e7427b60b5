//! # estimo-cli: Command-Line Front End
//!
//! Thin orchestration over `estimo-core` (pricing) and `estimo-db` (storage).
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        estimo <command>                                 │
//! │                                                                         │
//! │  1. Parse arguments        args.rs    (clap; usage errors exit 2)      │
//! │  2. Initialize tracing     stderr, RUST_LOG or --verbose               │
//! │  3. Load configuration     config.rs  (estimo.toml + ESTIMO_*)         │
//! │  4. Open database          only for commands that store quotes         │
//! │  5. Dispatch               commands/  → text on stdout                 │
//! │  6. Close database                                                     │
//! │                                                                         │
//! │  Any error → "error: ..." on stderr + CliError::exit_code()            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod request;

use clap::Parser;
use estimo_db::Database;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use args::CliArgs;
use config::AppConfig;
use error::CliResult;

/// Runs the CLI and returns the process exit code.
pub async fn run() -> i32 {
    let cli = match CliArgs::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too, with exit code 0
            let _ = e.print();
            return e.exit_code();
        }
    };

    init_tracing(cli.verbose);

    match execute(cli).await {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            error!(error = %e, code = e.exit_code(), "Command failed");
            eprintln!("error: {}", e);
            e.exit_code()
        }
    }
}

/// Loads configuration, opens the database if needed, runs the command.
pub async fn execute(cli: CliArgs) -> CliResult<String> {
    let mut config = AppConfig::load(cli.config_path.as_deref())?;
    if let Some(path) = cli.db_path {
        config.database.path = Some(path);
    }

    if !cli.command.uses_database() {
        return commands::dispatch(cli.command, &config, None).await;
    }

    let db_config = config.db_config()?;
    debug!(path = ?db_config.database_path, "Opening quote database");
    let db = Database::new(db_config).await?;

    let result = commands::dispatch(cli.command, &config, Some(&db)).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG` always wins when set
/// - `--verbose`: `info,estimo=debug,sqlx=warn`
/// - Default: warnings only, so stdout stays clean for piping
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,estimo=debug,sqlx=warn"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
