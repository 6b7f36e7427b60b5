//! # CLI Commands
//!
//! Each command takes its inputs plus the loaded configuration and returns
//! the text to print. Nothing in here prices anything itself.
//!
//! ## Available Commands
//!
//! | Command       | Module      | Database |
//! |---------------|-------------|----------|
//! | `price`       | [`quote`]   | no       |
//! | `save`        | [`quote`]   | yes      |
//! | `show`        | [`quote`]   | yes      |
//! | `list`        | [`quote`]   | yes      |
//! | `add-line`    | [`quote`]   | yes      |
//! | `update-line` | [`quote`]   | yes      |
//! | `remove-line` | [`quote`]   | yes      |
//! | `status`      | [`quote`]   | yes      |
//! | `delete`      | [`quote`]   | yes      |
//! | `validate`    | [`catalog`] | no       |

pub mod catalog;
pub mod quote;

use estimo_db::Database;

use crate::args::Command;
use crate::config::AppConfig;
use crate::error::CliResult;

/// Runs one command.
///
/// `db` must be `Some` for every command where
/// [`Command::uses_database`] is true.
pub async fn dispatch(
    command: Command,
    config: &AppConfig,
    db: Option<&Database>,
) -> CliResult<String> {
    match command {
        Command::Price { file, json } => quote::price(&file, json, config),
        Command::Validate { file } => catalog::validate(&file),
        Command::Save { file, json } => quote::save(require(db)?, &file, json, config).await,
        Command::Show { quote_id, json } => {
            quote::show(require(db)?, &quote_id, json, config).await
        }
        Command::List { limit } => quote::list(require(db)?, limit, config).await,
        Command::AddLine {
            quote_id,
            file,
            json,
        } => quote::add_line(require(db)?, &quote_id, &file, json, config).await,
        Command::UpdateLine {
            quote_id,
            line_id,
            file,
            json,
        } => quote::update_line(require(db)?, &quote_id, &line_id, &file, json, config).await,
        Command::RemoveLine { quote_id, line_id } => {
            quote::remove_line(require(db)?, &quote_id, &line_id, config).await
        }
        Command::Status { quote_id, status } => {
            quote::set_status(require(db)?, &quote_id, status).await
        }
        Command::Delete { quote_id } => quote::delete(require(db)?, &quote_id).await,
    }
}

fn require(db: Option<&Database>) -> CliResult<&Database> {
    db.ok_or_else(|| {
        estimo_db::DbError::ConnectionFailed("no database opened for this command".into()).into()
    })
}
