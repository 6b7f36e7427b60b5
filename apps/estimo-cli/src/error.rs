//! # CLI Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Estimo                                 │
//! │                                                                         │
//! │  estimo save quote.json                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  CliResult<T>                                                    │  │
//! │  │         │                                                        │  │
//! │  │  Bad file / JSON? ──── io / serde_json ───────┐                  │  │
//! │  │  Bad selection?   ──── ValidationError ───────┤                  │  │
//! │  │  Unknown add-on?  ──── CoreError ─────────────┼──► CliError      │  │
//! │  │  Storage problem? ──── DbError ───────────────┘        │         │  │
//! │  └────────────────────────────────────────────────────────┼─────────┘  │
//! │                                                           ▼            │
//! │                                        "error: ..." on stderr          │
//! │                                        process exit code               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exit Codes
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 0    | Success                                   |
//! | 1    | Internal error                            |
//! | 2    | Usage error (reported by clap)            |
//! | 3    | Invalid input (file, JSON, selection)     |
//! | 4    | Quote or line not found                   |
//! | 5    | Quote state does not allow the change     |
//! | 6    | Database error                            |
//! | 7    | Configuration error                       |

use std::path::PathBuf;

use estimo_core::{CoreError, ValidationError};
use estimo_db::DbError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the `estimo` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is not the expected JSON shape.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A line, product or tax rate failed validation.
    #[error("{context}: {source}")]
    Invalid {
        context: String,
        #[source]
        source: ValidationError,
    },

    /// Building a line failed (unknown variation, add-on or option).
    #[error("{context}: {source}")]
    Core {
        context: String,
        #[source]
        source: CoreError,
    },

    /// One or more catalog products failed validation.
    #[error("{failed} of {total} products failed validation")]
    CatalogInvalid { failed: usize, total: usize },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing output failed.
    #[error("Output failed: {0}")]
    Output(String),
}

impl CliError {
    /// Wraps a validation error with the input it came from.
    pub fn invalid(context: impl Into<String>, source: ValidationError) -> Self {
        CliError::Invalid {
            context: context.into(),
            source,
        }
    }

    /// Wraps a core error with the input it came from.
    pub fn core(context: impl Into<String>, source: CoreError) -> Self {
        match source {
            CoreError::Validation(source) => CliError::invalid(context, source),
            source => CliError::Core {
                context: context.into(),
                source,
            },
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Read { .. }
            | CliError::Json { .. }
            | CliError::Invalid { .. }
            | CliError::Core { .. }
            | CliError::CatalogInvalid { .. } => 3,
            CliError::Db(err) => match err {
                DbError::NotFound { .. } => 4,
                DbError::QuoteNotEditable { .. } | DbError::InvalidTransition { .. } => 5,
                DbError::Core(_) => 3,
                _ => 6,
            },
            CliError::Config(_) => 7,
            CliError::Output(_) => 1,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Output(err.to_string())
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
