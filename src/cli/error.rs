use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(reviewdb::cli::json))]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {message}")]
    #[diagnostic(
        code(reviewdb::cli::invalid_argument),
        help("Run the command with --help to see the accepted arguments.")
    )]
    InvalidArgument { message: String },

    #[error("Failed to prepare database directory: {0}")]
    #[diagnostic(code(reviewdb::cli::io))]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
