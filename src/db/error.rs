//! Database error types.
//!
//! This module provides abstracted error types for database operations.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//! The error types are storage-backend agnostic.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Entity not found: {entity_type} with id '{id}'")]
    #[diagnostic(code(reviewdb::db::not_found))]
    NotFound { entity_type: String, id: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(
        code(reviewdb::db::constraint),
        help("Referenced customers and items must exist before a review can point at them")
    )]
    Constraint { message: String },

    #[error("Cannot delete {entity_type} '{id}': {message}")]
    #[diagnostic(
        code(reviewdb::db::referential_integrity),
        help("Delete the reviews first or open the store with the cascade delete policy")
    )]
    ReferentialIntegrity {
        entity_type: String,
        id: String,
        message: String,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(reviewdb::db::validation_error))]
    Validation { message: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(reviewdb::db::database_error))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(reviewdb::db::migration_error))]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(reviewdb::db::connection_error))]
    Connection { message: String },
}

impl DbError {
    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
