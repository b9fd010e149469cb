//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for data access,
//! allowing different storage backends to be swapped without changing
//! the callers.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Customer, Item, Review)
//! - `schema`: Table, column, and relationship metadata
//! - `repository`: Trait definitions for data access
//! - `sqlite`: SQLx-backed implementation

#![allow(async_fn_in_trait)]

mod error;
mod models;
mod repository;
pub mod schema;
mod sqlite;

#[cfg(test)]
mod models_test;

pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::*;
pub use sqlite::*;
