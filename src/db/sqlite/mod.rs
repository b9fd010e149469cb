//! SQLite implementation of the database traits.
//!
//! This module provides a SQLite-backed implementation of the repository
//! traits defined in the parent module.

mod connection;
mod customer;
mod helpers;
mod item;
mod review;


pub use connection::SqliteDatabase;
pub use customer::SqliteCustomerRepository;
pub use item::SqliteItemRepository;
pub use review::SqliteReviewRepository;
