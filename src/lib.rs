pub mod config;
pub mod db;
pub mod serialize;

#[cfg(feature = "cli")]
pub mod cli;
