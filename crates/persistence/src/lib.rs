//! Persistence layer for the weather dashboard.
//!
//! This crate contains:
//! - SQLite connection management and migrations
//! - Entity definitions (database row mappings)
//! - The `EntryStore` abstraction with in-memory and SQLite variants

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;

pub use error::StoreError;
