//! Store error types.

use thiserror::Error;

/// Errors returned by entry store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entry {id} not found")]
    NotFound { id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
