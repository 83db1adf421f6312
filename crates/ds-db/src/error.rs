//! Error types for ds-db

use thiserror::Error;

/// Warehouse error type
#[derive(Error, Debug)]
pub enum DbError {
    /// Failed to open or reach the warehouse
    #[error("Warehouse connection error: {0}")]
    Connection(String),

    /// A query failed
    #[error("Warehouse query error: {0}")]
    Query(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
