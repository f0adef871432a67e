//! Error types for the toolkit
//!
//! A single crate-wide error enum: execution and materialization failures are
//! propagated unchanged, a zero-row `get` is the distinguished `NotFound`
//! condition, and the crate itself never retries, logs-and-swallows, or
//! partially applies an operation that failed.

use thiserror::Error;

/// Result type alias for all fallible operations in this crate
pub type OrmResult<T> = Result<T, OrmError>;

/// Error type for builder, executor, and preload operations
#[derive(Debug, Clone, Error)]
pub enum OrmError {
    /// Database connection or driver error
    #[error("Database error: {0}")]
    Database(String),
    /// Query execution failed
    #[error("Query error: {0}")]
    Query(String),
    /// A single-entity fetch matched zero rows
    #[error("Record not found in table '{0}'")]
    NotFound(String),
    /// Row-to-entity mapping failed
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Relationship lookup or assignment failed
    #[error("Relationship error: {0}")]
    Relationship(String),
    /// Connection pool error
    #[error("Connection error: {0}")]
    Connection(String),
    /// A result row has no column with the requested name
    #[error("Column '{0}' not found in result row")]
    ColumnNotFound(String),
    /// A query exceeded its configured deadline
    #[error("Query timed out after {0}ms")]
    Timeout(u64),
}

// Convert from sqlx errors
impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        OrmError::Database(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        OrmError::Serialization(err.to_string())
    }
}

// Convert from anyhow errors
impl From<anyhow::Error> for OrmError {
    fn from(err: anyhow::Error) -> Self {
        OrmError::Database(err.to_string())
    }
}
