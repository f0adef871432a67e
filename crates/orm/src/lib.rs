//! # trellis-orm: SQL builder and eager loading for PostgreSQL
//!
//! Typed SELECT/INSERT/UPDATE builders over an immutable expression tree,
//! rendered in a single pass to `$n`-parameterized SQL plus a positional
//! argument list, and a preload engine that populates relations on a batch of
//! already-loaded entities in a bounded number of queries (no N+1).
//!
//! The crate talks to the database only through the `QueryExecutor` boundary;
//! `PostgresExecutor` implements it on top of sqlx.

pub mod backends;
pub mod error;
pub mod expr;
pub mod fake;
pub mod loading;
pub mod model;
pub mod statement;

// Re-export core traits and types
pub use backends::*;
pub use error::*;
pub use expr::*;
pub use loading::*;
pub use model::*;
pub use statement::*;
