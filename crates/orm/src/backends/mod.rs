//! Database executor boundary
//!
//! The core only requires "something that can execute SQL text with
//! positional arguments and return rows". `QueryExecutor` is that boundary;
//! `DatabaseRow` abstracts a result row so entity materialization does not
//! depend on a concrete driver. The PostgreSQL implementation lives in
//! `postgres`.

pub mod postgres;

pub use postgres::{PostgresExecutor, PostgresRow};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{OrmError, OrmResult};

/// Executes SQL text with positional `$n` arguments and returns rows.
///
/// Implemented by `PostgresExecutor` for production use and by the in-memory
/// `fake::FakeExecutor` for tests.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query and return the result rows
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Box<dyn DatabaseRow>>>;

    /// Execute a statement and return the affected row count
    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;
}

/// Abstract result row: an ordered list of named column values.
pub trait DatabaseRow: Send + Sync {
    /// Get a column value by index
    fn get_by_index(&self, index: usize) -> OrmResult<Value>;

    /// Get a column value by name
    fn get_by_name(&self, name: &str) -> OrmResult<Value>;

    /// Get column count
    fn column_count(&self) -> usize;

    /// Get column names, in result order
    fn column_names(&self) -> Vec<String>;
}

/// Extension trait for typed column access during entity materialization.
pub trait DatabaseRowExt {
    /// Get a typed value from a column
    fn get<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'de> serde::Deserialize<'de>;

    /// Get an optional typed value; a NULL or missing column is `None`
    fn try_get<T>(&self, column: &str) -> OrmResult<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>;
}

impl<R: DatabaseRow + ?Sized> DatabaseRowExt for R {
    fn get<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let value = self.get_by_name(column)?;
        serde_json::from_value(value).map_err(|e| {
            OrmError::Serialization(format!("Failed to deserialize column '{}': {}", column, e))
        })
    }

    fn try_get<T>(&self, column: &str) -> OrmResult<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.get_by_name(column) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => {
                let parsed: T = serde_json::from_value(value).map_err(|e| {
                    OrmError::Serialization(format!(
                        "Failed to deserialize column '{}': {}",
                        column, e
                    ))
                })?;
                Ok(Some(parsed))
            }
            Err(OrmError::ColumnNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeRow;
    use serde_json::json;

    #[test]
    fn typed_get_deserializes_column_values() {
        let row = FakeRow::new(vec![("id", json!(7)), ("name", json!("ada"))]);
        let id: i64 = row.get("id").unwrap();
        let name: String = row.get("name").unwrap();
        assert_eq!(id, 7);
        assert_eq!(name, "ada");
    }

    #[test]
    fn try_get_maps_null_and_missing_to_none() {
        let row = FakeRow::new(vec![("parent_id", json!(null))]);
        let null_column: Option<i64> = row.try_get("parent_id").unwrap();
        let missing_column: Option<i64> = row.try_get("nope").unwrap();
        assert_eq!(null_column, None);
        assert_eq!(missing_column, None);
    }

    #[test]
    fn get_on_missing_column_is_an_error() {
        let row = FakeRow::new(vec![("id", json!(1))]);
        let result: OrmResult<i64> = row.get("missing");
        assert!(matches!(result, Err(OrmError::ColumnNotFound(_))));
    }
}
