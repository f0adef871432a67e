//! In-memory test doubles for the executor boundary
//!
//! `FakeExecutor` serves rows from configured tables and records every
//! statement it is given, so tests can assert on query counts and bind lists
//! without a database. Row filtering assumes the batched-lookup shape the
//! toolkit itself generates: a row is returned when its key column value
//! appears in the bind list.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::backends::{DatabaseRow, QueryExecutor};
use crate::error::{OrmError, OrmResult};

/// A result row backed by an ordered column/value list.
#[derive(Debug, Clone, Default)]
pub struct FakeRow {
    values: Vec<(String, Value)>,
}

impl FakeRow {
    pub fn new(values: Vec<(&str, Value)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

impl DatabaseRow for FakeRow {
    fn get_by_index(&self, index: usize) -> OrmResult<Value> {
        self.values
            .get(index)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| OrmError::ColumnNotFound(format!("#{}", index)))
    }

    fn get_by_name(&self, name: &str) -> OrmResult<Value> {
        self.values
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| OrmError::ColumnNotFound(name.to_string()))
    }

    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.values.iter().map(|(column, _)| column.clone()).collect()
    }
}

struct FakeTable {
    key_column: String,
    rows: Vec<FakeRow>,
}

/// An executor serving canned rows and recording every call.
#[derive(Default)]
pub struct FakeExecutor {
    tables: HashMap<String, FakeTable>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table whose rows are matched by `key_column` against the
    /// statement's bind list.
    pub fn with_table(mut self, table: &str, key_column: &str, rows: Vec<FakeRow>) -> Self {
        self.tables.insert(
            table.to_string(),
            FakeTable {
                key_column: key_column.to_string(),
                rows,
            },
        );
        self
    }

    /// Every statement executed so far, with its bind list.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryExecutor for FakeExecutor {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));

        let table = self
            .tables
            .iter()
            .find(|(name, _)| sql.contains(&format!("FROM \"{}\"", name)))
            .map(|(_, table)| table)
            .ok_or_else(|| OrmError::Query(format!("no fake table matches statement: {}", sql)))?;

        Ok(table
            .rows
            .iter()
            .filter(|row| match row.get_by_name(&table.key_column) {
                Ok(value) => params.contains(&value),
                Err(_) => false,
            })
            .cloned()
            .map(|row| Box::new(row) as Box<dyn DatabaseRow>)
            .collect())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(0)
    }
}
