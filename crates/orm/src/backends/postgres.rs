//! PostgreSQL executor
//!
//! Implements the executor boundary on top of sqlx: binds `serde_json::Value`
//! parameters by variant, and converts result columns back to `Value` by
//! Postgres type name.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use super::{DatabaseRow, QueryExecutor};
use crate::error::{OrmError, OrmResult};

/// `QueryExecutor` backed by a sqlx PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        tracing::debug!("fetching rows: {} ({} params)", sql, params.len());

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param)?;
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OrmError::Query(format!("Query fetch failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| Box::new(PostgresRow::new(row)) as Box<dyn DatabaseRow>)
            .collect())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        tracing::debug!("executing statement: {} ({} params)", sql, params.len());

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param)?;
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| OrmError::Query(format!("Query execution failed: {}", e)))?;

        Ok(result.rows_affected())
    }
}

/// A PostgreSQL result row.
pub struct PostgresRow {
    row: PgRow,
}

impl PostgresRow {
    pub fn new(row: PgRow) -> Self {
        Self { row }
    }
}

impl DatabaseRow for PostgresRow {
    fn get_by_index(&self, index: usize) -> OrmResult<Value> {
        pg_value_to_json(&self.row, index)
    }

    fn get_by_name(&self, name: &str) -> OrmResult<Value> {
        let index = self
            .row
            .columns()
            .iter()
            .position(|column| column.name() == name)
            .ok_or_else(|| OrmError::ColumnNotFound(name.to_string()))?;
        pg_value_to_json(&self.row, index)
    }

    fn column_count(&self) -> usize {
        self.row.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.row
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }
}

/// Bind a JSON parameter value to a sqlx query. The serializer only ever
/// emits scalar parameters, so arrays and objects are rejected here.
fn bind_value<'a>(
    query: sqlx::query::Query<'a, sqlx::Postgres, sqlx::postgres::PgArguments>,
    value: &Value,
) -> OrmResult<sqlx::query::Query<'a, sqlx::Postgres, sqlx::postgres::PgArguments>> {
    match value {
        Value::Null => Ok(query.bind(Option::<String>::None)),
        Value::Bool(b) => Ok(query.bind(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(query.bind(i))
            } else if let Some(f) = n.as_f64() {
                Ok(query.bind(f))
            } else {
                Err(OrmError::Query("Invalid number parameter".to_string()))
            }
        }
        Value::String(s) => Ok(query.bind(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(OrmError::Query(
            "Unsupported parameter shape: expected a scalar".to_string(),
        )),
    }
}

fn decode<'r, T>(row: &'r PgRow, index: usize) -> OrmResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<T, _>(index)
        .map_err(|e| OrmError::Query(format!("Failed to decode column {}: {}", index, e)))
}

/// Convert a PostgreSQL column value to a JSON value by type name.
fn pg_value_to_json(row: &PgRow, index: usize) -> OrmResult<Value> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| OrmError::Query(format!("Failed to read column {}: {}", index, e)))?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_name = row.columns()[index].type_info().name();
    match type_name {
        "BOOL" => Ok(Value::from(decode::<bool>(row, index)?)),
        "INT2" => Ok(Value::from(decode::<i16>(row, index)? as i64)),
        "INT4" => Ok(Value::from(decode::<i32>(row, index)? as i64)),
        "INT8" => Ok(Value::from(decode::<i64>(row, index)?)),
        "FLOAT4" => Ok(Value::from(decode::<f32>(row, index)? as f64)),
        "FLOAT8" => Ok(Value::from(decode::<f64>(row, index)?)),
        "TEXT" | "VARCHAR" | "NAME" | "BPCHAR" => Ok(Value::from(decode::<String>(row, index)?)),
        "UUID" => Ok(Value::from(decode::<uuid::Uuid>(row, index)?.to_string())),
        "TIMESTAMPTZ" => Ok(Value::from(
            decode::<chrono::DateTime<chrono::Utc>>(row, index)?.to_rfc3339(),
        )),
        "TIMESTAMP" => Ok(Value::from(
            decode::<chrono::NaiveDateTime>(row, index)?.to_string(),
        )),
        "DATE" => Ok(Value::from(decode::<chrono::NaiveDate>(row, index)?.to_string())),
        "TIME" => Ok(Value::from(decode::<chrono::NaiveTime>(row, index)?.to_string())),
        "JSON" | "JSONB" => decode::<Value>(row, index),
        _ => {
            // Unknown types fall back to their text form
            let value = row.try_get::<String, _>(index).map_err(|e| {
                OrmError::Query(format!(
                    "Failed to read column {} of type '{}' as text: {}",
                    index, type_name, e
                ))
            })?;
            Ok(Value::from(value))
        }
    }
}
