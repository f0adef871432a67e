//! Batched relationship preloading
//!
//! Given a batch of already-loaded parents and a dotted relation path, the
//! engine issues one batched `IN` query per path segment instead of one query
//! per parent. Query count per segment depends only on the number of unique
//! non-null keys and the configured bind limit, never on the parent count.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde_json::Value;

use crate::backends::{DatabaseRow, QueryExecutor};
use crate::error::{OrmError, OrmResult};
use crate::expr::{bind, columns, ident, Expr};
use crate::model::{Relatable, RelationKind};
use crate::statement::select;

/// Configuration for preload operations
#[derive(Debug, Clone)]
pub struct PreloadConfig {
    /// Maximum number of bind parameters per query; larger key sets are
    /// split into consecutive chunks of this size
    pub max_bind_params: usize,
    /// Per-query deadline in milliseconds
    pub query_timeout_ms: u64,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            max_bind_params: 1000,
            query_timeout_ms: 30_000,
        }
    }
}

/// One relation path to preload, e.g. `"orders"` or
/// `"orders.shipping_address"`, with optional refinements applied to the
/// final segment's query.
#[derive(Debug, Clone)]
pub struct Preload {
    name: String,
    where_clause: Option<Expr>,
    order_by: Vec<Expr>,
}

impl Preload {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            where_clause: None,
            order_by: Vec::new(),
        }
    }

    /// Restricts the final segment's query with an extra condition.
    pub fn where_expr(mut self, condition: Expr) -> Self {
        self.where_clause = Some(condition);
        self
    }

    /// Orders the final segment's fetched entities.
    pub fn order_by(mut self, exprs: Vec<Expr>) -> Self {
        self.order_by = exprs;
        self
    }
}

/// The preload engine.
#[derive(Debug, Clone, Default)]
pub struct Preloader {
    config: PreloadConfig,
}

impl Preloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PreloadConfig) -> Self {
        Self { config }
    }

    /// Populates every requested relation path on every parent.
    ///
    /// Parents with a NULL key are skipped, parents whose key matches no
    /// fetched row keep their zero state; neither is an error. Any executor
    /// or materialization error aborts the whole call.
    pub async fn load<E: Relatable>(
        &self,
        db: &dyn QueryExecutor,
        parents: &mut [E],
        preloads: &[Preload],
    ) -> OrmResult<()> {
        if parents.is_empty() {
            return Ok(());
        }
        for preload in preloads {
            let working: Vec<&mut dyn Relatable> = parents
                .iter_mut()
                .map(|parent| parent as &mut dyn Relatable)
                .collect();
            self.load_path(db, working, preload).await?;
        }
        Ok(())
    }

    /// Walks one dotted path, segment by segment. Each segment operates on
    /// the flattened set of entities attached by the previous segment.
    async fn load_path(
        &self,
        db: &dyn QueryExecutor,
        mut working: Vec<&mut dyn Relatable>,
        preload: &Preload,
    ) -> OrmResult<()> {
        let segments: Vec<&str> = preload.name.split('.').collect();
        let segment_count = segments.len();

        for (depth, segment) in segments.iter().enumerate() {
            if working.is_empty() {
                break;
            }
            let last = depth + 1 == segment_count;
            let descriptor = working[0].relation(segment)?;

            // Unique non-null keys, in first-seen order
            let mut seen = HashSet::new();
            let mut keys = Vec::new();
            for entity in &working {
                let key = entity.key_value(segment)?;
                if key.is_null() {
                    continue;
                }
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
            if keys.is_empty() {
                // The relation is absent everywhere; nothing to fetch
                break;
            }

            tracing::debug!(
                "preloading '{}' from {} ({} entities, {} unique keys)",
                segment,
                descriptor.table,
                working.len(),
                keys.len()
            );

            let mut fetched: Vec<Box<dyn Relatable>> = Vec::new();
            for chunk in keys.chunks(self.config.max_bind_params) {
                let mut condition =
                    ident(descriptor.column).is_in(bind(Value::Array(chunk.to_vec())));
                if last {
                    if let Some(extra) = &preload.where_clause {
                        condition = condition.and(extra.clone());
                    }
                }
                let mut statement = select(columns(descriptor.columns))
                    .from(ident(descriptor.table))
                    .where_expr(condition);
                if last && !preload.order_by.is_empty() {
                    statement = statement.order_by(preload.order_by.clone());
                }
                let (sql, params) = statement.build();
                let rows = self.fetch(db, &sql, &params).await?;
                for row in &rows {
                    fetched.push(descriptor.materialize(row.as_ref())?);
                }
            }

            // Lookup from match value to the fetched entities sharing it,
            // in fetch order
            let mut groups: HashMap<Value, Vec<usize>> = HashMap::new();
            for (index, child) in fetched.iter().enumerate() {
                let value = child.match_value(descriptor.column)?;
                if value.is_null() {
                    continue;
                }
                groups.entry(value).or_default().push(index);
            }

            // Assign owned copies onto every parent in the working set
            for entity in working.iter_mut() {
                let key = entity.key_value(segment)?;
                if key.is_null() {
                    continue;
                }
                let Some(indexes) = groups.get(&key) else {
                    continue;
                };
                let batch: Vec<Box<dyn Relatable>> = match descriptor.kind {
                    RelationKind::ToOne => vec![fetched[indexes[0]].clone_boxed()],
                    RelationKind::ToMany => {
                        indexes.iter().map(|&i| fetched[i].clone_boxed()).collect()
                    }
                };
                entity.attach(segment, batch)?;
            }

            if last {
                break;
            }

            // The entities just attached become the next segment's working set
            let mut next: Vec<&mut dyn Relatable> = Vec::new();
            for entity in working {
                next.extend(entity.loaded_mut(segment)?);
            }
            working = next;
        }
        Ok(())
    }

    async fn fetch(
        &self,
        db: &dyn QueryExecutor,
        sql: &str,
        params: &[Value],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        let deadline = Duration::from_millis(self.config.query_timeout_ms);
        match tokio::time::timeout(deadline, db.fetch_all(sql, params)).await {
            Ok(result) => result,
            Err(_) => Err(OrmError::Timeout(self.config.query_timeout_ms)),
        }
    }
}
