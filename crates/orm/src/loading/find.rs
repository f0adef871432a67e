//! Find and Get operations

use crate::backends::QueryExecutor;
use crate::error::{OrmError, OrmResult};
use crate::expr::{bind, columns, ident, Expr};
use crate::model::Model;
use crate::statement::select;

/// One JOIN attached to a `find` query.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub left: bool,
    pub table: Expr,
    pub on: Expr,
}

/// Refinements for a `find` query.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    joins: Vec<JoinSpec>,
    where_clause: Option<Expr>,
    order_by: Vec<Expr>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an inner join against `table` with the given ON condition.
    pub fn join(mut self, table: Expr, on: Expr) -> Self {
        self.joins.push(JoinSpec {
            left: false,
            table,
            on,
        });
        self
    }

    /// Adds a left join against `table` with the given ON condition.
    pub fn left_join(mut self, table: Expr, on: Expr) -> Self {
        self.joins.push(JoinSpec {
            left: true,
            table,
            on,
        });
        self
    }

    pub fn where_expr(mut self, condition: Expr) -> Self {
        self.where_clause = Some(condition);
        self
    }

    pub fn order_by(mut self, exprs: Vec<Expr>) -> Self {
        self.order_by = exprs;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Fetches all entities of type `M` matching `options`.
///
/// Columns are selected table-qualified so joined tables cannot shadow them.
pub async fn find<M: Model>(db: &dyn QueryExecutor, options: FindOptions) -> OrmResult<Vec<M>> {
    let table = M::table_name();
    let qualified: Vec<Expr> = M::columns()
        .iter()
        .map(|column| ident(&format!("{}.{}", table, column)))
        .collect();

    let mut from_item = ident(table);
    for join in &options.joins {
        let joined = if join.left {
            from_item.left_join(join.table.clone())
        } else {
            from_item.join(join.table.clone())
        };
        from_item = joined.on(join.on.clone()).into();
    }

    let mut statement = select(qualified).from(from_item);
    if let Some(condition) = options.where_clause {
        statement = statement.where_expr(condition);
    }
    if !options.order_by.is_empty() {
        statement = statement.order_by(options.order_by);
    }
    if let Some(limit) = options.limit {
        statement = statement.limit(bind(limit));
    }
    if let Some(offset) = options.offset {
        statement = statement.offset(bind(offset));
    }

    let (sql, params) = statement.build();
    let rows = db.fetch_all(&sql, &params).await?;
    rows.iter().map(|row| M::from_row(row.as_ref())).collect()
}

/// Fetches the single entity of type `M` matching `condition`.
///
/// Zero rows is the distinguished `NotFound` condition, so callers can branch
/// on "not found" vs "failed".
pub async fn get<M: Model>(db: &dyn QueryExecutor, condition: Expr) -> OrmResult<M> {
    let statement = select(columns(M::columns()))
        .from(ident(M::table_name()))
        .where_expr(condition);

    let (sql, params) = statement.build();
    let rows = db.fetch_all(&sql, &params).await?;
    match rows.first() {
        Some(row) => M::from_row(row.as_ref()),
        None => Err(OrmError::NotFound(M::table_name().to_string())),
    }
}
