//! SELECT statements

use serde_json::Value;

use super::cte::{write_with, Cte};
use super::write_list;
use crate::expr::writer::SqlWriter;
use crate::expr::Expr;

/// A SELECT statement.
///
/// Clauses render in a fixed order regardless of the order builder methods
/// are called: `[WITH ctes] SELECT [DISTINCT ON (exprs)] columns [FROM items]
/// [WHERE cond] [GROUP BY exprs] [UNION stmt]* [ORDER BY exprs] [LIMIT n]
/// [OFFSET n]`.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub(crate) ctes: Vec<Cte>,
    distinct_on: Vec<Expr>,
    columns: Vec<Expr>,
    from: Vec<Expr>,
    where_clause: Option<Expr>,
    group_by: Vec<Expr>,
    unions: Vec<Select>,
    order_by: Vec<Expr>,
    limit: Option<Expr>,
    offset: Option<Expr>,
}

/// Returns a new SELECT statement; an empty column list renders as `*`.
pub fn select(columns: Vec<Expr>) -> Select {
    Select {
        columns,
        ..Default::default()
    }
}

impl Select {
    /// Adds a `DISTINCT ON (exprs)` clause.
    pub fn distinct_on(mut self, exprs: Vec<Expr>) -> Self {
        self.distinct_on = exprs;
        self
    }

    /// Appends a FROM item; repeated calls build a comma-separated list.
    pub fn from(mut self, item: impl Into<Expr>) -> Self {
        self.from.push(item.into());
        self
    }

    /// Sets the WHERE condition.
    pub fn where_expr(mut self, condition: Expr) -> Self {
        self.where_clause = Some(condition);
        self
    }

    pub fn group_by(mut self, exprs: Vec<Expr>) -> Self {
        self.group_by = exprs;
        self
    }

    /// Appends a `UNION` statement.
    pub fn union(mut self, statement: Select) -> Self {
        self.unions.push(statement);
        self
    }

    pub fn order_by(mut self, exprs: Vec<Expr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Sets the LIMIT count expression (a literal or a bind).
    pub fn limit(mut self, count: Expr) -> Self {
        self.limit = Some(count);
        self
    }

    /// Sets the OFFSET start expression (a literal or a bind).
    pub fn offset(mut self, start: Expr) -> Self {
        self.offset = Some(start);
        self
    }

    /// Renders the statement to SQL text plus its positional arguments.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut writer = SqlWriter::new();
        self.write_sql(&mut writer);
        writer.finish()
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        if !self.ctes.is_empty() {
            write_with(writer, &self.ctes);
        }
        writer.push("SELECT ");
        if !self.distinct_on.is_empty() {
            writer.push("DISTINCT ON (");
            write_list(writer, &self.distinct_on);
            writer.push(") ");
        }
        if self.columns.is_empty() {
            writer.push("*");
        } else {
            write_list(writer, &self.columns);
        }
        if !self.from.is_empty() {
            writer.push(" FROM ");
            write_list(writer, &self.from);
        }
        if let Some(condition) = &self.where_clause {
            writer.push(" WHERE ");
            condition.write_sql(writer);
        }
        if !self.group_by.is_empty() {
            writer.push(" GROUP BY ");
            write_list(writer, &self.group_by);
        }
        for statement in &self.unions {
            writer.push(" UNION ");
            statement.write_sql(writer);
        }
        if !self.order_by.is_empty() {
            writer.push(" ORDER BY ");
            write_list(writer, &self.order_by);
        }
        if let Some(count) = &self.limit {
            writer.push(" LIMIT ");
            count.write_sql(writer);
        }
        if let Some(start) = &self.offset {
            writer.push(" OFFSET ");
            start.write_sql(writer);
        }
    }
}
