//! UPDATE statements

use serde_json::Value;

use super::cte::{write_with, Cte};
use super::{write_list, Assignment};
use crate::expr::writer::SqlWriter;
use crate::expr::{ident, Expr};

/// An UPDATE statement.
///
/// Renders `[WITH ctes] UPDATE table SET col = expr, … [FROM items]
/// [WHERE cond] [RETURNING exprs]`.
#[derive(Debug, Clone)]
pub struct Update {
    pub(crate) ctes: Vec<Cte>,
    table: Expr,
    assignments: Vec<Assignment>,
    from: Vec<Expr>,
    where_clause: Option<Expr>,
    returning: Vec<Expr>,
}

/// Returns a new UPDATE statement.
pub fn update(table: &str) -> Update {
    Update {
        ctes: Vec::new(),
        table: ident(table),
        assignments: Vec::new(),
        from: Vec::new(),
        where_clause: None,
        returning: Vec::new(),
    }
}

impl Update {
    /// Sets the SET assignment list.
    pub fn set(mut self, assignments: Vec<Assignment>) -> Self {
        self.assignments = assignments;
        self
    }

    /// Appends a FROM item.
    pub fn from(mut self, item: impl Into<Expr>) -> Self {
        self.from.push(item.into());
        self
    }

    /// Sets the WHERE condition.
    pub fn where_expr(mut self, condition: Expr) -> Self {
        self.where_clause = Some(condition);
        self
    }

    pub fn returning(mut self, exprs: Vec<Expr>) -> Self {
        self.returning = exprs;
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
        writer.push("UPDATE ");
        self.table.write_sql(writer);
        writer.push(" SET ");
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            assignment.write_sql(writer);
        }
        if !self.from.is_empty() {
            writer.push(" FROM ");
            write_list(writer, &self.from);
        }
        if let Some(condition) = &self.where_clause {
            writer.push(" WHERE ");
            condition.write_sql(writer);
        }
        if !self.returning.is_empty() {
            writer.push(" RETURNING ");
            write_list(writer, &self.returning);
        }
    }
}
