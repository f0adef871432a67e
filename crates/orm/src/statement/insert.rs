//! INSERT statements

use serde_json::Value;

use super::select::Select;
use super::{write_list, Assignment};
use crate::expr::writer::SqlWriter;
use crate::expr::{columns, ident, Expr};

/// An INSERT statement.
///
/// Renders `INSERT INTO table [(columns)] {DEFAULT VALUES | VALUES (exprs) |
/// subquery} [ON CONFLICT [(target)] {DO NOTHING | DO UPDATE SET …}]
/// [RETURNING exprs]`.
#[derive(Debug, Clone)]
pub struct Insert {
    table: Expr,
    columns: Vec<Expr>,
    source: InsertSource,
    on_conflict: Option<OnConflict>,
    returning: Vec<Expr>,
}

/// The row source of an INSERT.
#[derive(Debug, Clone)]
pub enum InsertSource {
    DefaultValues,
    Values(Vec<Expr>),
    Query(Box<Select>),
}

/// The action taken when an INSERT conflicts.
#[derive(Debug, Clone)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate(Vec<Assignment>),
}

#[derive(Debug, Clone)]
struct OnConflict {
    target: Option<Expr>,
    action: ConflictAction,
}

/// Returns a new INSERT statement; without values it renders `DEFAULT VALUES`.
pub fn insert_into(table: &str) -> Insert {
    Insert {
        table: ident(table),
        columns: Vec::new(),
        source: InsertSource::DefaultValues,
        on_conflict: None,
        returning: Vec::new(),
    }
}

impl Insert {
    /// Sets the inserted column list.
    pub fn columns(mut self, names: &[&str]) -> Self {
        self.columns = columns(names);
        self
    }

    /// Inserts a single `VALUES (…)` row.
    pub fn values(mut self, exprs: Vec<Expr>) -> Self {
        self.source = InsertSource::Values(exprs);
        self
    }

    /// Inserts the rows produced by a subquery.
    pub fn from_select(mut self, statement: Select) -> Self {
        self.source = InsertSource::Query(Box::new(statement));
        self
    }

    /// Adds an `ON CONFLICT` clause with no conflict target.
    pub fn on_conflict(mut self, action: ConflictAction) -> Self {
        self.on_conflict = Some(OnConflict {
            target: None,
            action,
        });
        self
    }

    /// Adds an `ON CONFLICT (target)` clause.
    pub fn on_conflict_target(mut self, target: &str, action: ConflictAction) -> Self {
        self.on_conflict = Some(OnConflict {
            target: Some(ident(target)),
            action,
        });
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
        writer.push("INSERT INTO ");
        self.table.write_sql(writer);
        if !self.columns.is_empty() {
            writer.push(" (");
            write_list(writer, &self.columns);
            writer.push(")");
        }
        match &self.source {
            InsertSource::DefaultValues => writer.push(" DEFAULT VALUES"),
            InsertSource::Values(exprs) => {
                writer.push(" VALUES (");
                write_list(writer, exprs);
                writer.push(")");
            }
            InsertSource::Query(statement) => {
                writer.push(" ");
                statement.write_sql(writer);
            }
        }
        if let Some(conflict) = &self.on_conflict {
            writer.push(" ON CONFLICT");
            if let Some(target) = &conflict.target {
                writer.push(" (");
                target.write_sql(writer);
                writer.push(")");
            }
            match &conflict.action {
                ConflictAction::DoNothing => writer.push(" DO NOTHING"),
                ConflictAction::DoUpdate(assignments) => {
                    writer.push(" DO UPDATE SET ");
                    for (i, assignment) in assignments.iter().enumerate() {
                        if i > 0 {
                            writer.push(", ");
                        }
                        assignment.write_sql(writer);
                    }
                }
            }
        }
        if !self.returning.is_empty() {
            writer.push(" RETURNING ");
            write_list(writer, &self.returning);
        }
    }
}
