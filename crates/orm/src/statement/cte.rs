//! Common table expressions

use super::select::Select;
use super::update::Update;
use crate::expr::writer::SqlWriter;
use crate::expr::Expr;

/// A named subquery attachable to a statement via `WITH`.
#[derive(Debug, Clone)]
pub struct Cte {
    pub(crate) name: String,
    pub(crate) statement: Select,
}

/// An accumulated `WITH` list, continued into a SELECT or UPDATE.
#[derive(Debug, Clone)]
pub struct With {
    ctes: Vec<Cte>,
}

/// Starts a `WITH` list with one named subquery.
pub fn with(name: &str, statement: Select) -> With {
    With {
        ctes: vec![Cte {
            name: name.to_string(),
            statement,
        }],
    }
}

impl With {
    /// Appends another named subquery.
    pub fn with(mut self, name: &str, statement: Select) -> Self {
        self.ctes.push(Cte {
            name: name.to_string(),
            statement,
        });
        self
    }

    /// Starts a SELECT statement carrying these CTEs.
    pub fn select(self, columns: Vec<Expr>) -> Select {
        let mut statement = super::select(columns);
        statement.ctes = self.ctes;
        statement
    }

    /// Starts an UPDATE statement carrying these CTEs.
    pub fn update(self, table: &str) -> Update {
        let mut statement = super::update(table);
        statement.ctes = self.ctes;
        statement
    }
}

pub(crate) fn write_with(writer: &mut SqlWriter, ctes: &[Cte]) {
    writer.push("WITH ");
    for (i, cte) in ctes.iter().enumerate() {
        if i > 0 {
            writer.push(", ");
        }
        writer.push(&cte.name);
        writer.push(" AS ( ");
        cte.statement.write_sql(writer);
        writer.push(" )");
    }
    writer.push(" ");
}
