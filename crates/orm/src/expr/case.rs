//! CASE WHEN expressions

use super::writer::SqlWriter;
use super::Expr;

/// A `CASE WHEN … THEN … [ELSE …] END` expression.
#[derive(Debug, Clone)]
pub struct CaseExpr {
    whens: Vec<(Expr, Expr)>,
    else_result: Option<Box<Expr>>,
}

impl CaseExpr {
    pub(crate) fn new(condition: Expr, result: Expr) -> Self {
        Self {
            whens: vec![(condition, result)],
            else_result: None,
        }
    }

    /// Adds another WHEN clause.
    pub fn when(mut self, condition: Expr, result: Expr) -> Self {
        self.whens.push((condition, result));
        self
    }

    /// Adds the ELSE clause and finishes the expression.
    pub fn otherwise(mut self, result: Expr) -> Expr {
        self.else_result = Some(Box::new(result));
        Expr::Case(self)
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        writer.push("CASE");
        for (condition, result) in &self.whens {
            writer.push(" WHEN ");
            condition.write_sql(writer);
            writer.push(" THEN ");
            result.write_sql(writer);
        }
        if let Some(else_result) = &self.else_result {
            writer.push(" ELSE ");
            else_result.write_sql(writer);
        }
        writer.push(" END");
    }
}

impl From<CaseExpr> for Expr {
    fn from(case: CaseExpr) -> Self {
        Expr::Case(case)
    }
}
