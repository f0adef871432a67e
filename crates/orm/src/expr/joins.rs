//! JOIN from-items
//!
//! `JoinExpr` is the fluent continuation returned by `Expr::join` and
//! `Expr::left_join`. The `ON` clause is optional (cross join), and a join can
//! itself be the left side of a further join. Every method returns a new
//! value, so a base join can be stored before `on` is attached and reused
//! without aliasing.

use super::writer::SqlWriter;
use super::Expr;

/// Join flavor; inner joins render as plain `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

/// A `left [LEFT] JOIN right [ON cond]` from-item.
#[derive(Debug, Clone)]
pub struct JoinExpr {
    left: Box<Expr>,
    kind: JoinKind,
    right: Box<Expr>,
    on: Option<Box<Expr>>,
}

impl JoinExpr {
    pub(crate) fn new(left: Expr, kind: JoinKind, right: Expr) -> Self {
        Self {
            left: Box::new(left),
            kind,
            right: Box::new(right),
            on: None,
        }
    }

    /// Attaches the join condition.
    pub fn on(mut self, condition: Expr) -> Self {
        self.on = Some(Box::new(condition));
        self
    }

    /// Chains another inner join, using this join as the left side.
    pub fn join(self, right: Expr) -> JoinExpr {
        JoinExpr::new(Expr::Join(self), JoinKind::Inner, right)
    }

    /// Chains another left join, using this join as the left side.
    pub fn left_join(self, right: Expr) -> JoinExpr {
        JoinExpr::new(Expr::Join(self), JoinKind::Left, right)
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        self.left.write_sql(writer);
        if self.kind == JoinKind::Left {
            writer.push(" LEFT");
        }
        writer.push(" JOIN ");
        self.right.write_sql(writer);
        if let Some(condition) = &self.on {
            writer.push(" ON ");
            condition.write_sql(writer);
        }
    }
}

impl From<JoinExpr> for Expr {
    fn from(join: JoinExpr) -> Self {
        Expr::Join(join)
    }
}
