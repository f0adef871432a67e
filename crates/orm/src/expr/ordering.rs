//! ORDER BY terms

use std::fmt;

use super::writer::SqlWriter;
use super::Expr;

/// Sort direction for an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

/// NULL placement for an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

impl fmt::Display for NullsOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullsOrder::First => write!(f, "NULLS FIRST"),
            NullsOrder::Last => write!(f, "NULLS LAST"),
        }
    }
}

/// An ORDER BY term: `expr [ASC|DESC] [NULLS FIRST|NULLS LAST]`.
#[derive(Debug, Clone)]
pub struct OrderExpr {
    expr: Box<Expr>,
    direction: Option<Direction>,
    nulls: Option<NullsOrder>,
}

impl OrderExpr {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr: Box::new(expr),
            direction: None,
            nulls: None,
        }
    }

    pub fn asc(mut self) -> Self {
        self.direction = Some(Direction::Asc);
        self
    }

    pub fn desc(mut self) -> Self {
        self.direction = Some(Direction::Desc);
        self
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        self.expr.write_sql(writer);
        if let Some(direction) = self.direction {
            writer.push(" ");
            writer.push(&direction.to_string());
        }
        if let Some(nulls) = self.nulls {
            writer.push(" ");
            writer.push(&nulls.to_string());
        }
    }
}

impl From<OrderExpr> for Expr {
    fn from(order: OrderExpr) -> Self {
        Expr::Order(order)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{bind, ident};
    use super::*;

    fn render(expr: &Expr) -> String {
        let mut writer = SqlWriter::new();
        expr.write_sql(&mut writer);
        writer.finish().0
    }

    #[test]
    fn plain_term_has_no_modifiers() {
        let term: Expr = OrderExpr::new(ident("created_at")).into();
        assert_eq!(render(&term), r#""created_at""#);
    }

    #[test]
    fn direction_and_nulls_render_in_order() {
        let term = ident("score").desc().nulls_last();
        assert_eq!(render(&term), r#""score" DESC NULLS LAST"#);
    }

    #[test]
    fn expression_terms_are_allowed() {
        let term = ident("foo").equal(bind("hello")).desc();
        assert_eq!(render(&term), r#""foo" = $1 DESC"#);
    }
}
