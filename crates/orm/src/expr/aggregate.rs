//! Aggregate expressions

use super::writer::SqlWriter;
use super::Expr;

/// An aggregate call: `name([DISTINCT ]args[ ORDER BY …]) [FILTER (WHERE …)]`.
#[derive(Debug, Clone)]
pub struct AggregateExpr {
    function: String,
    distinct: bool,
    args: Vec<Expr>,
    order_by: Vec<Expr>,
    filter_where: Option<Box<Expr>>,
}

impl AggregateExpr {
    pub(crate) fn new(function: &str, args: Vec<Expr>) -> Self {
        Self {
            function: function.to_string(),
            distinct: false,
            args,
            order_by: Vec::new(),
            filter_where: None,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Orders the aggregated input, e.g. for `array_agg`.
    pub fn order_by(mut self, exprs: Vec<Expr>) -> Self {
        self.order_by = exprs;
        self
    }

    /// Adds a `FILTER (WHERE …)` clause and finishes the expression.
    pub fn filter_where(mut self, condition: Expr) -> Expr {
        self.filter_where = Some(Box::new(condition));
        Expr::Aggregate(self)
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        writer.push(&self.function);
        writer.push("(");
        if self.distinct {
            writer.push("DISTINCT ");
        }
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            arg.write_sql(writer);
        }
        if !self.order_by.is_empty() {
            writer.push(" ORDER BY ");
            for (i, expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    writer.push(", ");
                }
                expr.write_sql(writer);
            }
        }
        writer.push(")");
        if let Some(condition) = &self.filter_where {
            writer.push(" FILTER (WHERE ");
            condition.write_sql(writer);
            writer.push(")");
        }
    }
}

impl From<AggregateExpr> for Expr {
    fn from(aggregate: AggregateExpr) -> Self {
        Expr::Aggregate(aggregate)
    }
}
