//! Window function expressions
//!
//! Constructing a `WindowFunctionExpr` marks the call as window-capable, so an
//! `OVER` clause always renders, as `OVER ()` when no window spec was given.
//! A plain `call()` never writes `OVER`: "empty window spec" and "no window
//! spec" are distinct.

use super::writer::SqlWriter;
use super::Expr;

/// A window function call: `name(args) OVER ([PARTITION BY …] [ORDER BY …])`.
#[derive(Debug, Clone)]
pub struct WindowFunctionExpr {
    function: String,
    args: Vec<Expr>,
    over: Option<WindowSpec>,
}

impl WindowFunctionExpr {
    pub(crate) fn new(function: &str, args: Vec<Expr>) -> Self {
        Self {
            function: function.to_string(),
            args,
            over: None,
        }
    }

    /// Sets the window definition and finishes the expression.
    pub fn over(mut self, spec: WindowSpec) -> Expr {
        self.over = Some(spec);
        Expr::Window(self)
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        writer.push(&self.function);
        writer.push("(");
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            arg.write_sql(writer);
        }
        writer.push(") OVER (");
        if let Some(spec) = &self.over {
            spec.write_sql(writer);
        }
        writer.push(")");
    }
}

impl From<WindowFunctionExpr> for Expr {
    fn from(window: WindowFunctionExpr) -> Self {
        Expr::Window(window)
    }
}

/// A window definition: `[PARTITION BY expr] [ORDER BY exprs]`.
#[derive(Debug, Clone, Default)]
pub struct WindowSpec {
    partition_by: Option<Box<Expr>>,
    order_by: Vec<Expr>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by(mut self, expr: Expr) -> Self {
        self.partition_by = Some(Box::new(expr));
        self
    }

    pub fn order_by(mut self, exprs: Vec<Expr>) -> Self {
        self.order_by = exprs;
        self
    }

    fn write_sql(&self, writer: &mut SqlWriter) {
        if let Some(expr) = &self.partition_by {
            writer.push("PARTITION BY ");
            expr.write_sql(writer);
        }
        if self.partition_by.is_some() && !self.order_by.is_empty() {
            writer.push(" ");
        }
        if !self.order_by.is_empty() {
            writer.push("ORDER BY ");
            for (i, expr) in self.order_by.iter().enumerate() {
                if i > 0 {
                    writer.push(", ");
                }
                expr.write_sql(writer);
            }
        }
    }
}
