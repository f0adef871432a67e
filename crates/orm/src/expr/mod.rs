//! SQL expression tree
//!
//! Expressions form an immutable tree: every combinator takes `self` by value
//! and returns a new node, so a partially-built expression can be stored and
//! reused without aliasing corrupting sibling branches. Operators nest
//! left-associatively by wrapping, which makes `a.equal(b).and(c)` serialize
//! as `a = b AND c` rather than `a = (b AND c)`.

pub mod aggregate;
pub mod case;
pub mod joins;
pub mod ordering;
pub mod window;
pub(crate) mod writer;

pub use aggregate::AggregateExpr;
pub use case::CaseExpr;
pub use joins::{JoinExpr, JoinKind};
pub use ordering::{Direction, NullsOrder, OrderExpr};
pub use window::{WindowFunctionExpr, WindowSpec};

use serde_json::Value;

use crate::statement::Select;
use writer::SqlWriter;

/// A node in the SQL expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Dot-qualified identifier; each segment is quoted independently
    Ident(Vec<String>),
    /// Inline literal value
    Literal(Literal),
    /// The `*` column list
    Star,
    /// Positional bind placeholder; arrays expand to one slot per element
    Bind(Value),
    /// Infix operator; `right` is absent for postfix forms like `IS NULL`
    Infix {
        left: Box<Expr>,
        op: String,
        right: Option<Box<Expr>>,
    },
    /// Function call
    Call { function: String, args: Vec<Expr> },
    /// CASE WHEN expression
    Case(CaseExpr),
    /// Aggregate with DISTINCT/ORDER BY/FILTER modifiers
    Aggregate(AggregateExpr),
    /// Window function; always renders an OVER clause
    Window(WindowFunctionExpr),
    /// ORDER BY term with direction and NULLS placement
    Order(OrderExpr),
    /// JOIN between two from-items
    Join(JoinExpr),
    /// `expr AS "alias"`
    Alias { expr: Box<Expr>, alias: String },
    /// Sub-SELECT in expression position, always parenthesized
    Subquery(Box<Select>),
}

/// An inline literal, rendered directly into the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Returns an identifier expression, splitting `name` on `.`.
pub fn ident(name: &str) -> Expr {
    Expr::Ident(name.split('.').map(str::to_string).collect())
}

/// Returns a bind placeholder for `value`.
pub fn bind(value: impl Into<Value>) -> Expr {
    Expr::Bind(value.into())
}

/// Returns a literal expression.
pub fn lit(value: impl Into<Literal>) -> Expr {
    Expr::Literal(value.into())
}

/// Returns the `*` expression.
pub fn star() -> Expr {
    Expr::Star
}

/// Returns a function call expression.
pub fn call(function: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        function: function.to_string(),
        args,
    }
}

/// Returns one identifier expression per column name.
pub fn columns(names: &[&str]) -> Vec<Expr> {
    names.iter().map(|name| ident(name)).collect()
}

/// Starts a CASE expression with its first WHEN clause.
pub fn case_when(condition: Expr, result: Expr) -> CaseExpr {
    CaseExpr::new(condition, result)
}

/// Starts an aggregate expression.
pub fn aggregate(function: &str, args: Vec<Expr>) -> AggregateExpr {
    AggregateExpr::new(function, args)
}

/// Starts a window function expression.
pub fn window_function(function: &str, args: Vec<Expr>) -> WindowFunctionExpr {
    WindowFunctionExpr::new(function, args)
}

impl Expr {
    /// Applies an arbitrary infix operator.
    pub fn op(self, op: &str, right: Expr) -> Expr {
        Expr::Infix {
            left: Box::new(self),
            op: op.to_string(),
            right: Some(Box::new(right)),
        }
    }

    pub fn and(self, right: Expr) -> Expr {
        self.op("AND", right)
    }

    pub fn or(self, right: Expr) -> Expr {
        self.op("OR", right)
    }

    pub fn equal(self, right: Expr) -> Expr {
        self.op("=", right)
    }

    pub fn not_equal(self, right: Expr) -> Expr {
        self.op("<>", right)
    }

    pub fn less_than(self, right: Expr) -> Expr {
        self.op("<", right)
    }

    pub fn greater_than(self, right: Expr) -> Expr {
        self.op(">", right)
    }

    pub fn is_in(self, right: Expr) -> Expr {
        self.op("IN", right)
    }

    pub fn is_null(self) -> Expr {
        Expr::Infix {
            left: Box::new(self),
            op: "IS NULL".to_string(),
            right: None,
        }
    }

    pub fn is_not_null(self) -> Expr {
        Expr::Infix {
            left: Box::new(self),
            op: "IS NOT NULL".to_string(),
            right: None,
        }
    }

    /// Aliases this expression as `expr AS "alias"`.
    pub fn alias(self, alias: &str) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.to_string(),
        }
    }

    /// Starts an inner join with this expression as the left from-item.
    pub fn join(self, right: Expr) -> JoinExpr {
        JoinExpr::new(self, JoinKind::Inner, right)
    }

    /// Starts a left outer join with this expression as the left from-item.
    pub fn left_join(self, right: Expr) -> JoinExpr {
        JoinExpr::new(self, JoinKind::Left, right)
    }

    /// Marks this expression as an ascending ORDER BY term.
    pub fn asc(self) -> Expr {
        match self {
            Expr::Order(order) => Expr::Order(order.asc()),
            other => Expr::Order(OrderExpr::new(other).asc()),
        }
    }

    /// Marks this expression as a descending ORDER BY term.
    pub fn desc(self) -> Expr {
        match self {
            Expr::Order(order) => Expr::Order(order.desc()),
            other => Expr::Order(OrderExpr::new(other).desc()),
        }
    }

    pub fn nulls_first(self) -> Expr {
        match self {
            Expr::Order(order) => Expr::Order(order.nulls_first()),
            other => Expr::Order(OrderExpr::new(other).nulls_first()),
        }
    }

    pub fn nulls_last(self) -> Expr {
        match self {
            Expr::Order(order) => Expr::Order(order.nulls_last()),
            other => Expr::Order(OrderExpr::new(other).nulls_last()),
        }
    }

    pub(crate) fn write_sql(&self, writer: &mut SqlWriter) {
        match self {
            Expr::Ident(segments) => writer.push_ident(segments),
            Expr::Literal(literal) => literal.write_sql(writer),
            Expr::Star => writer.push("*"),
            Expr::Bind(value) => writer.bind(value),
            Expr::Infix { left, op, right } => {
                left.write_sql(writer);
                writer.push(" ");
                writer.push(op);
                if let Some(right) = right {
                    writer.push(" ");
                    right.write_sql(writer);
                }
            }
            Expr::Call { function, args } => {
                writer.push(function);
                writer.push("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        writer.push(", ");
                    }
                    arg.write_sql(writer);
                }
                writer.push(")");
            }
            Expr::Case(case) => case.write_sql(writer),
            Expr::Aggregate(aggregate) => aggregate.write_sql(writer),
            Expr::Window(window) => window.write_sql(writer),
            Expr::Order(order) => order.write_sql(writer),
            Expr::Join(join) => join.write_sql(writer),
            Expr::Alias { expr, alias } => {
                expr.write_sql(writer);
                writer.push(" AS ");
                writer.push_ident(std::slice::from_ref(alias));
            }
            Expr::Subquery(statement) => {
                writer.push("(");
                statement.write_sql(writer);
                writer.push(")");
            }
        }
    }
}

impl Literal {
    fn write_sql(&self, writer: &mut SqlWriter) {
        match self {
            Literal::Bool(value) => writer.push(if *value { "true" } else { "false" }),
            Literal::Int(value) => writer.push(&value.to_string()),
            Literal::Str(value) => {
                writer.push("'");
                let escaped = value.replace('\'', "''");
                writer.push(&escaped);
                writer.push("'");
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value as i64)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<Select> for Expr {
    fn from(statement: Select) -> Self {
        Expr::Subquery(Box::new(statement))
    }
}
