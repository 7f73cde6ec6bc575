// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use crate::value::Value;

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared ownership of AST nodes. Expression trees are immutable after
/// parsing, so a node may appear in any number of trees without copying.
pub type Ref<T> = Arc<T>;

/// One node of a value-expression tree.
///
/// Trees arrive from the parser/planner with column references already
/// resolved against the table schema; `column_index` is `None` when the
/// referenced column does not exist in the input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Value),
    ColumnReference {
        column_name: Arc<str>,
        column_index: Option<usize>,
    },
    If {
        condition: Ref<Expr>,
        then_expr: Ref<Expr>,
        else_expr: Ref<Expr>,
    },
    Call {
        symbol: Arc<str>,
        args: Vec<Ref<Expr>>,
    },
    Regex {
        pattern: Arc<str>,
        subject: Ref<Expr>,
    },
    Like {
        pattern: Arc<str>,
        subject: Ref<Expr>,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Ref<Expr> {
        Ref::new(Expr::Literal(value.into()))
    }

    pub fn column(name: impl Into<Arc<str>>, index: Option<usize>) -> Ref<Expr> {
        Ref::new(Expr::ColumnReference {
            column_name: name.into(),
            column_index: index,
        })
    }

    pub fn if_expr(condition: Ref<Expr>, then_expr: Ref<Expr>, else_expr: Ref<Expr>) -> Ref<Expr> {
        Ref::new(Expr::If {
            condition,
            then_expr,
            else_expr,
        })
    }

    pub fn call(symbol: impl Into<Arc<str>>, args: Vec<Ref<Expr>>) -> Ref<Expr> {
        Ref::new(Expr::Call {
            symbol: symbol.into(),
            args,
        })
    }

    pub fn regex(pattern: impl Into<Arc<str>>, subject: Ref<Expr>) -> Ref<Expr> {
        Ref::new(Expr::Regex {
            pattern: pattern.into(),
            subject,
        })
    }

    pub fn like(pattern: impl Into<Arc<str>>, subject: Ref<Expr>) -> Ref<Expr> {
        Ref::new(Expr::Like {
            pattern: pattern.into(),
            subject,
        })
    }
}

/// Renders the expression as SQL text.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => f.write_str(&v.to_sql()),
            Expr::ColumnReference { column_name, .. } => f.write_str(column_name),
            Expr::If {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "if({condition}, {then_expr}, {else_expr})"),
            Expr::Call { symbol, args } => {
                write!(f, "{symbol}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Expr::Regex { pattern, subject } => {
                write!(f, "({subject} REGEXP {})", Value::from(pattern.clone()).to_sql())
            }
            Expr::Like { pattern, subject } => {
                write!(f, "({subject} LIKE {})", Value::from(pattern.clone()).to_sql())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sql_text() {
        let expr = Expr::if_expr(
            Expr::call("gt", vec![Expr::column("price", Some(0)), Expr::literal(100)]),
            Expr::literal("hi"),
            Expr::like("abc%", Expr::column("name", Some(1))),
        );
        assert_eq!(
            expr.to_string(),
            "if(gt(price, 100), 'hi', (name LIKE 'abc%'))"
        );
    }

    #[test]
    fn nodes_are_shared_not_copied() {
        let col = Expr::column("a", Some(0));
        let expr1 = Expr::call("neg", vec![col.clone()]);
        let expr2 = Expr::call("abs", vec![col.clone()]);
        match (expr1.as_ref(), expr2.as_ref()) {
            (Expr::Call { args: a, .. }, Expr::Call { args: b, .. }) => {
                assert!(Ref::ptr_eq(&a[0], &b[0]));
            }
            _ => unreachable!(),
        }
    }
}
