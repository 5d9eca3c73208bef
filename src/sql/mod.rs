//! SQL side of the check: parsing embedded statement literals and measuring
//! how many positional parameters they require.
//!
//! Parsing is delegated to `sqlparser` with the MySQL dialect, which is the
//! dialect that spells parameter markers as `?`.

use sqlparser::ast::{Expr, Statement, Value};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::{Parser, ParserError};

pub mod counter;
pub mod shape;

pub use counter::{count, count_markers};
pub use shape::{LimitShape, StatementKind, StatementShape};

/// Parse SQL text and keep only the first statement.
///
/// `Ok(None)` means the text parsed to nothing (e.g. only comments or `;`).
pub fn parse_first(text: &str) -> Result<Option<Statement>, ParserError> {
    let statements = Parser::parse_sql(&MySqlDialect {}, text)?;
    Ok(statements.into_iter().next())
}

/// How a predicate-tree node participates in placeholder counting.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a, N> {
    /// A positional parameter marker (`?`)
    Marker,
    /// A binary operator node; both operands are walked
    Binary(&'a N, &'a N),
    /// Anything else; contributes nothing
    Other,
}

/// A node in a predicate tree that the counter can walk.
pub trait PredicateNode: Sized {
    fn node_kind(&self) -> NodeKind<'_, Self>;
}

impl PredicateNode for Expr {
    fn node_kind(&self) -> NodeKind<'_, Self> {
        match self {
            Expr::Value(v) if matches!(v.value, Value::Placeholder(_)) => NodeKind::Marker,
            Expr::BinaryOp { left, right, .. } => NodeKind::Binary(left, right),
            // Parentheses only group; the tree below them is still the predicate
            Expr::Nested(inner) => inner.node_kind(),
            _ => NodeKind::Other,
        }
    }
}
