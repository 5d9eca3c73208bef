//! Placeholder counting over a statement shape.
//!
//! SELECT and DELETE count markers in their WHERE trees plus their LIMIT
//! bounds. INSERT counts every value in every row of its VALUES list. UPDATE
//! counts SET assignments whose value is a marker, plus WHERE and LIMIT.
//!
//! A LIMIT bound counts as one parameter when present, unless
//! [`LimitCounting::Markers`] asks for the markers inside it instead.

use sqlparser::ast::Expr;

use super::shape::{LimitShape, StatementKind, StatementShape};
use super::{NodeKind, PredicateNode};
use crate::config::LimitCounting;

/// Number of positional parameters a statement requires.
pub fn count(shape: &StatementShape, limits: LimitCounting) -> usize {
    match shape.kind {
        StatementKind::Select | StatementKind::Delete => {
            predicate_markers(shape) + limit_params(&shape.limit, limits)
        }
        StatementKind::Insert => shape.value_rows.iter().map(|row| row.len()).sum(),
        StatementKind::Update => {
            let set_markers = shape
                .assignments
                .iter()
                .filter(|value| matches!(value.node_kind(), NodeKind::Marker))
                .count();
            set_markers + predicate_markers(shape) + limit_params(&shape.limit, limits)
        }
    }
}

/// Count marker leaves in a binary predicate tree.
///
/// Walks with an explicit stack, so tree depth is not bounded by the call stack.
pub fn count_markers<N: PredicateNode>(root: &N) -> usize {
    let mut markers = 0;
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        match node.node_kind() {
            NodeKind::Marker => markers += 1,
            NodeKind::Binary(left, right) => {
                pending.push(right);
                pending.push(left);
            }
            NodeKind::Other => {}
        }
    }
    markers
}

fn predicate_markers(shape: &StatementShape) -> usize {
    shape.predicates.iter().map(|p| count_markers(*p)).sum()
}

fn limit_params(limit: &LimitShape, limits: LimitCounting) -> usize {
    let bound = |expr: Option<&Expr>| match (expr, limits) {
        (None, _) => 0,
        (Some(_), LimitCounting::Presence) => 1,
        (Some(expr), LimitCounting::Markers) => count_markers(expr),
    };
    bound(limit.offset) + bound(limit.count)
}
