use sqlparser::ast::{Expr, LimitClause, Query, SelectItem, SetExpr, Statement};
use std::fmt;

/// Statement families the checker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Offset and row-count sub-expressions of a LIMIT clause
#[derive(Debug, Clone, Copy, Default)]
pub struct LimitShape<'a> {
    pub offset: Option<&'a Expr>,
    pub count: Option<&'a Expr>,
}

/// The clauses of one parsed statement that can hold parameter markers.
///
/// Borrowed from the `sqlparser` tree; clauses a statement kind does not have
/// are simply empty.
#[derive(Debug, Clone)]
pub struct StatementShape<'a> {
    pub kind: StatementKind,
    /// WHERE trees; one per SELECT branch of a set operation
    pub predicates: Vec<&'a Expr>,
    pub limit: LimitShape<'a>,
    /// INSERT value-list groups, one per row
    pub value_rows: Vec<&'a [Expr]>,
    /// Right-hand sides of UPDATE ... SET assignments
    pub assignments: Vec<&'a Expr>,
    /// Width of the SELECT list, when it has no wildcard
    pub result_columns: Option<usize>,
}

impl<'a> StatementShape<'a> {
    fn empty(kind: StatementKind) -> Self {
        Self {
            kind,
            predicates: Vec::new(),
            limit: LimitShape::default(),
            value_rows: Vec::new(),
            assignments: Vec::new(),
            result_columns: None,
        }
    }

    /// Build the shape of a statement, or `None` for statement kinds outside
    /// SELECT / INSERT / UPDATE / DELETE.
    pub fn from_statement(stmt: &'a Statement) -> Option<Self> {
        match stmt {
            Statement::Query(query) => Some(Self::from_query(query)),
            Statement::Insert(insert) => {
                let mut shape = Self::empty(StatementKind::Insert);
                if let Some(source) = &insert.source {
                    if let SetExpr::Values(values) = source.body.as_ref() {
                        shape.value_rows = values.rows.iter().map(Vec::as_slice).collect();
                    }
                }
                Some(shape)
            }
            Statement::Update {
                assignments,
                selection,
                limit,
                ..
            } => {
                let mut shape = Self::empty(StatementKind::Update);
                shape.assignments = assignments.iter().map(|a| &a.value).collect();
                shape.predicates.extend(selection.as_ref());
                shape.limit.count = limit.as_ref();
                Some(shape)
            }
            Statement::Delete(delete) => {
                let mut shape = Self::empty(StatementKind::Delete);
                shape.predicates.extend(delete.selection.as_ref());
                shape.limit.count = delete.limit.as_ref();
                Some(shape)
            }
            _ => None,
        }
    }

    fn from_query(query: &'a Query) -> Self {
        let mut shape = Self::empty(StatementKind::Select);
        collect_select_predicates(&query.body, &mut shape.predicates);
        shape.limit = limit_shape(query.limit_clause.as_ref());
        shape.result_columns = result_columns(&query.body);
        shape
    }
}

fn collect_select_predicates<'a>(body: &'a SetExpr, out: &mut Vec<&'a Expr>) {
    match body {
        SetExpr::Select(select) => out.extend(select.selection.as_ref()),
        SetExpr::Query(inner) => collect_select_predicates(&inner.body, out),
        SetExpr::SetOperation { left, right, .. } => {
            collect_select_predicates(left, out);
            collect_select_predicates(right, out);
        }
        _ => {}
    }
}

fn limit_shape(clause: Option<&LimitClause>) -> LimitShape<'_> {
    match clause {
        Some(LimitClause::LimitOffset { limit, offset, .. }) => LimitShape {
            offset: offset.as_ref().map(|o| &o.value),
            count: limit.as_ref(),
        },
        Some(LimitClause::OffsetCommaLimit { offset, limit }) => LimitShape {
            offset: Some(offset),
            count: Some(limit),
        },
        None => LimitShape::default(),
    }
}

fn result_columns(body: &SetExpr) -> Option<usize> {
    let SetExpr::Select(select) = body else {
        return None;
    };
    let wildcard = select.projection.iter().any(|item| {
        matches!(
            item,
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _)
        )
    });
    (!wildcard).then_some(select.projection.len())
}
