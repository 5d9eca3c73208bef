//! Mapping of method names to the call shapes the checker understands.

use std::fmt;

use super::Mismatch;
use crate::sql::StatementKind;
use crate::syntax::CallSite;

/// Calls that carry a SQL literal and bound arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataShape {
    Query,
    QueryContext,
    Exec,
    ExecContext,
    QueryRow,
    QueryRowContext,
}

/// Every recognized call shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    Data(DataShape),
    /// Reads result columns into destinations
    Scan,
}

/// Which statement family a data shape feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Row-producing calls; expect SELECT
    Rows,
    /// Statement execution; expects INSERT, UPDATE or DELETE
    Exec,
}

/// Dispatch entry for a data shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeLayout {
    /// Arguments before bound parameters, including the SQL text
    pub leading_args: usize,
    pub handler: Handler,
}

impl DataShape {
    pub const fn layout(self) -> ShapeLayout {
        match self {
            DataShape::Query | DataShape::QueryRow => ShapeLayout {
                leading_args: 1,
                handler: Handler::Rows,
            },
            DataShape::QueryContext | DataShape::QueryRowContext => ShapeLayout {
                leading_args: 2,
                handler: Handler::Rows,
            },
            DataShape::Exec => ShapeLayout {
                leading_args: 1,
                handler: Handler::Exec,
            },
            DataShape::ExecContext => ShapeLayout {
                leading_args: 2,
                handler: Handler::Exec,
            },
        }
    }

    /// Index of the SQL text argument; context forms lead with a `ctx`
    pub const fn sql_arg(self) -> usize {
        self.layout().leading_args - 1
    }

    pub const fn first_bound_arg(self) -> usize {
        self.layout().leading_args
    }

    pub fn name(self) -> &'static str {
        match self {
            DataShape::Query => "Query",
            DataShape::QueryContext => "QueryContext",
            DataShape::Exec => "Exec",
            DataShape::ExecContext => "ExecContext",
            DataShape::QueryRow => "QueryRow",
            DataShape::QueryRowContext => "QueryRowContext",
        }
    }

    /// Whether this shape may run a statement of `kind`
    pub fn accepts(self, kind: StatementKind) -> bool {
        match self.layout().handler {
            Handler::Rows => kind == StatementKind::Select,
            Handler::Exec => matches!(
                kind,
                StatementKind::Insert | StatementKind::Update | StatementKind::Delete
            ),
        }
    }

    /// Statement family this shape expects, for diagnostics
    pub fn expected_family(self) -> &'static str {
        match self.layout().handler {
            Handler::Rows => "SELECT",
            Handler::Exec => "INSERT, UPDATE or DELETE",
        }
    }
}

impl fmt::Display for DataShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl CallShape {
    pub fn from_method(name: &str) -> Option<Self> {
        let shape = match name {
            "Query" => CallShape::Data(DataShape::Query),
            "QueryContext" => CallShape::Data(DataShape::QueryContext),
            "Exec" => CallShape::Data(DataShape::Exec),
            "ExecContext" => CallShape::Data(DataShape::ExecContext),
            "QueryRow" => CallShape::Data(DataShape::QueryRow),
            "QueryRowContext" => CallShape::Data(DataShape::QueryRowContext),
            "Scan" => CallShape::Scan,
            _ => return None,
        };
        Some(shape)
    }
}

/// A recognized data call with its argument layout resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataCall {
    pub shape: DataShape,
    pub sql_arg: usize,
    pub first_bound_arg: usize,
}

impl DataCall {
    pub fn new(shape: DataShape) -> Self {
        Self {
            shape,
            sql_arg: shape.sql_arg(),
            first_bound_arg: shape.first_bound_arg(),
        }
    }

    /// The call must at least carry its leading arguments
    pub fn check_arity(&self, call: &CallSite) -> Result<(), Mismatch> {
        if call.args.len() < self.first_bound_arg {
            return Err(Mismatch::MissingArguments {
                shape: self.shape,
                required: self.first_bound_arg,
                supplied: call.args.len(),
            });
        }
        Ok(())
    }
}

/// Result of classifying a call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Data(DataCall),
    ReadBack,
}

/// Decide whether a call site is one of the recognized shapes
pub fn classify(call: &CallSite) -> Option<Classified> {
    match CallShape::from_method(&call.method)? {
        CallShape::Data(shape) => Some(Classified::Data(DataCall::new(shape))),
        CallShape::Scan => Some(Classified::ReadBack),
    }
}
