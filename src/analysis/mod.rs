//! Per-file analysis: one forward walk over a Go syntax tree that checks every
//! recognized database call and keeps the local bindings `Scan` calls need.

use std::fmt;

use anyhow::Result;
use tracing::debug;
use tree_sitter::{Node, Tree};

use crate::config::{CheckOptions, LimitCounting};
use crate::diagnostics::{DiagnosticKind, Position};
use crate::sql::{self, StatementKind, StatementShape};
use crate::syntax::{self, node_text, CallSite};

pub mod classify;
pub mod correlate;
pub mod reconcile;
pub mod scope;

use classify::{classify, Classified, DataCall, DataShape};
use correlate::ReadBackCorrelator;
use reconcile::reconcile;
use scope::{Binding, ScopeStack};

/// A problem worth reporting at a call site
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    #[error("{shape}: call needs at least {required} argument(s) but has {supplied}")]
    MissingArguments {
        shape: DataShape,
        required: usize,
        supplied: usize,
    },
    #[error("{shape}: statement has {required} placeholder(s) but {supplied} argument(s) were supplied")]
    ArgumentCount {
        shape: DataShape,
        required: usize,
        supplied: usize,
    },
    #[error("Scan: {supplied} destination(s) but the {producer} call at {at} yields {expected} {unit}")]
    ReadBack {
        producer: DataShape,
        at: Position,
        expected: usize,
        supplied: usize,
        unit: &'static str,
    },
    #[error("{shape}: expected {expected} statement, found {found}")]
    UnsupportedStatement {
        shape: DataShape,
        expected: &'static str,
        found: StatementKind,
    },
}

impl Mismatch {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Mismatch::MissingArguments { .. } | Mismatch::ArgumentCount { .. } => {
                DiagnosticKind::StructuralArgMismatch
            }
            Mismatch::ReadBack { .. } => DiagnosticKind::ReadBackMismatch,
            Mismatch::UnsupportedStatement { .. } => DiagnosticKind::UnsupportedStatementKind,
        }
    }
}

/// Why a call site could not be analyzed. Never reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NonLiteralSql,
    ParseError(String),
    EmptyStatement,
    /// Not SELECT / INSERT / UPDATE / DELETE
    OutOfScopeStatement,
    SpreadDestinations,
    UnresolvedReceiver,
    UnrecognizedProducer,
    ProducerRejected,
    UnknownColumns,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NonLiteralSql => f.write_str("SQL argument is not a string literal"),
            SkipReason::ParseError(e) => write!(f, "SQL does not parse: {}", e),
            SkipReason::EmptyStatement => f.write_str("SQL holds no statement"),
            SkipReason::OutOfScopeStatement => f.write_str("statement kind is not checked"),
            SkipReason::SpreadDestinations => f.write_str("scan destinations are spread"),
            SkipReason::UnresolvedReceiver => f.write_str("scan receiver has no unique producer"),
            SkipReason::UnrecognizedProducer => {
                f.write_str("scan receiver is not produced by a recognized query")
            }
            SkipReason::ProducerRejected => f.write_str("producing query failed its own check"),
            SkipReason::UnknownColumns => f.write_str("result columns cannot be counted"),
        }
    }
}

/// What a data call binds once it passes its checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub placeholders: usize,
    pub result_columns: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Accepted),
    Skipped(SkipReason),
}

/// Run a data call through parse, count and reconcile
pub fn evaluate(
    data: DataCall,
    call: &CallSite,
    limits: LimitCounting,
) -> Result<Outcome, Mismatch> {
    data.check_arity(call)?;

    let Some(text) = call.args[data.sql_arg].as_literal() else {
        return Ok(Outcome::Skipped(SkipReason::NonLiteralSql));
    };
    let stmt = match sql::parse_first(text) {
        Ok(Some(stmt)) => stmt,
        Ok(None) => return Ok(Outcome::Skipped(SkipReason::EmptyStatement)),
        Err(e) => return Ok(Outcome::Skipped(SkipReason::ParseError(e.to_string()))),
    };
    let Some(shape) = StatementShape::from_statement(&stmt) else {
        return Ok(Outcome::Skipped(SkipReason::OutOfScopeStatement));
    };
    if !data.shape.accepts(shape.kind) {
        return Err(Mismatch::UnsupportedStatement {
            shape: data.shape,
            expected: data.shape.expected_family(),
            found: shape.kind,
        });
    }

    let required = sql::count(&shape, limits);
    let placeholders = reconcile(
        data.shape,
        required,
        call.args_from(data.first_bound_arg),
        call.spread,
    )?;
    Ok(Outcome::Accepted(Accepted {
        placeholders,
        result_columns: shape.result_columns,
    }))
}

/// A mismatch found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub position: Position,
    pub mismatch: Mismatch,
}

/// Node kinds that open a lexical scope
const SCOPE_KINDS: &[&str] = &[
    "source_file",
    "function_declaration",
    "method_declaration",
    "func_literal",
    "block",
    "if_statement",
    "for_statement",
    "expression_switch_statement",
    "type_switch_statement",
    "select_statement",
    "expression_case",
    "default_case",
    "type_case",
    "communication_case",
];

const FUNCTION_KINDS: &[&str] = &["function_declaration", "method_declaration", "func_literal"];

/// Analyze Go source text
pub fn analyze_source(source: &str, options: &CheckOptions) -> Result<Vec<Finding>> {
    let tree = syntax::parse(source)?;
    Ok(analyze_tree(&tree, source, options))
}

/// Analyze an already parsed Go tree
pub fn analyze_tree(tree: &Tree, source: &str, options: &CheckOptions) -> Vec<Finding> {
    let mut analyzer = FileAnalyzer {
        source,
        options,
        scopes: ScopeStack::new(),
        findings: Vec::new(),
    };
    analyzer.visit(&tree.root_node());
    analyzer.findings
}

struct FileAnalyzer<'a> {
    source: &'a str,
    options: &'a CheckOptions,
    scopes: ScopeStack,
    findings: Vec<Finding>,
}

impl FileAnalyzer<'_> {
    fn visit(&mut self, node: &Node) {
        let kind = node.kind();
        let scoped = SCOPE_KINDS.contains(&kind);
        if scoped {
            self.scopes.push();
        }

        match kind {
            "call_expression" => {
                if let Some(call) = CallSite::from_node(node, self.source) {
                    self.check_call(&call);
                }
            }
            "parameter_declaration" | "variadic_parameter_declaration" => {
                self.declare_parameters(node)
            }
            "type_switch_statement" => {
                for name in self.names(node.child_by_field_name("alias")) {
                    self.scopes.declare(&name, Binding::Opaque);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(&child);
        }

        // Names come into scope after their initializer has been walked
        match kind {
            "short_var_declaration" => self.bind_short_var(node),
            "var_spec" => self.bind_var_spec(node),
            "assignment_statement" => self.bind_assignment(node),
            "range_clause" => self.bind_range(node),
            _ => {}
        }

        if scoped {
            self.scopes.pop();
        }
    }

    fn check_call(&mut self, call: &CallSite) {
        let result = match classify(call) {
            None => return,
            Some(Classified::Data(data)) => evaluate(data, call, self.options.limit_counting),
            Some(Classified::ReadBack) => {
                ReadBackCorrelator::new(&self.scopes, self.options.read_back_basis)
                    .limit_counting(self.options.limit_counting)
                    .correlate(call)
            }
        };
        match result {
            Ok(Outcome::Accepted(_)) => {}
            Ok(Outcome::Skipped(reason)) => {
                debug!(
                    line = call.position.line,
                    column = call.position.column,
                    method = %call.method,
                    %reason,
                    "skipping call site"
                );
            }
            Err(mismatch) => self.findings.push(Finding {
                position: call.position,
                mismatch,
            }),
        }
    }

    /// Identifier text of each named child of an expression list, by position
    fn names(&self, list: Option<Node>) -> Vec<String> {
        self.list_items(list)
            .iter()
            .map(|item| match item.kind() {
                "identifier" => node_text(item, self.source).to_string(),
                // Selectors, index expressions etc. are not local names
                _ => String::new(),
            })
            .collect()
    }

    fn list_items<'t>(&self, list: Option<Node<'t>>) -> Vec<Node<'t>> {
        let Some(list) = list else {
            return Vec::new();
        };
        if list.kind() != "expression_list" {
            return vec![list];
        }
        let mut cursor = list.walk();
        let items = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();
        items
    }

    /// Binding for the `index`-th of `count` names given the right-hand side
    fn binding_for(&self, values: &[Node], count: usize, index: usize) -> Binding {
        let value = if values.len() == count {
            values.get(index)
        } else if values.len() == 1 {
            values.first()
        } else {
            None
        };
        value
            .and_then(|node| CallSite::from_node(node, self.source))
            .map(Binding::Defined)
            .unwrap_or(Binding::Opaque)
    }

    fn bind_short_var(&mut self, node: &Node) {
        let names = self.names(node.child_by_field_name("left"));
        let values = self.list_items(node.child_by_field_name("right"));
        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let binding = self.binding_for(&values, names.len(), index);
            if self.scopes.declared_here(name) {
                self.scopes.assign(name, binding);
            } else {
                self.scopes.declare(name, binding);
            }
        }
    }

    fn bind_var_spec(&mut self, node: &Node) {
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| node_text(&n, self.source).to_string())
            .collect();
        let value = node.child_by_field_name("value");
        let values = self.list_items(value);
        for (index, name) in names.iter().enumerate() {
            let binding = match value {
                None => Binding::Declared,
                Some(_) => self.binding_for(&values, names.len(), index),
            };
            self.scopes.declare(name, binding);
        }
    }

    fn bind_assignment(&mut self, node: &Node) {
        let plain = node
            .child_by_field_name("operator")
            .is_some_and(|op| node_text(&op, self.source) == "=");
        let names = self.names(node.child_by_field_name("left"));
        let values = self.list_items(node.child_by_field_name("right"));
        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let binding = if plain {
                self.binding_for(&values, names.len(), index)
            } else {
                Binding::Opaque
            };
            self.scopes.assign(name, binding);
        }
    }

    fn bind_range(&mut self, node: &Node) {
        let mut cursor = node.walk();
        let declares = node.children(&mut cursor).any(|c| c.kind() == ":=");
        for name in self.names(node.child_by_field_name("left")) {
            if name.is_empty() {
                continue;
            }
            if declares {
                self.scopes.declare(&name, Binding::Opaque);
            } else {
                self.scopes.assign(&name, Binding::Opaque);
            }
        }
    }

    /// Parameters, results and receivers of a function shadow outer names
    fn declare_parameters(&mut self, node: &Node) {
        let owner = node.parent().and_then(|list| list.parent());
        if !owner.is_some_and(|o| FUNCTION_KINDS.contains(&o.kind())) {
            return;
        }
        let mut cursor = node.walk();
        let names: Vec<String> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| node_text(&n, self.source).to_string())
            .collect();
        for name in names {
            self.scopes.declare(&name, Binding::Opaque);
        }
    }
}
