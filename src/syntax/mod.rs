//! Go front end: parses source files with tree-sitter and lifts method-call
//! expressions into [`CallSite`]s the analysis works on.

use anyhow::{Context, Result};
use tree_sitter::{Node, Parser, Tree};

use crate::diagnostics::Position;

pub mod literal;

/// Create a tree-sitter parser for Go
pub fn create_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .context("Failed to set Go language")?;
    Ok(parser)
}

/// Parse Go source into a syntax tree
pub fn parse(source: &str) -> Result<Tree> {
    let mut parser = create_parser()?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse Go source"))
}

/// Source text of a node
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Start of a node as a 1-based position
pub fn position(node: &Node) -> Position {
    let point = node.start_position();
    Position {
        line: point.row + 1,
        column: point.column + 1,
    }
}

/// An argument expression at a call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// A string literal, already unquoted
    StringLiteral(String),
    /// Any other expression, kept as source text
    Expression(String),
}

impl Argument {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Argument::StringLiteral(value) => Some(value),
            Argument::Expression(_) => None,
        }
    }
}

/// What a method is called on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// A plain local name, e.g. `rows` in `rows.Scan(...)`
    Identifier(String),
    /// Another method call, e.g. `db.QueryRow(...)` in `db.QueryRow(...).Scan(...)`
    Call(Box<CallSite>),
    Other,
}

/// A `receiver.Method(args...)` call expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub method: String,
    pub receiver: Receiver,
    pub args: Vec<Argument>,
    /// The last argument is expanded with `...`
    pub spread: bool,
    pub position: Position,
}

impl CallSite {
    /// Lift a `call_expression` node. Returns `None` for anything that is not
    /// a method call through a selector.
    pub fn from_node(node: &Node, source: &str) -> Option<Self> {
        if node.kind() != "call_expression" {
            return None;
        }
        let function = node.child_by_field_name("function")?;
        if function.kind() != "selector_expression" {
            return None;
        }
        let method = node_text(&function.child_by_field_name("field")?, source).to_string();
        let receiver = function
            .child_by_field_name("operand")
            .map(|operand| receiver(&operand, source))
            .unwrap_or(Receiver::Other);

        let mut args = Vec::new();
        let mut spread = false;
        if let Some(list) = node.child_by_field_name("arguments") {
            let mut cursor = list.walk();
            for child in list.children(&mut cursor) {
                match child.kind() {
                    "variadic_argument" => {
                        spread = true;
                        let inner = child.named_child(0).unwrap_or(child);
                        args.push(argument(&inner, source));
                    }
                    "..." => spread = true,
                    "comment" => {}
                    _ if child.is_named() => args.push(argument(&child, source)),
                    _ => {}
                }
            }
        }

        Some(Self {
            method,
            receiver,
            args,
            spread,
            position: position(node),
        })
    }

    /// Arguments from `index` on; empty when the call has fewer
    pub fn args_from(&self, index: usize) -> &[Argument] {
        self.args.get(index..).unwrap_or(&[])
    }
}

fn receiver(operand: &Node, source: &str) -> Receiver {
    match operand.kind() {
        "identifier" => Receiver::Identifier(node_text(operand, source).to_string()),
        "call_expression" => CallSite::from_node(operand, source)
            .map(|call| Receiver::Call(Box::new(call)))
            .unwrap_or(Receiver::Other),
        _ => Receiver::Other,
    }
}

fn argument(node: &Node, source: &str) -> Argument {
    let text = node_text(node, source);
    match node.kind() {
        "interpreted_string_literal" | "raw_string_literal" => literal::unquote(text)
            .map(Argument::StringLiteral)
            .unwrap_or_else(|| Argument::Expression(text.to_string())),
        _ => Argument::Expression(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect every call site in source order
    fn calls(source: &str) -> Result<Vec<CallSite>> {
        let tree = parse(source)?;
        let mut found = Vec::new();
        collect(&tree.root_node(), source, &mut found);
        Ok(found)
    }

    fn collect(node: &Node, source: &str, out: &mut Vec<CallSite>) {
        if let Some(call) = CallSite::from_node(node, source) {
            out.push(call);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            collect(&child, source, out);
        }
    }

    #[test]
    fn test_method_call_with_literal() -> Result<()> {
        let src = "package p\nfunc f() {\n\tt.db.Query(\"select id from t where id = ?\", 1, 2, 3)\n}\n";
        let found = calls(src)?;
        assert_eq!(found.len(), 1);
        let call = &found[0];
        assert_eq!(call.method, "Query");
        assert_eq!(call.receiver, Receiver::Other);
        assert_eq!(call.args.len(), 4);
        assert_eq!(call.args[0].as_literal(), Some("select id from t where id = ?"));
        assert!(!call.spread);
        assert_eq!(call.position, Position { line: 3, column: 2 });
        Ok(())
    }

    #[test]
    fn test_spread_arguments() -> Result<()> {
        let src = "package p\nfunc f() {\n\tdb.Exec(\"delete from t where id = ?\", args...)\n}\n";
        let call = &calls(src)?[0];
        assert!(call.spread);
        assert_eq!(call.args.len(), 2);
        assert_eq!(call.args[1], Argument::Expression("args".to_string()));
        Ok(())
    }

    #[test]
    fn test_concatenated_sql_is_not_literal() -> Result<()> {
        let src = "package p\nfunc f() {\n\tdb.Query(\"select id \" + \"from t\", 1)\n}\n";
        let call = &calls(src)?[0];
        assert_eq!(call.args[0].as_literal(), None);
        Ok(())
    }

    #[test]
    fn test_raw_string_literal() -> Result<()> {
        let src = "package p\nfunc f() {\n\tdb.Query(`select id\nfrom t`)\n}\n";
        let call = &calls(src)?[0];
        assert_eq!(call.args[0].as_literal(), Some("select id\nfrom t"));
        Ok(())
    }

    #[test]
    fn test_receivers() -> Result<()> {
        let src = "package p\nfunc f() {\n\trows.Scan(&id)\n\tdb.QueryRow(\"select 1\").Scan(&id)\n}\n";
        let found = calls(src)?;
        let scans: Vec<_> = found.iter().filter(|c| c.method == "Scan").collect();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0].receiver, Receiver::Identifier("rows".to_string()));
        match &scans[1].receiver {
            Receiver::Call(inner) => assert_eq!(inner.method, "QueryRow"),
            other => panic!("expected chained receiver, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_plain_function_calls_are_ignored() -> Result<()> {
        let src = "package p\nfunc f() {\n\tQuery(\"select 1\")\n}\n";
        assert!(calls(src)?.is_empty());
        Ok(())
    }
}
