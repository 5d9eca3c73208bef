use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::analysis::Finding;

/// 1-based line and column of a call expression in its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Reported diagnostic categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Bound arguments disagree with the statement's placeholders
    StructuralArgMismatch,
    /// A Scan's destinations disagree with its producing query
    ReadBackMismatch,
    /// A call shape received a statement from the wrong family
    UnsupportedStatementKind,
}

/// One reported problem, tied to the file and position of its call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    #[serde(flatten)]
    pub position: Position,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn from_finding(file: &Path, finding: Finding) -> Self {
        Self {
            file: file.to_path_buf(),
            position: finding.position,
            kind: finding.mismatch.kind(),
            message: finding.mismatch.to_string(),
        }
    }

    /// Ordering key for deterministic output across parallel runs
    pub fn sort_key(&self) -> (&PathBuf, Position) {
        (&self.file, self.position)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.file.display(),
            self.position,
            self.message
        )
    }
}
