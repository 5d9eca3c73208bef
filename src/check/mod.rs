//! Driver: resolve targets, analyze every file in parallel, and collect the
//! diagnostics into a deterministic report.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::analysis;
use crate::config::CheckOptions;
use crate::diagnostics::Diagnostic;
use crate::syntax;

pub mod discovery;

/// Result of a check run
#[derive(Debug, Default)]
pub struct Report {
    pub files_checked: usize,
    /// Sorted by file, line, column
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Check every Go file the targets expand to
pub fn execute(targets: &[String], options: &CheckOptions) -> Result<Report> {
    let files = discovery::find_files(targets, options.include_tests)?;
    info!(files = files.len(), "checking Go files");
    check_files(&files, options)
}

/// Check an explicit list of files
pub fn check_files(files: &[PathBuf], options: &CheckOptions) -> Result<Report> {
    let per_file: Vec<Vec<Diagnostic>> = files
        .par_iter()
        .map(|path| check_file(path, options))
        .collect::<Result<_>>()?;

    let mut diagnostics: Vec<Diagnostic> = per_file.into_iter().flatten().collect();
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    info!(
        files = files.len(),
        diagnostics = diagnostics.len(),
        "check finished"
    );

    Ok(Report {
        files_checked: files.len(),
        diagnostics,
    })
}

/// Analyze a single Go file
pub fn check_file(path: &Path, options: &CheckOptions) -> Result<Vec<Diagnostic>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tree = syntax::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))?;
    if tree.root_node().has_error() {
        // Still analyzed: tree-sitter recovers around the broken region
        warn!(file = %path.display(), "Go syntax errors in file");
    }

    Ok(analysis::analyze_tree(&tree, &source, options)
        .into_iter()
        .map(|finding| Diagnostic::from_finding(path, finding))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use std::fs;
    use tempfile::TempDir;

    const MISSING_ARG: &str = "package p\n\nfunc f() {\n\tdb.Exec(\"delete from t where id = ?\")\n}\n";

    #[test]
    fn test_diagnostics_are_sorted_across_files() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("b.go"), MISSING_ARG)?;
        fs::write(
            temp.path().join("a.go"),
            "package p\n\nfunc g() {\n\tdb.Query(\"select 1 from t where a = ?\")\n\tdb.Exec(\"delete from t\", 1)\n}\n",
        )?;

        let report = execute(
            &[format!("{}/...", temp.path().display())],
            &CheckOptions::default(),
        )?;
        assert_eq!(report.files_checked, 2);
        let lines: Vec<(String, usize)> = report
            .diagnostics
            .iter()
            .map(|d| {
                let name = d.file.file_name().map(|n| n.to_string_lossy().into_owned());
                (name.unwrap_or_default(), d.position.line)
            })
            .collect();
        assert_eq!(
            lines,
            vec![
                ("a.go".to_string(), 4),
                ("a.go".to_string(), 5),
                ("b.go".to_string(), 4),
            ]
        );
        assert!(report
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::StructuralArgMismatch));
        Ok(())
    }

    #[test]
    fn test_file_with_syntax_errors_is_still_checked() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("broken.go");
        fs::write(&path, format!("{}\nfunc h() {{\n\tx := \n}}\n", MISSING_ARG))?;
        let diagnostics = check_file(&path, &CheckOptions::default())?;
        assert_eq!(diagnostics.len(), 1);
        Ok(())
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let missing = PathBuf::from("/nonexistent/dir/x.go");
        assert!(check_files(&[missing], &CheckOptions::default()).is_err());
    }

    #[test]
    fn test_empty_target_set_is_clean() -> Result<()> {
        let temp = TempDir::new()?;
        let report = execute(
            &[format!("{}/...", temp.path().display())],
            &CheckOptions::default(),
        )?;
        assert!(report.is_clean());
        assert_eq!(report.files_checked, 0);
        Ok(())
    }
}
