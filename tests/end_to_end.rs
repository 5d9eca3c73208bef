//! Runs the checker over the Go fixtures in tests/fixtures.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use sqlph::check;
use sqlph::{CheckOptions, DiagnosticKind, ReadBackBasis};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// (line, kind) of every diagnostic for a single fixture
fn check_fixture(name: &str, options: &CheckOptions) -> Result<Vec<(usize, DiagnosticKind)>> {
    let diagnostics = check::check_file(&fixture(name), options)?;
    Ok(diagnostics
        .iter()
        .map(|d| (d.position.line, d.kind))
        .collect())
}

#[test]
fn test_extra_arguments_are_reported() -> Result<()> {
    let diagnostics = check::check_file(&fixture("extra_args.go"), &CheckOptions::default())?;
    assert_eq!(diagnostics.len(), 1);

    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::StructuralArgMismatch);
    assert_eq!((diagnostic.position.line, diagnostic.position.column), (13, 2));
    assert!(diagnostic
        .to_string()
        .ends_with("extra_args.go:13:2: Query: statement has 1 placeholder(s) but 3 argument(s) were supplied"));
    Ok(())
}

#[test]
fn test_scan_compared_with_producer_placeholders() -> Result<()> {
    assert_eq!(
        check_fixture("scan_readback.go", &CheckOptions::default())?,
        vec![(10, DiagnosticKind::ReadBackMismatch)]
    );
    Ok(())
}

#[test]
fn test_multi_row_insert_is_clean() -> Result<()> {
    assert!(check_fixture("insert_rows.go", &CheckOptions::default())?.is_empty());
    Ok(())
}

#[test]
fn test_non_literal_sql_is_never_reported() -> Result<()> {
    assert!(check_fixture("concatenated.go", &CheckOptions::default())?.is_empty());
    Ok(())
}

#[test]
fn test_mixed_call_shapes() -> Result<()> {
    assert_eq!(
        check_fixture("mixed.go", &CheckOptions::default())?,
        vec![
            (14, DiagnosticKind::ReadBackMismatch),
            (19, DiagnosticKind::UnsupportedStatementKind),
            (25, DiagnosticKind::StructuralArgMismatch),
        ]
    );
    Ok(())
}

#[test]
fn test_scan_basis_selects_the_comparison() -> Result<()> {
    let parameters = check_fixture("columns.go", &CheckOptions::default())?;
    assert_eq!(parameters, vec![(7, DiagnosticKind::ReadBackMismatch)]);

    let columns = CheckOptions {
        read_back_basis: ReadBackBasis::Columns,
        ..CheckOptions::default()
    };
    assert!(check_fixture("columns.go", &columns)?.is_empty());
    // One selected column, two destinations
    assert_eq!(
        check_fixture("scan_readback.go", &columns)?,
        vec![(10, DiagnosticKind::ReadBackMismatch)]
    );
    Ok(())
}

#[test]
fn test_fixture_directory_as_package() -> Result<()> {
    let target = fixture("").display().to_string();
    let report = check::execute(&[target], &CheckOptions::default())?;
    assert_eq!(report.files_checked, 6);
    assert_eq!(report.diagnostics.len(), 6);

    let mut sorted = report.diagnostics.clone();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    assert_eq!(sorted, report.diagnostics);
    Ok(())
}

#[test]
fn test_recursive_pattern_and_test_files() -> Result<()> {
    let temp = TempDir::new()?;
    let pkg = temp.path().join("internal").join("store");
    fs::create_dir_all(&pkg)?;
    fs::copy(fixture("extra_args.go"), pkg.join("accounts.go"))?;
    fs::copy(fixture("scan_readback.go"), pkg.join("accounts_test.go"))?;

    let pattern = format!("{}/...", temp.path().display());
    let all = check::execute(&[pattern.clone()], &CheckOptions::default())?;
    assert_eq!(all.files_checked, 2);
    assert_eq!(all.diagnostics.len(), 2);

    let without_tests = CheckOptions {
        include_tests: false,
        ..CheckOptions::default()
    };
    let report = check::execute(&[pattern], &without_tests)?;
    assert_eq!(report.files_checked, 1);
    assert_eq!(
        report.diagnostics[0].kind,
        DiagnosticKind::StructuralArgMismatch
    );
    Ok(())
}

#[test]
fn test_json_output_shape() -> Result<()> {
    let diagnostics = check::check_file(&fixture("scan_readback.go"), &CheckOptions::default())?;
    let value = serde_json::to_value(&diagnostics)?;
    let first = &value[0];
    assert_eq!(first["line"], 10);
    assert_eq!(first["column"], 2);
    assert_eq!(first["kind"], "read_back_mismatch");
    assert_eq!(
        first["message"],
        "Scan: 2 destination(s) but the Query call at 9:13 yields 1 placeholder(s)"
    );
    Ok(())
}
