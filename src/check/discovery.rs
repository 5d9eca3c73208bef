use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Suffix that marks a recursive package pattern (`./...`)
const RECURSIVE_SUFFIX: &str = "...";

/// Directories the Go tool never treats as packages
const SKIP_DIRS: &[&str] = &["testdata", "vendor"];

/// Expand command-line targets into the Go files to check.
///
/// A target is a `.go` file, a package directory (its own files only), or a
/// `dir/...` pattern covering every package below `dir`.
pub fn find_files(targets: &[String], include_tests: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for target in targets {
        if let Some(root) = recursive_root(target) {
            files.extend(walk_packages(&root, include_tests)?);
            continue;
        }

        let path = PathBuf::from(target);
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Cannot access target {}", path.display()))?;
        if metadata.is_dir() {
            files.extend(package_files(&path, include_tests)?);
        } else if is_go_file(&path) {
            // Named files are checked even when they are tests
            files.push(path);
        } else {
            bail!("Not a Go file or directory: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "discovered Go files");
    Ok(files)
}

fn recursive_root(target: &str) -> Option<PathBuf> {
    let prefix = target.strip_suffix(RECURSIVE_SUFFIX)?;
    let prefix = prefix.trim_end_matches('/');
    Some(if prefix.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(prefix)
    })
}

fn walk_packages(root: &Path, include_tests: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_type().is_dir() || !is_skipped_dir(e.path()))
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && is_go_file(path) && (include_tests || !is_test_file(path))
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn package_files(dir: &Path, include_tests: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_go_file(&path) && (include_tests || !is_test_file(&path)) {
            files.push(path);
        }
    }
    Ok(files)
}

fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name.starts_with('.') || name.starts_with('_') || SKIP_DIRS.contains(&name)
        })
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("_test.go"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn target(path: &Path, suffix: &str) -> String {
        format!("{}{}", path.display(), suffix)
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .filter_map(|f| f.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_recursive_pattern_skips_hidden_and_vendor_dirs() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();

        fs::write(root.join("main.go"), "package main")?;
        fs::write(root.join("README.md"), "# docs")?;
        for dir in ["store", ".git", "vendor", "testdata", "_old"] {
            fs::create_dir(root.join(dir))?;
            fs::write(root.join(dir).join(format!("{}.go", dir.trim_start_matches(['.', '_']))), "package x")?;
        }

        let files = find_files(&[target(root, "/...")], true)?;
        assert_eq!(names(&files), vec!["main.go", "store.go"]);
        Ok(())
    }

    #[test]
    fn test_package_directory_is_not_recursive() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        fs::write(root.join("a.go"), "package a")?;
        fs::create_dir(root.join("sub"))?;
        fs::write(root.join("sub").join("b.go"), "package sub")?;

        let files = find_files(&[target(root, "")], true)?;
        assert_eq!(names(&files), vec!["a.go"]);
        Ok(())
    }

    #[test]
    fn test_exclude_tests_applies_to_discovery_only() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        fs::write(root.join("db.go"), "package db")?;
        fs::write(root.join("db_test.go"), "package db")?;

        let discovered = find_files(&[target(root, "/...")], false)?;
        assert_eq!(names(&discovered), vec!["db.go"]);

        let named = find_files(&[target(&root.join("db_test.go"), "")], false)?;
        assert_eq!(names(&named), vec!["db_test.go"]);
        Ok(())
    }

    #[test]
    fn test_duplicate_targets_are_collapsed() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        fs::write(root.join("a.go"), "package a")?;

        let files = find_files(&[target(root, "/..."), target(&root.join("a.go"), "")], true)?;
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_and_non_go_targets_fail() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path();
        fs::write(root.join("notes.txt"), "hello")?;

        assert!(find_files(&[target(&root.join("missing.go"), "")], true).is_err());
        assert!(find_files(&[target(&root.join("notes.txt"), "")], true).is_err());
        assert!(find_files(&[target(&root.join("missing"), "/...")], true).is_err());
        Ok(())
    }

    #[test]
    fn test_recursive_root() {
        assert_eq!(recursive_root("./..."), Some(PathBuf::from(".")));
        assert_eq!(recursive_root("..."), Some(PathBuf::from(".")));
        assert_eq!(recursive_root("pkg/store/..."), Some(PathBuf::from("pkg/store")));
        assert_eq!(recursive_root("pkg/store"), None);
    }
}
