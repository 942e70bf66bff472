//! Architectural Enforcement Integration Tests
//!
//! This package contains source-scanning tests that enforce how the UI
//! crates are written:
//! - No sleep() calls, in production code or in tests
//! - No blocking I/O inside async functions
//!
//! The scanners are line-based heuristics. They are shared here so each
//! test file only states its policy.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["ui/core/src", "ui/preview/src"];

/// Integration test directories, relative to the workspace root
pub const TEST_DIRS: &[&str] = &["ui/core/tests"];

/// One rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What was found
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.message)
    }
}

/// Workspace root, two levels above this crate
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Read a source file into lines; unreadable files yield nothing
#[must_use]
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// The part of a line before any `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether a trimmed line declares a function, and if so whether it is async
///
/// Recognises visibility and qualifier prefixes such as `pub(crate) async fn`.
#[must_use]
pub fn fn_declaration(line: &str) -> Option<bool> {
    let mut rest = line.trim();
    loop {
        if let Some(after) = rest.strip_prefix("pub(crate) ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("pub(super) ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("pub ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("const ") {
            rest = after;
        } else if let Some(after) = rest.strip_prefix("unsafe ") {
            rest = after;
        } else {
            break;
        }
    }

    if rest.starts_with("async fn ") {
        Some(true)
    } else if rest.starts_with("fn ") {
        Some(false)
    } else {
        None
    }
}

/// Whether the nearest enclosing function of `idx` is async
///
/// Returns `None` when no function is found before a module or impl
/// boundary.
#[must_use]
pub fn enclosing_fn_is_async(lines: &[String], idx: usize) -> Option<bool> {
    for line in lines[..idx].iter().rev() {
        if let Some(is_async) = fn_declaration(line) {
            return Some(is_async);
        }

        let trimmed = line.trim();
        if trimmed.starts_with("mod ") || (trimmed.starts_with("impl") && trimmed.contains('{')) {
            return None;
        }
    }
    None
}

/// Whether `idx` sits in test code: after a `#[cfg(test)]` marker, or in a
/// function tagged `#[test]` / `#[tokio::test]`
#[must_use]
pub fn is_in_test_code(lines: &[String], idx: usize) -> bool {
    if lines[..idx]
        .iter()
        .any(|line| line.trim().starts_with("#[cfg(test)]"))
    {
        return true;
    }

    let Some(fn_idx) = lines[..idx]
        .iter()
        .rposition(|line| fn_declaration(line).is_some())
    else {
        return false;
    };

    for line in lines[..fn_idx].iter().rev() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[test]") || trimmed.starts_with("#[tokio::test") {
            return true;
        }
        if !trimmed.starts_with("#[") && !trimmed.starts_with("///") {
            return false;
        }
    }
    false
}

/// Scan files, reporting each line where `check` returns a message
pub fn scan<F>(files: &[PathBuf], mut check: F) -> Vec<Violation>
where
    F: FnMut(&[String], usize) -> Option<String>,
{
    let mut violations = Vec::new();
    for path in files {
        let lines = read_lines(path);
        for idx in 0..lines.len() {
            if let Some(message) = check(&lines, idx) {
                violations.push(Violation {
                    path: path.clone(),
                    line: idx + 1,
                    message,
                });
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_fn_declaration_prefixes() {
        assert_eq!(fn_declaration("fn main() {"), Some(false));
        assert_eq!(fn_declaration("    pub fn load(path: &Path) {"), Some(false));
        assert_eq!(fn_declaration("pub(crate) async fn run(&self) {"), Some(true));
        assert_eq!(fn_declaration("let f = fn_ptr;"), None);
    }

    #[test]
    fn test_enclosing_fn() {
        let src = lines(&[
            "impl Loader {",
            "    pub async fn fetch(&self) {",
            "        let text = std::fs::read_to_string(path);",
            "    }",
            "}",
        ]);
        assert_eq!(enclosing_fn_is_async(&src, 2), Some(true));
        assert_eq!(enclosing_fn_is_async(&src, 0), None);
    }

    #[test]
    fn test_test_code_detection() {
        let src = lines(&[
            "fn helper() {}",
            "#[tokio::test]",
            "async fn test_it() {",
            "    work().await;",
            "}",
        ]);
        assert!(!is_in_test_code(&src, 0));
        assert!(is_in_test_code(&src, 3));

        let module = lines(&["#[cfg(test)]", "mod tests {", "    fn helper() {}", "}"]);
        assert!(is_in_test_code(&module, 2));
    }
}
