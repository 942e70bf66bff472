//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions in the UI crates MUST NOT use blocking I/O.
//! **Required**: `tokio::fs`, `tokio::net`, `tokio::process` inside async code.
//! **Exceptions**: non-async functions (config loading before the runtime
//! starts, CLI setup) and test code.

use architectural_enforcement::{
    code_part, enclosing_fn_is_async, is_in_test_code, rust_files, scan, Violation,
    PRODUCTION_DIRS,
};

/// Blocking calls and what to report for them
const FORBIDDEN: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::thread::sleep", "Blocking sleep"),
];

fn blocking_io_violations(files: &[std::path::PathBuf]) -> Vec<Violation> {
    scan(files, |lines, idx| {
        let code = code_part(&lines[idx]);
        let (_, what) = FORBIDDEN.iter().find(|(pattern, _)| code.contains(pattern))?;

        if is_in_test_code(lines, idx) {
            return None;
        }
        // Only async functions are held to this; sync setup code may block.
        if enclosing_fn_is_async(lines, idx) != Some(true) {
            return None;
        }
        Some(format!("{what}: {}", lines[idx].trim()))
    })
}

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let files: Vec<_> = PRODUCTION_DIRS.iter().flat_map(|dir| rust_files(dir)).collect();
    assert!(!files.is_empty(), "No source files found to scan");

    let violations = blocking_io_violations(&files);
    if !violations.is_empty() {
        eprintln!("\n❌ Blocking I/O found in async code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::fs / tokio::net / tokio::process inside async functions.");

        panic!(
            "\nFound {} blocking I/O violation(s) in async code.",
            violations.len()
        );
    }
}

#[test]
fn test_detector_flags_async_fs_read() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.rs");
    std::fs::write(
        &file,
        "pub async fn load() {\n    let t = std::fs::read_to_string(\"x\");\n}\n\
         pub fn setup() {\n    let t = std::fs::read_to_string(\"y\");\n}\n",
    )
    .unwrap();

    let violations = blocking_io_violations(&[file]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].line, 2);
}
