//! Integration Test: Sleep Prohibition
//!
//! **Policy**: no sleep calls anywhere in the UI crates, tests included.
//! Lifecycle code waits on template fetches and surface detaches, never on
//! time. Tests that need an operation to be in flight park it on a
//! `tokio::sync::Notify` instead of sleeping.

use architectural_enforcement::{code_part, rust_files, scan, PRODUCTION_DIRS, TEST_DIRS};

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Test that no production or test code calls sleep()
#[test]
fn test_no_sleep_calls() {
    let files: Vec<_> = PRODUCTION_DIRS
        .iter()
        .chain(TEST_DIRS)
        .flat_map(|dir| rust_files(dir))
        .collect();
    assert!(!files.is_empty(), "No source files found to scan");

    let violations = scan(&files, |lines, idx| {
        is_sleep_call(code_part(&lines[idx])).then(|| lines[idx].trim().to_string())
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Wait on the event itself (Notify, oneshot, the awaited future).");

        panic!("\nFound {} sleep violation(s).", violations.len());
    }
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(!is_sleep_call("let asleep = false;"));
}
