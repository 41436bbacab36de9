//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Nothing waits by sleeping except the real-time driver, which
//! sleeps until the next due wake. Animation timing lives in the virtual
//! timer queue; the TUI loop waits through the driver.
//! **Exceptions**: `reel/core/src/driver.rs`, test code

use architectural_enforcement::{assert_clean, find_violations, workspace_root};

const SLEEP_PATTERNS: &[&str] = &["::sleep(", ".sleep(", "::sleep_until(", "thread::sleep"];

#[test]
fn test_no_sleep_in_engine() {
    let violations = find_violations(
        &workspace_root().join("reel/core/src"),
        SLEEP_PATTERNS,
        &["driver.rs"],
    );
    assert_clean("sleep outside the real-time driver (reel-core)", &violations);
}

#[test]
fn test_no_sleep_in_tui() {
    let violations = find_violations(&workspace_root().join("tui/src"), SLEEP_PATTERNS, &[]);
    assert_clean("sleep in the TUI (wait through RealtimeDriver instead)", &violations);
}
