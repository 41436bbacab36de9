//! Integration Test: Wall Clock Prohibition
//!
//! **Policy**: reel-core only knows virtual milliseconds. Reading the clock
//! belongs to the real-time driver; everything else receives `now` from the
//! timer queue, so runs replay exactly under a fixed seed.
//! **Exceptions**: `reel/core/src/driver.rs`, test code

use architectural_enforcement::{assert_clean, find_violations, workspace_root};

const CLOCK_PATTERNS: &[&str] = &[
    "std::time::Instant",
    "SystemTime",
    "Instant::now",
    "tokio::time",
    "chrono::",
];

#[test]
fn test_no_wall_clock_in_engine() {
    let violations = find_violations(
        &workspace_root().join("reel/core/src"),
        CLOCK_PATTERNS,
        &["driver.rs"],
    );
    assert_clean("wall clock read outside the real-time driver", &violations);
}

#[test]
fn test_no_thread_spawn_in_engine() {
    let violations = find_violations(
        &workspace_root().join("reel/core/src"),
        &["thread::spawn", "tokio::spawn", "spawn_blocking"],
        &[],
    );
    assert_clean("engine code spawning tasks (the owner drives the stage)", &violations);
}
