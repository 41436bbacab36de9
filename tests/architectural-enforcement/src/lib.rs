//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The engine only moves on virtual time (no wall clock in reel-core)
//! - No sleep() calls outside the real-time driver
//!
//! The helpers below scan source trees line by line. Comments and everything
//! after a file's `#[cfg(test)]` marker are ignored.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden pattern found in production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Workspace root, two levels above this crate
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir`, sorted
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// The code part of a line (text before `//`)
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Lines of production code, numbered from 1
///
/// Scanning stops at the first inline `#[cfg(test)] mod ... {` block.
/// A `#[cfg(test)] mod foo;` declaration only hides that one line.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    let lines: Vec<&str> = content.lines().collect();
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < lines.len() {
        if lines[idx].trim() == "#[cfg(test)]" {
            let next = lines.get(idx + 1).map_or("", |l| l.trim());
            if next.ends_with('{') {
                break;
            }
            idx += 2;
            continue;
        }
        out.push((idx + 1, lines[idx]));
        idx += 1;
    }
    out
}

/// Find lines in `content` whose code contains any of `patterns`
#[must_use]
pub fn scan_source(path: &Path, content: &str, patterns: &[&str]) -> Vec<Violation> {
    production_lines(content)
        .into_iter()
        .filter(|(_, line)| {
            let code = code_part(line);
            patterns.iter().any(|p| code.contains(p))
        })
        .map(|(line, text)| Violation {
            path: path.to_path_buf(),
            line,
            text: text.trim().to_string(),
        })
        .collect()
}

/// Scan every file under `dir` except those whose name is in `allowed_files`
///
/// A missing directory is reported as a violation so a moved crate cannot
/// silently disable a rule.
#[must_use]
pub fn find_violations(dir: &Path, patterns: &[&str], allowed_files: &[&str]) -> Vec<Violation> {
    if !dir.exists() {
        return vec![Violation {
            path: dir.to_path_buf(),
            line: 0,
            text: "directory not found".to_string(),
        }];
    }

    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let allowed = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| allowed_files.contains(&name));
        if allowed {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        violations.extend(scan_source(&path, &content, patterns));
    }
    violations
}

/// Panic with a readable report if `violations` is not empty
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s) of: {rule}\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_ignored() {
        let found = scan_source(
            Path::new("x.rs"),
            "// std::thread::sleep(d)\nlet x = 1; // tokio::time::sleep(d)\n",
            &["::sleep("],
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_test_module_ignored() {
        let content = "fn run() {}\n#[cfg(test)]\nmod tests {\n    std::thread::sleep(d);\n}\n";
        assert!(scan_source(Path::new("x.rs"), content, &["::sleep("]).is_empty());
    }

    #[test]
    fn test_cfg_test_declaration_skips_one_line() {
        let content = "#[cfg(test)]\nmod support;\nfn run() { std::thread::sleep(d); }\n";
        let found = scan_source(Path::new("x.rs"), content, &["::sleep("]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 3);
    }

    #[test]
    fn test_violation_reported_with_line() {
        let content = "fn run() {\n    std::thread::sleep(d);\n}\n";
        let found = scan_source(Path::new("x.rs"), content, &["::sleep("]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
        assert_eq!(found[0].to_string(), "x.rs:2 - std::thread::sleep(d);");
    }

    #[test]
    fn test_missing_directory_is_a_violation() {
        let found = find_violations(Path::new("/nonexistent/src"), &["x"], &[]);
        assert_eq!(found.len(), 1);
    }
}
