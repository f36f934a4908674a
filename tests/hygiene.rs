//! Source hygiene for the engine (`canvas/src`) and the host crate (`src`).
//!
//! Test files are excluded. Editor sessions are long-lived, so anything that
//! can abort the process has a zero budget in both trees. Budgets only ever
//! go down.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::{Path, PathBuf};

const ENGINE: &str = "canvas/src";
const HOST: &str = "src";

/// Only the binary talks to stdout/stderr directly; everything else logs.
const CONSOLE_ALLOWED: &str = "main.rs";

struct SourceFile {
    path: PathBuf,
    content: String,
}

fn source_files(tree: &str) -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(&Path::new(env!("CARGO_MANIFEST_DIR")).join(tree), &mut files);
    assert!(!files.is_empty(), "no sources found under {tree}");
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path, content });
            }
        }
    }
}

/// Lines containing `pattern`, per file, for files accepted by `include`.
fn hits(files: &[SourceFile], pattern: &str, include: impl Fn(&Path) -> bool) -> Vec<(String, usize)> {
    files
        .iter()
        .filter(|f| include(&f.path))
        .filter_map(|f| {
            let count = f.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (f.path.display().to_string(), count))
        })
        .collect()
}

fn assert_budget(tree: &str, pattern: &str, max: usize, found: &[(String, usize)]) {
    let count: usize = found.iter().map(|(_, c)| c).sum();
    let detail: Vec<String> = found.iter().map(|(p, c)| format!("  {p}: {c}")).collect();
    assert!(
        count <= max,
        "{pattern} budget exceeded in {tree}: found {count}, max {max}.\n{}",
        detail.join("\n")
    );
}

/// Check `pattern` against a budget for each tree.
fn check(pattern: &str, budgets: &[(&str, usize)]) {
    for &(tree, max) in budgets {
        let files = source_files(tree);
        assert_budget(tree, pattern, max, &hits(&files, pattern, |_| true));
    }
}

// =============================================================
// Panics
// =============================================================

#[test]
fn unwrap_budget() {
    check(".unwrap()", &[(ENGINE, 0), (HOST, 0)]);
}

#[test]
fn expect_budget() {
    check(".expect(", &[(ENGINE, 0), (HOST, 0)]);
}

#[test]
fn panic_budget() {
    check("panic!(", &[(ENGINE, 0), (HOST, 0)]);
}

#[test]
fn unreachable_budget() {
    check("unreachable!(", &[(ENGINE, 0), (HOST, 0)]);
}

#[test]
fn stub_budget() {
    check("todo!(", &[(ENGINE, 0), (HOST, 0)]);
    check("unimplemented!(", &[(ENGINE, 0), (HOST, 0)]);
}

// =============================================================
// Silent loss
// =============================================================

#[test]
fn silent_discard_budget() {
    check("let _ =", &[(ENGINE, 0), (HOST, 0)]);
}

// Host: env lookup and numeric fallbacks in settings.rs.
#[test]
fn dot_ok_budget() {
    check(".ok()", &[(ENGINE, 0), (HOST, 2)]);
}

#[test]
fn allow_dead_code_budget() {
    check("#[allow(dead_code)]", &[(ENGINE, 0), (HOST, 0)]);
}

// =============================================================
// Console output
// =============================================================

#[test]
fn console_output_only_in_binary() {
    for tree in [ENGINE, HOST] {
        let files = source_files(tree);
        let outside_main = |p: &Path| !p.ends_with(CONSOLE_ALLOWED);
        assert_budget(tree, "println!(", 0, &hits(&files, "println!(", outside_main));
    }
}
