//! Custom assertion helpers for tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tracing::error;

#[must_use]
pub fn assert_json_has_fields(json_str: &str, fields: &[&str]) -> serde_json::Value {
    let value: serde_json::Value =
        serde_json::from_str(json_str).expect("invalid JSON payload");
    for field in fields {
        if value.get(field).is_none() {
            error!(field, json = %value, "Missing expected JSON field");
            panic!("Missing JSON field: {field}");
        }
    }
    value
}

pub fn assert_no_ansi(output: &str) {
    if output.contains("\u{1b}[") {
        error!("ANSI escape sequence detected");
        panic!("Expected no ANSI escape sequences");
    }
}

pub fn assert_contains_all(output: &str, expected: &[&str]) {
    for needle in expected {
        if !output.contains(needle) {
            error!(needle, "Missing expected substring");
            panic!("Missing expected substring: {needle}\nActual output:\n{output}");
        }
    }
}

/// Every symlink under `root`, sorted. Links are not followed.
#[must_use]
pub fn symlinks_under(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            if meta.file_type().is_symlink() {
                found.push(path);
            } else if meta.is_dir() {
                pending.push(path);
            }
        }
    }
    found.sort();
    found
}

/// Assert `link` is a symlink whose target is exactly `target`.
pub fn assert_link_to(link: &Path, target: &Path) {
    let meta = fs::symlink_metadata(link)
        .unwrap_or_else(|e| panic!("{} does not exist: {e}", link.display()));
    assert!(
        meta.file_type().is_symlink(),
        "{} is not a symlink",
        link.display()
    );
    let actual = fs::read_link(link).expect("read_link failed");
    assert_eq!(actual, target, "{} points elsewhere", link.display());
}

/// Assert `path` exists and is a regular file, not a link.
pub fn assert_regular_file(path: &Path) {
    let meta = fs::symlink_metadata(path)
        .unwrap_or_else(|e| panic!("{} does not exist: {e}", path.display()));
    assert!(meta.is_file(), "{} is not a regular file", path.display());
}
