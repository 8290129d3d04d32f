//! Shared test utilities for the pinguard workspace.
//!
//! `update` rewrites workflow files in place, so integration tests run against a
//! scratch copy of each fixture rather than the checked-in tree.

use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use walkdir::WalkDir;

/// Placeholder written over every run timestamp.
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";
/// Placeholder written over the envelope's `tool.version`.
pub const VERSION_PLACEHOLDER: &str = "__VERSION__";

/// Normalize the fields of a report that change from run to run.
///
/// `tool.version` is only touched on the root envelope. `started_at`, `ended_at`
/// and `duration_ms` are normalized wherever they appear.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "run", "verdict", "findings"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert(
                "version".to_string(),
                Value::String(VERSION_PLACEHOLDER.to_string()),
            );
        }
    }
    normalize_run_timing(&mut value);
    value
}

fn normalize_run_timing(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "ended_at"] {
                if let Some(v) = map.get_mut(key) {
                    *v = Value::String(TIMESTAMP_PLACEHOLDER.to_string());
                }
            }
            if let Some(v) = map.get_mut("duration_ms") {
                *v = Value::Number(0.into());
            }
            map.values_mut().for_each(normalize_run_timing);
        }
        Value::Array(arr) => arr.iter_mut().for_each(normalize_run_timing),
        _ => {}
    }
}

/// Recursively copy `src` into `dst`, creating `dst` if needed.
///
/// Directory structure is preserved; symlinks are not followed.
pub fn copy_tree(src: &Path, dst: &Path) -> anyhow::Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.with_context(|| format!("walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("strip prefix {}", src.display()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target)
                .with_context(|| format!("copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}
