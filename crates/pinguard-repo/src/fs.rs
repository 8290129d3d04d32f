use anyhow::Context;
use camino::Utf8Path;
use std::io::Write;

pub fn read_workflow(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read {path}"))
}

/// Replace `path` with `contents` via a temp file in the same directory and a rename.
///
/// Readers see either the old bytes or the new bytes, never a partial file. The original
/// permissions are carried over to the replacement.
pub fn write_atomic(path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let permissions = std::fs::metadata(path).map(|m| m.permissions()).ok();

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {parent}"))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write temp file for {path}"))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync temp file for {path}"))?;
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .with_context(|| format!("copy permissions to temp file for {path}"))?;
    }
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replace {path}"))?;
    Ok(())
}
