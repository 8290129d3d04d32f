use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use pinguard_types::RepoPath;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Discover workflow files under each of `roots` (repo-relative directories).
///
/// Behavior:
/// - Every regular file ending in `.yml` or `.yaml` is a candidate, at any depth.
/// - Candidates matching an `exclude` glob (repo-relative) are dropped.
/// - A root that does not exist is an error; a root with no workflows is not.
/// - The result is sorted and deduplicated, so overlapping roots are harmless.
pub fn discover_workflows(
    repo_root: &Utf8Path,
    roots: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<RepoPath>> {
    let exclude_set = build_globset(exclude).context("compile exclude globset")?;

    let mut out: Vec<RepoPath> = Vec::new();
    for root in roots {
        let abs_root = repo_root.join(root);
        if !abs_root.is_dir() {
            anyhow::bail!("workflow root not found: {abs_root}");
        }

        for entry in WalkDir::new(&abs_root) {
            let entry = entry.with_context(|| format!("walk {abs_root}"))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(abs) = pathbuf_to_utf8(entry.path().to_path_buf()) else {
                tracing::warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };

            let rel = RepoPath::relative_to(repo_root, &abs);
            if !rel.is_yaml() {
                continue;
            }
            if exclude_set.is_match(rel.as_str()) {
                tracing::debug!(path = %rel, "excluded");
                continue;
            }
            out.push(rel);
        }
    }

    // Stable order.
    out.sort();
    out.dedup();

    Ok(out)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(Glob::new(p)?);
    }
    Ok(b.build()?)
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
