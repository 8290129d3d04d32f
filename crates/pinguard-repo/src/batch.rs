use crate::fs::{read_workflow, write_atomic};
use camino::Utf8Path;
use pinguard_domain::{DocumentOutcome, Policy, rewrite_document};
use pinguard_types::RepoPath;
use rayon::prelude::*;

/// Whether rewritten files are written back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Update,
    /// Evaluate only; nothing on disk changes.
    Check,
}

/// A workflow file that was read and evaluated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    pub path: RepoPath,
    pub outcome: DocumentOutcome,
    /// True when the rewritten text was written back to disk.
    pub written: bool,
}

/// A workflow file that could not be read or written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileError {
    pub path: RepoPath,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileResult {
    Processed(FileReport),
    Failed(FileError),
}

impl FileResult {
    pub fn path(&self) -> &RepoPath {
        match self {
            FileResult::Processed(r) => &r.path,
            FileResult::Failed(e) => &e.path,
        }
    }
}

/// Per-file results, sorted by path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub files: Vec<FileResult>,
}

impl BatchOutcome {
    pub fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter_map(|f| match f {
            FileResult::Processed(r) => Some(r),
            FileResult::Failed(_) => None,
        })
    }

    pub fn errors(&self) -> impl Iterator<Item = &FileError> {
        self.files.iter().filter_map(|f| match f {
            FileResult::Failed(e) => Some(e),
            FileResult::Processed(_) => None,
        })
    }

    /// Any DENIED, UNKNOWN, or MALFORMED reference, or any file failure.
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|f| match f {
            FileResult::Processed(r) => r.outcome.has_errors(),
            FileResult::Failed(_) => true,
        })
    }
}

/// Evaluate every file against `policy`, in parallel across files.
///
/// A failing file never stops the others. In [`Mode::Update`] a file is written back only when
/// its text changed, even if the same file also has error diagnostics.
pub fn run_batch(
    repo_root: &Utf8Path,
    paths: &[RepoPath],
    policy: &Policy,
    mode: Mode,
) -> BatchOutcome {
    let mut files: Vec<FileResult> = paths
        .par_iter()
        .map(|path| match process_file(repo_root, path, policy, mode) {
            Ok(report) => FileResult::Processed(report),
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(path = %path, error = %message, "workflow file failed");
                FileResult::Failed(FileError {
                    path: path.clone(),
                    message,
                })
            }
        })
        .collect();

    files.sort_by(|a, b| a.path().cmp(b.path()));
    BatchOutcome { files }
}

fn process_file(
    repo_root: &Utf8Path,
    path: &RepoPath,
    policy: &Policy,
    mode: Mode,
) -> anyhow::Result<FileReport> {
    let abs = repo_root.join(path.as_str());
    let text = read_workflow(&abs)?;
    let outcome = rewrite_document(&text, policy);

    let written = outcome.changed && mode == Mode::Update;
    if written {
        write_atomic(&abs, &outcome.text)?;
    }

    tracing::debug!(
        path = %path,
        references = outcome.diagnostics.len(),
        replaced = outcome.replaced(),
        written,
        "processed workflow"
    );

    Ok(FileReport {
        path: path.clone(),
        outcome,
        written,
    })
}
