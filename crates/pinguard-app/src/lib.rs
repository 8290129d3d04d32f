//! Use case orchestration for pinguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings, repo,
//! domain, and render layers. It is intentionally thin and delegates heavy lifting to them.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod policy;
mod render;
mod report;

pub use check::{
    CheckInput, CheckOutput, ConfigSource, build_report, format_diagnostics, load_config,
    run_check, verdict_exit_code,
};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use pinguard_repo::Mode;
pub use policy::run_policy;
pub use render::{
    AnnotationsInput, MarkdownInput, render_report_markdown, run_annotations, run_markdown,
};
pub use report::{
    parse_report_json, runtime_error_report, serialize_report, to_renderable, write_report,
};
