//! Render use cases: markdown and GitHub annotations from a saved report.

use crate::report::{parse_report_json, to_renderable};
use anyhow::Context;
use camino::Utf8Path;
use pinguard_types::PinguardReport;

#[derive(Clone, Copy, Debug)]
pub struct MarkdownInput<'a> {
    pub report_path: &'a Utf8Path,
}

#[derive(Clone, Copy, Debug)]
pub struct AnnotationsInput<'a> {
    pub report_path: &'a Utf8Path,
    /// GitHub caps annotations per step; extra lines are dropped.
    pub max: usize,
}

pub fn run_markdown(input: MarkdownInput<'_>) -> anyhow::Result<String> {
    let text = read_report(input.report_path)?;
    let report = parse_report_json(&text)?;
    Ok(render_report_markdown(&report))
}

pub fn render_report_markdown(report: &PinguardReport) -> String {
    pinguard_render::render_markdown(&to_renderable(report))
}

pub fn run_annotations(input: AnnotationsInput<'_>) -> anyhow::Result<Vec<String>> {
    let text = read_report(input.report_path)?;
    let report = parse_report_json(&text)?;
    Ok(pinguard_render::render_github_annotations(&to_renderable(&report))
        .into_iter()
        .take(input.max)
        .collect())
}

fn read_report(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read report {path}"))
}
