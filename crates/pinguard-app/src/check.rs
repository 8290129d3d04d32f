//! The `check` use case: evaluate every workflow against the policy, rewrite pins, and
//! produce a report.

use anyhow::Context;
use camino::Utf8Path;
use pinguard_domain::fingerprint::fingerprint_for_reference;
use pinguard_domain::report::{compute_verdict, count_severities, sort_findings};
use pinguard_domain::DiagnosticStatus;
use pinguard_repo::{BatchOutcome, FileError, FileResult, Mode};
use pinguard_settings::{Overrides, PinguardConfigV1, ResolvedConfig};
use pinguard_types::{
    Finding, Location, PinguardData, PinguardReport, RunMeta, SCHEMA_REPORT_V1, Severity,
    ToolMeta, Verdict, VerdictStatus, ids,
};
use time::OffsetDateTime;

/// Where the policy comes from.
#[derive(Clone, Copy, Debug)]
pub enum ConfigSource<'a> {
    /// No config file: the embedded default policy.
    Builtin,
    /// A config file and its contents (an empty file is an empty config).
    File { path: &'a str, text: &'a str },
}

impl ConfigSource<'_> {
    pub fn label(&self) -> &str {
        match self {
            ConfigSource::Builtin => "builtin",
            ConfigSource::File { path, .. } => path,
        }
    }
}

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Repository root path; config roots are relative to it.
    pub repo_root: &'a Utf8Path,
    pub config: ConfigSource<'a>,
    /// CLI overrides.
    pub overrides: Overrides,
    /// `Update` writes rewritten files back; `Check` only reports.
    pub mode: Mode,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: PinguardReport,
    /// Per-file results, sorted by path.
    pub batch: BatchOutcome,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Parse and resolve the configuration named by `source`.
pub fn load_config(source: ConfigSource<'_>, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let cfg = match source {
        ConfigSource::Builtin => pinguard_settings::default_config(),
        ConfigSource::File { text, .. } if text.trim().is_empty() => PinguardConfigV1::default(),
        ConfigSource::File { path, text } => pinguard_settings::parse_config_toml(text)
            .with_context(|| format!("parse config {path}"))?,
    };

    pinguard_settings::resolve_config(cfg, overrides).context("resolve config")
}

/// Run the check use case: resolve config, discover workflows, evaluate and rewrite, report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    let resolved = load_config(input.config, input.overrides.clone())?;

    let paths =
        pinguard_repo::discover_workflows(input.repo_root, &resolved.roots, &resolved.exclude)
            .context("discover workflows")?;
    tracing::debug!(files = paths.len(), "discovered workflow files");

    let batch = pinguard_repo::run_batch(input.repo_root, &paths, &resolved.policy, input.mode);

    let finished_at = OffsetDateTime::now_utc();
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;

    let mut report = build_report(&batch, &resolved, input.mode, input.config.label());
    report.run = RunMeta {
        started_at,
        ended_at: Some(finished_at),
        duration_ms: Some(duration_ms),
    };

    tracing::info!(
        files = report.data.files_scanned,
        changed = report.data.files_changed,
        references = report.data.references_scanned,
        replaced = report.data.references_replaced,
        failed = report.data.references_failed,
        verdict = ?report.verdict.status,
        "run complete"
    );

    Ok(CheckOutput {
        report,
        batch,
        resolved_config: resolved,
    })
}

/// Fold per-file results into a report. Run timing is left at `now` for the caller to set.
pub fn build_report(
    batch: &BatchOutcome,
    resolved: &ResolvedConfig,
    mode: Mode,
    policy_source: &str,
) -> PinguardReport {
    let mut data = PinguardData {
        mode: mode_name(mode).to_string(),
        policy_source: policy_source.to_string(),
        ..PinguardData::default()
    };
    let mut findings = Vec::new();

    for file in &batch.files {
        data.files_scanned += 1;
        match file {
            FileResult::Processed(r) => {
                if r.outcome.changed {
                    data.files_changed += 1;
                }
                for d in &r.outcome.diagnostics {
                    data.references_scanned += 1;
                    match d.status() {
                        DiagnosticStatus::Ok => data.references_ok += 1,
                        DiagnosticStatus::Replace => data.references_replaced += 1,
                        DiagnosticStatus::Error => data.references_failed += 1,
                    }
                    findings.extend(d.to_finding(&r.path));
                }
            }
            FileResult::Failed(e) => findings.push(io_error_finding(e)),
        }
    }

    sort_findings(&mut findings);

    let counts = count_severities(&findings);
    let status = compute_verdict(&findings, resolved.fail_on);

    let mut reasons = Vec::new();
    if data.references_failed > 0 {
        reasons.push(ids::REASON_POLICY_VIOLATION.to_string());
    }
    if batch.errors().next().is_some() {
        reasons.push(ids::REASON_IO_FAILURE.to_string());
    }
    if data.references_replaced > 0 {
        reasons.push(ids::REASON_OUTDATED_PINS.to_string());
    }

    data.findings_total = u32::try_from(findings.len()).unwrap_or(u32::MAX);
    if findings.len() > resolved.max_findings {
        findings.truncate(resolved.max_findings);
        data.truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            resolved.max_findings
        ));
        reasons.push(ids::REASON_TRUNCATED.to_string());
    }
    data.findings_emitted = u32::try_from(findings.len()).unwrap_or(u32::MAX);

    let now = OffsetDateTime::now_utc();
    PinguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        run: RunMeta {
            started_at: now,
            ended_at: None,
            duration_ms: None,
        },
        verdict: Verdict {
            status,
            counts,
            reasons,
        },
        findings,
        data,
    }
}

/// Per-file diagnostic blocks for stdout: the path, then one line per evaluated reference.
///
/// A file that could not be processed gets a single `Error.` line carrying the I/O message.
pub fn format_diagnostics(batch: &BatchOutcome) -> String {
    let mut out = String::new();
    for file in &batch.files {
        out.push_str(file.path().as_str());
        out.push('\n');
        match file {
            FileResult::Processed(r) => {
                for d in &r.outcome.diagnostics {
                    out.push_str(&d.to_string());
                    out.push('\n');
                }
            }
            FileResult::Failed(e) => {
                out.push_str(&format!("{:>4} Error. {}\n", "-", e.message));
            }
        }
    }
    out
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: VerdictStatus) -> i32 {
    match verdict {
        VerdictStatus::Pass => 0,
        VerdictStatus::Warn => 0,
        VerdictStatus::Fail => 2,
    }
}

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "pinguard".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Update => "update",
        Mode::Check => "check",
    }
}

fn io_error_finding(e: &FileError) -> Finding {
    Finding {
        severity: Severity::Error,
        check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
        code: ids::CODE_IO_ERROR.to_string(),
        message: e.message.clone(),
        location: Some(Location {
            path: e.path.clone(),
            line: None,
            col: None,
        }),
        help: Some("Check that the file is readable and writable, then re-run pinguard.".to_string()),
        url: None,
        fingerprint: Some(fingerprint_for_reference(
            ids::CHECK_TOOL_RUNTIME,
            ids::CODE_IO_ERROR,
            e.path.as_str(),
            "",
        )),
        data: serde_json::Value::Null,
    }
}
